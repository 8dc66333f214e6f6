use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::{cancel::cancel_booking, slots::is_expired};
use crate::{
    database::{self, DbPool},
    models::bookings::Booking,
};

/// Cancels every active booking whose end time is not after `now`.
pub fn cancel_expired_bookings(
    conn: &mut SqliteConnection,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<Booking>> {
    use crate::schema::bookings;

    let active = bookings::table
        .filter(bookings::is_active.eq(true))
        .order(bookings::id.asc())
        .get_results::<Booking>(conn)
        .context("DB error")?;

    let expired = active
        .into_iter()
        .filter(|booking| is_expired(booking, now))
        .collect();
    Ok(cancel_each(conn, expired, now))
}

/// Cancels `expired` one by one. A booking that fails to cancel is logged and skipped.
fn cancel_each(
    conn: &mut SqliteConnection,
    expired: Vec<Booking>,
    now: NaiveDateTime,
) -> Vec<Booking> {
    let mut cancelled = Vec::new();
    for booking in expired {
        if let Err(err) = cancel_booking(conn, &booking, now) {
            log::warn!("Failed to cancel expired booking {}: {:#}", booking.id, err);
            continue;
        }
        log::info!(
            "Booking {} (table {:?}) cancelled: booking time expired",
            booking.id,
            booking.table_id
        );
        cancelled.push(booking);
    }
    cancelled
}

/// Runs the expiration pass every `every` until the runtime stops.
pub async fn run(pool: DbPool, every: Duration) {
    // interval() panics on a zero period
    let every = every.max(Duration::from_secs(1));
    log::info!("Expiration job started, interval {}s", every.as_secs());

    let mut interval = actix_web::rt::time::interval(every);
    loop {
        interval.tick().await;

        let res = database::run(&pool, |conn| {
            cancel_expired_bookings(conn, crate::utils::now())
        })
        .await;
        match res {
            Ok(cancelled) if cancelled.is_empty() => log::debug!("No expired bookings"),
            Ok(cancelled) => log::info!("Cancelled {} expired bookings", cancelled.len()),
            Err(err) => log::error!("Expiration pass failed: {:#}", err),
        }
    }
}
