use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{booking_histories::NewBookingHistory, bookings::Booking};

/// Moves `booking` into the history, frees its table and deletes it.
pub fn cancel_booking(
    conn: &mut SqliteConnection,
    booking: &Booking,
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    use crate::schema::{booking_histories, bookings, restaurant_tables};

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let deleted = diesel::delete(bookings::table.filter(bookings::id.eq(booking.id)))
            .execute(conn)
            .context("DB error")?;
        if deleted == 0 {
            bail!("No such booking");
        }

        diesel::insert_into(booking_histories::table)
            .values(NewBookingHistory::snapshot(booking, now))
            .execute(conn)
            .context("DB error")?;

        if let Some(table_id) = booking.table_id {
            diesel::update(restaurant_tables::table.filter(restaurant_tables::id.eq(table_id)))
                .set(restaurant_tables::is_booked.eq(false))
                .execute(conn)
                .context("DB error")?;
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::test_pool,
        models::{booking_histories::BookingHistory, tables::TableData},
        schema::{booking_histories, bookings, restaurant_tables},
        testing::*,
    };

    #[test]
    fn test_cancel_moves_booking_to_history() {
        let pool = test_pool();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let user = insert_user(conn, "guest@example.com");
        let table = insert_table(conn, 3, 4);
        let booking = insert_booking(conn, table.id, user.id, date(), hm(19, 0), 3);
        diesel::update(restaurant_tables::table)
            .set(restaurant_tables::is_booked.eq(true))
            .execute(conn)
            .unwrap();

        let now = date().and_hms_opt(9, 15, 0).unwrap();
        cancel_booking(conn, &booking, now).unwrap();

        let left = bookings::table.count().get_result::<i64>(conn).unwrap();
        assert_eq!(left, 0);

        let history = booking_histories::table
            .get_results::<BookingHistory>(conn)
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].table_id, Some(table.id));
        assert_eq!(history[0].client_id, Some(user.id));
        assert_eq!(history[0].date_reserved, booking.date_reserved);
        assert_eq!(history[0].time_reserved, booking.time_reserved);
        assert_eq!(history[0].duration, booking.duration);
        assert_eq!(history[0].cancelled_at, now);

        let table = restaurant_tables::table
            .get_result::<TableData>(conn)
            .unwrap();
        assert!(!table.is_booked);
    }

    #[test]
    fn test_cancel_twice_fails_without_second_history() {
        let pool = test_pool();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let user = insert_user(conn, "guest@example.com");
        let table = insert_table(conn, 3, 4);
        let booking = insert_booking(conn, table.id, user.id, date(), hm(19, 0), 3);

        let now = date().and_hms_opt(9, 15, 0).unwrap();
        cancel_booking(conn, &booking, now).unwrap();
        assert!(cancel_booking(conn, &booking, now).is_err());

        let history = booking_histories::table
            .count()
            .get_result::<i64>(conn)
            .unwrap();
        assert_eq!(history, 1);
    }
}
