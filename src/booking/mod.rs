mod availability;
mod cancel;
pub mod expire;
mod requests;
mod responses;
mod slots;

use crate::{
    database::{self, assert},
    mail,
    models::{
        booking_histories::BookingHistory,
        bookings::{Booking, NewBooking, UpdateBooking},
        tables::TableData,
    },
    protocol::SimpleResponse,
    user::utils::login_user,
    utils::{format_date_str, format_time_str, parse_date_str, parse_time_str},
    AppState,
};
use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

pub use self::cancel::cancel_booking;
use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(time_slots)
        .service(search_table)
        .service(create)
        .service(list)
        .service(edit_slots)
        .service(update)
        .service(cancel_own_booking);
}

crate::post_funcs! {
    (time_slots, "/time_slots", TimeSlotsRequest, TimeSlotsResponse),
    (search_table, "/search_table", SearchTableRequest, SearchTableResponse),
    (create, "/create", CreateRequest, CreateResponse),
    (list, "/list", ListRequest, ListResponse),
    (edit_slots, "/edit_slots", EditSlotsRequest, EditSlotsResponse),
    (update, "/update", UpdateRequest, SimpleResponse),
    (cancel_own_booking, "/cancel", CancelRequest, SimpleResponse),
}

/// Times still free for `booking` on its table and date.
fn edit_choices(
    conn: &mut SqliteConnection,
    booking: &Booking,
    schedule: &crate::config::Schedule,
) -> anyhow::Result<Vec<chrono::NaiveTime>> {
    let table_id = booking.table_id.context("Booking has no table")?;
    let booked = availability::booked_times(conn, table_id, booking.date_reserved)?;
    Ok(slots::free_slots(&slots::all_slots(schedule), &booked))
}

async fn time_slots_impl(
    state: web::Data<AppState>,
    _info: web::Json<TimeSlotsRequest>,
) -> anyhow::Result<TimeSlotsResponse> {
    let schedule = &state.config.schedule;
    let (first_date, last_date) = slots::bookable_dates(crate::utils::now().date(), schedule);

    Ok(TimeSlotsResponse {
        success: true,
        err: "".to_string(),
        first_date: format_date_str(&first_date),
        last_date: format_date_str(&last_date),
        times: slots::all_slots(schedule)
            .iter()
            .map(format_time_str)
            .collect(),
    })
}

async fn search_table_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchTableRequest>,
) -> anyhow::Result<SearchTableResponse> {
    let info = info.into_inner();
    let schedule = state.config.schedule;
    let date = parse_date_str(&info.date)?;
    let time = parse_time_str(&info.time)?;
    slots::check_date(date, crate::utils::now().date(), &schedule)?;
    slots::check_time(time, &schedule)?;

    let ttl = state.config.login_ttl_secs;
    let statuses = database::run(&state.pool, move |conn| {
        login_user(conn, &info.login_token, ttl)?;
        availability::table_statuses(conn, date, time, schedule.window_hours)
    })
    .await?;

    Ok(SearchTableResponse {
        success: true,
        err: "".to_string(),
        date: format_date_str(&date),
        time: format_time_str(&time),
        tables: statuses
            .into_iter()
            .map(|(table, available)| TableItem::new(table, available))
            .collect(),
    })
}

/// Checks the slot and stores the booking under one write lock.
fn book_table(
    conn: &mut SqliteConnection,
    client_id: i32,
    table_id: i32,
    date: chrono::NaiveDate,
    time: chrono::NaiveTime,
    message: Option<String>,
    schedule: &crate::config::Schedule,
) -> anyhow::Result<(TableData, Booking)> {
    use crate::schema::{bookings, restaurant_tables};

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let table = assert::assert_table(conn, table_id)?;
        if !availability::is_table_available(conn, table.id, date, time, schedule.window_hours)? {
            bail!("Table {} is already booked for this time", table.number);
        }

        let data = NewBooking {
            table_id: Some(table.id),
            client_id: Some(client_id),
            date_reserved: date,
            time_reserved: time,
            duration: schedule.duration_hours,
            message,
            created_at: crate::utils::now(),
        };
        diesel::insert_into(bookings::table)
            .values(data)
            .execute(conn)
            .context("DB error")?;
        let booking = bookings::table
            .filter(bookings::client_id.eq(client_id))
            .order(bookings::id.desc())
            .get_result::<Booking>(conn)
            .context("DB error")?;

        diesel::update(restaurant_tables::table.filter(restaurant_tables::id.eq(table.id)))
            .set(restaurant_tables::is_booked.eq(true))
            .execute(conn)
            .context("DB error")?;

        Ok((table, booking))
    })
}

async fn create_impl(
    state: web::Data<AppState>,
    info: web::Json<CreateRequest>,
) -> anyhow::Result<CreateResponse> {
    let info = info.into_inner();
    let schedule = state.config.schedule;
    let date = parse_date_str(&info.date)?;
    let time = parse_time_str(&info.time)?;
    slots::check_date(date, crate::utils::now().date(), &schedule)?;
    slots::check_time(time, &schedule)?;

    let ttl = state.config.login_ttl_secs;
    let (user, table, booking) = database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;
        let message = info.message.filter(|message| !message.trim().is_empty());
        let (table, booking) =
            book_table(conn, user.id, info.table_id, date, time, message, &schedule)?;
        Ok((user, table, booking))
    })
    .await?;

    log::info!(
        "Table {} booked by {} on {} at {}",
        table.number,
        user.email,
        booking.date_reserved,
        format_time_str(&booking.time_reserved)
    );
    mail::deliver(
        state.mailer.clone(),
        mail::booking_confirmation(&user, &table, &booking),
    )
    .await;

    Ok(CreateResponse {
        success: true,
        err: "".to_string(),
        booking_id: booking.id,
    })
}

async fn list_impl(
    state: web::Data<AppState>,
    info: web::Json<ListRequest>,
) -> anyhow::Result<ListResponse> {
    use crate::schema::{booking_histories, bookings, restaurant_tables};

    let info = info.into_inner();
    let ttl = state.config.login_ttl_secs;
    let (bookings, history) = database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;

        let bookings = bookings::table
            .left_join(restaurant_tables::table)
            .filter(bookings::client_id.eq(user.id))
            .order((bookings::date_reserved.asc(), bookings::time_reserved.asc()))
            .get_results::<(Booking, Option<TableData>)>(conn)
            .context("DB error")?;
        let history = booking_histories::table
            .left_join(restaurant_tables::table)
            .filter(booking_histories::client_id.eq(user.id))
            .order(booking_histories::cancelled_at.desc())
            .get_results::<(BookingHistory, Option<TableData>)>(conn)
            .context("DB error")?;

        Ok((bookings, history))
    })
    .await?;

    Ok(ListResponse {
        success: true,
        err: "".to_string(),
        bookings: bookings
            .into_iter()
            .map(|(booking, table)| BookingItem::new(booking, table))
            .collect(),
        history: history
            .into_iter()
            .map(|(history, table)| HistoryItem::new(history, table))
            .collect(),
    })
}

async fn edit_slots_impl(
    state: web::Data<AppState>,
    info: web::Json<EditSlotsRequest>,
) -> anyhow::Result<EditSlotsResponse> {
    let info = info.into_inner();
    let schedule = state.config.schedule;
    let ttl = state.config.login_ttl_secs;
    let (booking, table, times) = database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;
        let booking = assert::assert_own_booking(conn, user.id, info.booking_id)?;
        let times = edit_choices(conn, &booking, &schedule)?;
        let table = match booking.table_id {
            Some(table_id) => Some(assert::assert_table(conn, table_id)?),
            None => None,
        };
        Ok((booking, table, times))
    })
    .await?;

    Ok(EditSlotsResponse {
        success: true,
        err: "".to_string(),
        booking: BookingItem::new(booking, table),
        times: times.iter().map(format_time_str).collect(),
    })
}

async fn update_impl(
    state: web::Data<AppState>,
    info: web::Json<UpdateRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::bookings;

    let info = info.into_inner();
    let time = parse_time_str(&info.time)?;
    let schedule = state.config.schedule;
    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let user = login_user(conn, &info.login_token, ttl)?;
            let booking = assert::assert_own_booking(conn, user.id, info.booking_id)?;
            if !edit_choices(conn, &booking, &schedule)?.contains(&time) {
                bail!("Select a valid choice. {} is not available", format_time_str(&time));
            }

            let data = UpdateBooking {
                time_reserved: time,
                message: info.message,
            };
            diesel::update(bookings::table.filter(bookings::id.eq(booking.id)))
                .set(&data)
                .execute(conn)
                .context("DB error")?;

            log::info!(
                "Booking {} moved from {} to {}",
                booking.id,
                format_time_str(&booking.time_reserved),
                format_time_str(&time)
            );
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn cancel_own_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<CancelRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;
        let booking = assert::assert_own_booking(conn, user.id, info.booking_id)?;
        cancel_booking(conn, &booking, crate::utils::now())?;
        log::info!("Booking {} cancelled by {}", booking.id, user.email);
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}
