mod requests;
mod responses;

use crate::{
    booking::cancel_booking,
    database::{self, assert},
    models::{
        booking_histories::BookingHistory,
        bookings::Booking,
        tables::{NewTable, TableData, UpdateTable},
        users::UserData,
    },
    protocol::SimpleResponse,
    user::utils::login_user,
    utils::{format_date_str, format_datetime_str, format_time_str, parse_date_pair_str_opt},
    AppState,
};
use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use self::{requests::*, responses::*};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(add_table)
        .service(modify_table)
        .service(search_table)
        .service(search_booking)
        .service(search_history)
        .service(cancel_booking_by_staff);
}

crate::post_funcs! {
    (add_table, "/add_table", AddTableRequest, SimpleResponse),
    (modify_table, "/modify_table", ModifyTableRequest, SimpleResponse),
    (search_table, "/search_table", SearchTableRequest, SearchTableResponse),
    (search_booking, "/search_booking", SearchBookingRequest, SearchBookingResponse),
    (search_history, "/search_history", SearchHistoryRequest, SearchHistoryResponse),
    (cancel_booking_by_staff, "/cancel_booking", CancelBookingRequest, SimpleResponse),
}

fn login_staff(conn: &mut SqliteConnection, token: &str, ttl: i64) -> anyhow::Result<UserData> {
    let user = login_user(conn, token, ttl)?;
    assert::assert_staff(conn, user.id)
}

fn assert_table_number_free(conn: &mut SqliteConnection, number: i32) -> anyhow::Result<()> {
    use crate::schema::restaurant_tables;

    let res = restaurant_tables::table
        .filter(restaurant_tables::number.eq(number))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        bail!("Table with number {} already exists", number);
    }
    Ok(())
}

async fn add_table_impl(
    state: web::Data<AppState>,
    info: web::Json<AddTableRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::restaurant_tables;

    let info = info.into_inner();
    if info.seats <= 0 {
        bail!("Seat count must be positive");
    }

    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        conn.transaction::<_, anyhow::Error, _>(|conn| {
            login_staff(conn, &info.login_token, ttl)?;
            assert_table_number_free(conn, info.number)?;

            diesel::insert_into(restaurant_tables::table)
                .values(NewTable {
                    number: info.number,
                    seats: info.seats,
                })
                .execute(conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_table_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyTableRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::restaurant_tables;

    let info = info.into_inner();
    if info.seats.map_or(false, |seats| seats <= 0) {
        bail!("Seat count must be positive");
    }

    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        conn.transaction::<_, anyhow::Error, _>(|conn| {
            login_staff(conn, &info.login_token, ttl)?;
            let table = assert::assert_table(conn, info.table_id)?;
            if let Some(number) = info.number.filter(|number| *number != table.number) {
                assert_table_number_free(conn, number)?;
            }

            let data = UpdateTable {
                number: info.number,
                seats: info.seats,
                is_booked: info.is_booked,
            };
            if data.number.is_none() && data.seats.is_none() && data.is_booked.is_none() {
                return Ok(());
            }
            diesel::update(restaurant_tables::table.filter(restaurant_tables::id.eq(table.id)))
                .set(&data)
                .execute(conn)
                .context("DB error")?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_table_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchTableRequest>,
) -> anyhow::Result<SearchTableResponse> {
    use crate::schema::restaurant_tables;

    let info = info.into_inner();
    let min_seats = info.min_seats.unwrap_or(0);
    let ttl = state.config.login_ttl_secs;
    let tables = database::run(&state.pool, move |conn| {
        login_staff(conn, &info.login_token, ttl)?;
        restaurant_tables::table
            .filter(restaurant_tables::seats.ge(min_seats))
            .order(restaurant_tables::number.asc())
            .get_results::<TableData>(conn)
            .context("DB error")
    })
    .await?;

    Ok(SearchTableResponse {
        success: true,
        err: "".to_string(),
        tables: tables
            .into_iter()
            .map(|table| TableItem {
                id: table.id,
                number: table.number,
                seats: table.seats,
                is_booked: table.is_booked,
            })
            .collect(),
    })
}

async fn search_booking_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchBookingRequest>,
) -> anyhow::Result<SearchBookingResponse> {
    use crate::schema::{bookings, restaurant_tables, users};

    let info = info.into_inner();
    let (date_from, date_to) = parse_date_pair_str_opt(info.date_from, info.date_to)?;
    let first_index = info.first_index.unwrap_or(0).max(0);
    let limit = info.limit.unwrap_or(30).max(0);
    let ttl = state.config.login_ttl_secs;
    let res = database::run(&state.pool, move |conn| {
        login_staff(conn, &info.login_token, ttl)?;
        bookings::table
            .left_join(
                restaurant_tables::table
                    .on(bookings::table_id.eq(restaurant_tables::id.nullable())),
            )
            .left_join(users::table.on(bookings::client_id.eq(users::id.nullable())))
            .filter(bookings::date_reserved.between(date_from, date_to))
            .order((bookings::date_reserved.asc(), bookings::time_reserved.asc()))
            .offset(first_index)
            .limit(limit)
            .get_results::<(Booking, Option<TableData>, Option<UserData>)>(conn)
            .context("DB error")
    })
    .await?;

    let bookings = res
        .into_iter()
        .map(|(booking, table, client)| SearchBookingItem {
            id: booking.id,
            table_number: table.map(|table| table.number),
            client_email: client.map(|client| client.email),
            date: format_date_str(&booking.date_reserved),
            time: format_time_str(&booking.time_reserved),
            duration: booking.duration,
            message: booking.message.unwrap_or_default(),
            created_at: format_datetime_str(&booking.created_at),
            is_active: booking.is_active,
        })
        .collect();

    Ok(SearchBookingResponse {
        success: true,
        err: "".to_string(),
        bookings,
    })
}

async fn search_history_impl(
    state: web::Data<AppState>,
    info: web::Json<SearchHistoryRequest>,
) -> anyhow::Result<SearchHistoryResponse> {
    use crate::schema::{booking_histories, restaurant_tables, users};

    let info = info.into_inner();
    let first_index = info.first_index.unwrap_or(0).max(0);
    let limit = info.limit.unwrap_or(30).max(0);
    let ttl = state.config.login_ttl_secs;
    let res = database::run(&state.pool, move |conn| {
        login_staff(conn, &info.login_token, ttl)?;
        booking_histories::table
            .left_join(
                restaurant_tables::table
                    .on(booking_histories::table_id.eq(restaurant_tables::id.nullable())),
            )
            .left_join(users::table.on(booking_histories::client_id.eq(users::id.nullable())))
            .order(booking_histories::cancelled_at.desc())
            .offset(first_index)
            .limit(limit)
            .get_results::<(BookingHistory, Option<TableData>, Option<UserData>)>(conn)
            .context("DB error")
    })
    .await?;

    let history = res
        .into_iter()
        .map(|(history, table, client)| SearchHistoryItem {
            id: history.id,
            table_number: table.map(|table| table.number),
            client_email: client.map(|client| client.email),
            date: format_date_str(&history.date_reserved),
            time: format_time_str(&history.time_reserved),
            duration: history.duration,
            cancelled_at: format_datetime_str(&history.cancelled_at),
        })
        .collect();

    Ok(SearchHistoryResponse {
        success: true,
        err: "".to_string(),
        history,
    })
}

async fn cancel_booking_by_staff_impl(
    state: web::Data<AppState>,
    info: web::Json<CancelBookingRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        let staff = login_staff(conn, &info.login_token, ttl)?;
        let booking = assert::assert_booking(conn, info.booking_id)?;
        cancel_booking(conn, &booking, crate::utils::now())?;
        log::info!("Booking {} cancelled by staff {}", booking.id, staff.email);
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use serde_json::json;

    use crate::testing::{date, hm, insert_booking, login_as, post_json, test_state};

    macro_rules! admin_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .service(web::scope("/admin").configure(super::config)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_guest_is_denied() {
        let (state, _) = test_state();
        let (_, token) = login_as(&state, "guest@example.com", false);
        let app = admin_app!(state);

        let res = post_json!(
            &app,
            "/admin/add_table",
            json!({"login_token": token, "number": 1, "seats": 4})
        );
        assert_eq!(res["success"], false);
        assert_eq!(res["err"], "Permission denied");
    }

    #[actix_web::test]
    async fn test_manage_tables() {
        let (state, _) = test_state();
        let (_, token) = login_as(&state, "staff@example.com", true);
        let app = admin_app!(state);

        for (number, seats) in [(2, 4), (1, 2)] {
            let res = post_json!(
                &app,
                "/admin/add_table",
                json!({"login_token": token, "number": number, "seats": seats})
            );
            assert_eq!(res["success"], true);
        }
        let res = post_json!(
            &app,
            "/admin/add_table",
            json!({"login_token": token, "number": 1, "seats": 6})
        );
        assert_eq!(res["success"], false);

        let res = post_json!(&app, "/admin/search_table", json!({"login_token": token}));
        let tables = res["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0]["number"], 1);
        let id = tables[0]["id"].as_i64().unwrap();

        let res = post_json!(
            &app,
            "/admin/modify_table",
            json!({"login_token": token, "table_id": id, "seats": 3})
        );
        assert_eq!(res["success"], true);
        let res = post_json!(
            &app,
            "/admin/search_table",
            json!({"login_token": token, "min_seats": 3})
        );
        let tables = res["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0]["seats"], 3);
    }

    #[actix_web::test]
    async fn test_staff_cancel_shows_in_history() {
        let (state, _) = test_state();
        let (_, token) = login_as(&state, "staff@example.com", true);
        let (guest, _) = login_as(&state, "guest@example.com", false);
        let booking = {
            let mut pooled = state.pool.get().unwrap();
            let conn = &mut *pooled;
            let table = crate::testing::insert_table(conn, 4, 2);
            insert_booking(conn, table.id, guest.id, date(), hm(14, 0), 3)
        };
        let app = admin_app!(state);

        let res = post_json!(
            &app,
            "/admin/search_booking",
            json!({"login_token": token, "date_from": "2026-03-05", "date_to": "2026-03-05"})
        );
        let bookings = res["bookings"].as_array().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0]["client_email"], "guest@example.com");
        assert_eq!(bookings[0]["table_number"], 4);

        let res = post_json!(
            &app,
            "/admin/cancel_booking",
            json!({"login_token": token, "booking_id": booking.id})
        );
        assert_eq!(res["success"], true);

        let res = post_json!(&app, "/admin/search_history", json!({"login_token": token}));
        let history = res["history"].as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["time"], "14:00");
        assert_eq!(history[0]["client_email"], "guest@example.com");
    }
}
