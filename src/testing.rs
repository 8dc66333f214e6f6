//! Fixtures shared by the database backed tests.

use std::sync::Arc;

use actix_web::web;
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;

use crate::{
    config::Config,
    database::test_pool,
    mail::testing::RecordingMailer,
    models::{
        bookings::{Booking, NewBooking},
        tables::{NewTable, TableData},
        users::{NewUser, UserData, DEFAULT_AVATAR, DEFAULT_COUNTRY},
    },
    schema::{bookings, restaurant_tables, users},
    user::utils::hash_password,
    AppState,
};

/// Posts `$body` as JSON and decodes the JSON answer.
macro_rules! post_json {
    ($app:expr, $uri:expr, $body:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri($uri)
            .set_json($body)
            .to_request();
        let res: serde_json::Value = actix_web::test::call_and_read_body_json($app, req).await;
        res
    }};
}

pub(crate) use post_json;

pub const PASSWORD: &str = "correct-horse-42";

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
}

pub fn next_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
}

pub fn insert_user(conn: &mut SqliteConnection, email: &str) -> UserData {
    diesel::insert_into(users::table)
        .values(NewUser {
            email: email.to_string(),
            password: hash_password(PASSWORD),
            first_name: "Anna".to_string(),
            last_name: "Petrova".to_string(),
            phone: None,
            country: DEFAULT_COUNTRY.to_string(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
            is_staff: false,
            date_joined: date().and_hms_opt(8, 0, 0).unwrap(),
        })
        .execute(conn)
        .unwrap();
    users::table
        .filter(users::email.eq(email))
        .get_result::<UserData>(conn)
        .unwrap()
}

pub fn insert_table(conn: &mut SqliteConnection, number: i32, seats: i32) -> TableData {
    diesel::insert_into(restaurant_tables::table)
        .values(NewTable { number, seats })
        .execute(conn)
        .unwrap();
    restaurant_tables::table
        .filter(restaurant_tables::number.eq(number))
        .get_result::<TableData>(conn)
        .unwrap()
}

pub fn insert_booking(
    conn: &mut SqliteConnection,
    table_id: i32,
    client_id: i32,
    date_reserved: NaiveDate,
    time_reserved: NaiveTime,
    duration: i32,
) -> Booking {
    diesel::insert_into(bookings::table)
        .values(NewBooking {
            table_id: Some(table_id),
            client_id: Some(client_id),
            date_reserved,
            time_reserved,
            duration,
            message: None,
            created_at: date_reserved.and_hms_opt(8, 0, 0).unwrap(),
        })
        .execute(conn)
        .unwrap();
    bookings::table
        .order(bookings::id.desc())
        .get_result::<Booking>(conn)
        .unwrap()
}

/// Application state over a fresh in-memory database.
pub fn test_state() -> (web::Data<AppState>, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = web::Data::new(AppState {
        pool: test_pool(),
        config: Config::default(),
        mailer: mailer.clone(),
    });
    (state, mailer)
}

/// Registers `email` directly in the database and returns a login token.
pub fn login_as(state: &AppState, email: &str, is_staff: bool) -> (UserData, String) {
    use crate::{models::user_logins::UserLoginData, schema::user_logins};

    let mut pooled = state.pool.get().unwrap();
    let conn = &mut *pooled;
    let user = insert_user(conn, email);
    if is_staff {
        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(users::is_staff.eq(true))
            .execute(conn)
            .unwrap();
    }
    let token = format!("token-{}", email);
    diesel::insert_into(user_logins::table)
        .values(UserLoginData {
            token: token.clone(),
            user_id: user.id,
            login_time: crate::utils::now(),
        })
        .execute(conn)
        .unwrap();
    (user, token)
}

/// First day open for booking.
pub fn bookable_date() -> NaiveDate {
    crate::utils::now().date() + chrono::Duration::days(1)
}
