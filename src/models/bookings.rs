use crate::schema::bookings;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = bookings)]
pub struct Booking {
    pub id: i32,
    pub table_id: Option<i32>,
    pub client_id: Option<i32>,
    pub date_reserved: NaiveDate,
    pub time_reserved: NaiveTime,
    pub duration: i32,
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub table_id: Option<i32>,
    pub client_id: Option<i32>,
    pub date_reserved: NaiveDate,
    pub time_reserved: NaiveTime,
    pub duration: i32,
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = bookings)]
pub struct UpdateBooking {
    pub time_reserved: NaiveTime,
    pub message: Option<String>,
}

/// Length of a booking in hours unless stated otherwise.
pub const DEFAULT_DURATION_HOURS: i32 = 3;
