use crate::schema::booking_histories;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use super::bookings::Booking;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = booking_histories)]
pub struct BookingHistory {
    pub id: i32,
    pub table_id: Option<i32>,
    pub client_id: Option<i32>,
    pub date_reserved: NaiveDate,
    pub time_reserved: NaiveTime,
    pub duration: i32,
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
    pub cancelled_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = booking_histories)]
pub struct NewBookingHistory {
    pub table_id: Option<i32>,
    pub client_id: Option<i32>,
    pub date_reserved: NaiveDate,
    pub time_reserved: NaiveTime,
    pub duration: i32,
    pub message: Option<String>,
    pub created_at: NaiveDateTime,
    pub cancelled_at: NaiveDateTime,
}

impl NewBookingHistory {
    /// Snapshot of `booking` taken at `cancelled_at`.
    pub fn snapshot(booking: &Booking, cancelled_at: NaiveDateTime) -> Self {
        Self {
            table_id: booking.table_id,
            client_id: booking.client_id,
            date_reserved: booking.date_reserved,
            time_reserved: booking.time_reserved,
            duration: booking.duration,
            message: booking.message.clone(),
            created_at: cancelled_at,
            cancelled_at,
        }
    }
}
