use serde::Serialize;

use crate::{
    models::{booking_histories::BookingHistory, bookings::Booking, tables::TableData},
    utils::{format_date_str, format_datetime_str, format_time_str},
};

#[derive(Default, Serialize)]
pub struct TimeSlotsResponse {
    pub success: bool,
    pub err: String,
    pub first_date: String,
    pub last_date: String,
    pub times: Vec<String>,
}

#[derive(Default, Serialize)]
pub struct TableItem {
    pub id: i32,
    pub number: i32,
    pub seats: i32,
    pub is_booked: bool,
    pub available: bool,
}

impl TableItem {
    pub fn new(table: TableData, available: bool) -> Self {
        Self {
            id: table.id,
            number: table.number,
            seats: table.seats,
            is_booked: table.is_booked,
            available,
        }
    }
}

#[derive(Default, Serialize)]
pub struct SearchTableResponse {
    pub success: bool,
    pub err: String,
    pub date: String,
    pub time: String,
    pub tables: Vec<TableItem>,
}

#[derive(Default, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub err: String,
    pub booking_id: i32,
}

#[derive(Default, Serialize)]
pub struct BookingItem {
    pub id: i32,
    pub table_id: Option<i32>,
    pub table_number: Option<i32>,
    pub seats: Option<i32>,
    pub client_id: Option<i32>,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub message: String,
    pub created_at: String,
    pub is_active: bool,
}

impl BookingItem {
    pub fn new(booking: Booking, table: Option<TableData>) -> Self {
        Self {
            id: booking.id,
            table_id: booking.table_id,
            table_number: table.as_ref().map(|table| table.number),
            seats: table.as_ref().map(|table| table.seats),
            client_id: booking.client_id,
            date: format_date_str(&booking.date_reserved),
            time: format_time_str(&booking.time_reserved),
            duration: booking.duration,
            message: booking.message.unwrap_or_default(),
            created_at: format_datetime_str(&booking.created_at),
            is_active: booking.is_active,
        }
    }
}

#[derive(Default, Serialize)]
pub struct HistoryItem {
    pub id: i32,
    pub table_id: Option<i32>,
    pub table_number: Option<i32>,
    pub client_id: Option<i32>,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub message: String,
    pub cancelled_at: String,
}

impl HistoryItem {
    pub fn new(history: BookingHistory, table: Option<TableData>) -> Self {
        Self {
            id: history.id,
            table_id: history.table_id,
            table_number: table.map(|table| table.number),
            client_id: history.client_id,
            date: format_date_str(&history.date_reserved),
            time: format_time_str(&history.time_reserved),
            duration: history.duration,
            message: history.message.unwrap_or_default(),
            cancelled_at: format_datetime_str(&history.cancelled_at),
        }
    }
}

#[derive(Default, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub err: String,
    pub bookings: Vec<BookingItem>,
    pub history: Vec<HistoryItem>,
}

#[derive(Default, Serialize)]
pub struct EditSlotsResponse {
    pub success: bool,
    pub err: String,
    pub booking: BookingItem,
    pub times: Vec<String>,
}

crate::impl_err_response! {
    TimeSlotsResponse,
    SearchTableResponse,
    CreateResponse,
    ListResponse,
    EditSlotsResponse,
}
