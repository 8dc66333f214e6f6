use serde::Serialize;

#[derive(Default, Serialize)]
pub struct TableItem {
    pub id: i32,
    pub number: i32,
    pub seats: i32,
    pub is_booked: bool,
}

#[derive(Default, Serialize)]
pub struct SearchTableResponse {
    pub success: bool,
    pub err: String,
    pub tables: Vec<TableItem>,
}

#[derive(Default, Serialize)]
pub struct SearchBookingItem {
    pub id: i32,
    pub table_number: Option<i32>,
    pub client_email: Option<String>,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub message: String,
    pub created_at: String,
    pub is_active: bool,
}

#[derive(Default, Serialize)]
pub struct SearchBookingResponse {
    pub success: bool,
    pub err: String,
    pub bookings: Vec<SearchBookingItem>,
}

#[derive(Default, Serialize)]
pub struct SearchHistoryItem {
    pub id: i32,
    pub table_number: Option<i32>,
    pub client_email: Option<String>,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub cancelled_at: String,
}

#[derive(Default, Serialize)]
pub struct SearchHistoryResponse {
    pub success: bool,
    pub err: String,
    pub history: Vec<SearchHistoryItem>,
}

crate::impl_err_response! {
    SearchTableResponse,
    SearchBookingResponse,
    SearchHistoryResponse,
}
