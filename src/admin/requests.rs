use serde::Deserialize;

#[derive(Deserialize)]
pub struct AddTableRequest {
    pub login_token: String,
    pub number: i32,
    pub seats: i32,
}

#[derive(Deserialize)]
pub struct ModifyTableRequest {
    pub login_token: String,
    pub table_id: i32,
    pub number: Option<i32>,
    pub seats: Option<i32>,
    pub is_booked: Option<bool>,
}

#[derive(Deserialize)]
pub struct SearchTableRequest {
    pub login_token: String,
    pub min_seats: Option<i32>,
}

#[derive(Deserialize)]
pub struct SearchBookingRequest {
    pub login_token: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchHistoryRequest {
    pub login_token: String,
    pub first_index: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub login_token: String,
    pub booking_id: i32,
}
