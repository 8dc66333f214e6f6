use serde::Deserialize;

#[derive(Deserialize)]
pub struct TimeSlotsRequest {}

#[derive(Deserialize)]
pub struct SearchTableRequest {
    pub login_token: String,
    pub date: String,
    pub time: String,
}

#[derive(Deserialize)]
pub struct CreateRequest {
    pub login_token: String,
    pub table_id: i32,
    pub date: String,
    pub time: String,
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct ListRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct EditSlotsRequest {
    pub login_token: String,
    pub booking_id: i32,
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub login_token: String,
    pub booking_id: i32,
    pub time: String,
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub login_token: String,
    pub booking_id: i32,
}
