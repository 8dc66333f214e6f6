use serde::Serialize;

#[derive(Default, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub err: String,
    pub login_token: String,
}

#[derive(Default, Serialize)]
pub struct ViewInfoResponse {
    pub success: bool,
    pub err: String,
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub country: String,
    pub about_me: String,
    pub avatar: String,
    pub notes: String,
    pub date_joined: String,
}

crate::impl_err_response! {
    LoginResponse,
    ViewInfoResponse,
}
