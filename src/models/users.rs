use crate::schema::users;
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = users)]
pub struct UserData {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub country: String,
    pub about_me: Option<String>,
    pub avatar: Option<String>,
    pub notes: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub country: String,
    pub avatar: Option<String>,
    pub is_staff: bool,
    pub date_joined: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub about_me: Option<String>,
    pub avatar: Option<String>,
}

pub const DEFAULT_COUNTRY: &str = "RU";
pub const DEFAULT_AVATAR: &str = "users/avatars/default.jpg";

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.country.is_none()
            && self.about_me.is_none()
            && self.avatar.is_none()
    }
}
