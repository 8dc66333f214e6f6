use crate::schema::password_resets;
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Insertable)]
#[diesel(table_name = password_resets)]
pub struct PasswordResetData {
    pub token: String,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}
