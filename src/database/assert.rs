use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::models::{bookings::Booking, tables::TableData, users::UserData};

pub fn assert_user(conn: &mut SqliteConnection, user_id: i32) -> anyhow::Result<UserData> {
    use crate::schema::users;

    let user = users::table
        .filter(users::id.eq(user_id))
        .get_result::<UserData>(conn)
        .optional()
        .context("DB error")?;

    match user {
        Some(user) if user.is_active => Ok(user),
        Some(_) => bail!("User is inactive"),
        None => bail!("No such user"),
    }
}

pub fn assert_staff(conn: &mut SqliteConnection, user_id: i32) -> anyhow::Result<UserData> {
    let user = assert_user(conn, user_id)?;
    if !user.is_staff {
        bail!("Permission denied");
    }
    Ok(user)
}

pub fn assert_table(conn: &mut SqliteConnection, table_id: i32) -> anyhow::Result<TableData> {
    use crate::schema::restaurant_tables;

    restaurant_tables::table
        .filter(restaurant_tables::id.eq(table_id))
        .get_result::<TableData>(conn)
        .optional()
        .context("DB error")?
        .context("No such table")
}

pub fn assert_booking(conn: &mut SqliteConnection, booking_id: i32) -> anyhow::Result<Booking> {
    use crate::schema::bookings;

    bookings::table
        .filter(bookings::id.eq(booking_id))
        .get_result::<Booking>(conn)
        .optional()
        .context("DB error")?
        .context("No such booking")
}

/// Booking `booking_id` if it belongs to `user_id`.
pub fn assert_own_booking(
    conn: &mut SqliteConnection,
    user_id: i32,
    booking_id: i32,
) -> anyhow::Result<Booking> {
    use crate::schema::bookings;

    bookings::table
        .filter(bookings::id.eq(booking_id))
        .filter(bookings::client_id.eq(user_id))
        .get_result::<Booking>(conn)
        .optional()
        .context("DB error")?
        .context("No such booking")
}

pub fn assert_email_free(conn: &mut SqliteConnection, email: &str) -> anyhow::Result<()> {
    use crate::schema::users;

    let res = users::table
        .filter(users::email.eq(email))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    if res > 0 {
        bail!("User with this email already exists");
    }

    Ok(())
}
