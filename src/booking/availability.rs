use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;

use super::slots::availability_window;
use crate::models::tables::TableData;

/// Every table ordered by number, paired with whether it is free for a
/// booking at `date` / `time`.
///
/// A table is taken when one of its active bookings on `date` starts inside
/// the window of `window_hours` beginning at `time`. The duration of the
/// existing booking is not considered.
pub fn table_statuses(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    time: NaiveTime,
    window_hours: i64,
) -> anyhow::Result<Vec<(TableData, bool)>> {
    use crate::schema::{bookings, restaurant_tables};

    let tables = restaurant_tables::table
        .order(restaurant_tables::number.asc())
        .get_results::<TableData>(conn)
        .context("DB error")?;

    let (start, end) = availability_window(time, window_hours);
    let taken = bookings::table
        .filter(bookings::date_reserved.eq(date))
        .filter(bookings::is_active.eq(true))
        .filter(bookings::time_reserved.between(start, end))
        .select(bookings::table_id)
        .get_results::<Option<i32>>(conn)
        .context("DB error")?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    Ok(tables
        .into_iter()
        .map(|table| {
            let available = !taken.contains(&table.id);
            (table, available)
        })
        .collect())
}

pub fn is_table_available(
    conn: &mut SqliteConnection,
    table_id: i32,
    date: NaiveDate,
    time: NaiveTime,
    window_hours: i64,
) -> anyhow::Result<bool> {
    use crate::schema::bookings;

    let (start, end) = availability_window(time, window_hours);
    let res = bookings::table
        .filter(bookings::table_id.eq(table_id))
        .filter(bookings::date_reserved.eq(date))
        .filter(bookings::is_active.eq(true))
        .filter(bookings::time_reserved.between(start, end))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;

    Ok(res == 0)
}

/// Start times of the active bookings of a table on `date`.
pub fn booked_times(
    conn: &mut SqliteConnection,
    table_id: i32,
    date: NaiveDate,
) -> anyhow::Result<Vec<NaiveTime>> {
    use crate::schema::bookings;

    bookings::table
        .filter(bookings::table_id.eq(table_id))
        .filter(bookings::date_reserved.eq(date))
        .filter(bookings::is_active.eq(true))
        .select(bookings::time_reserved)
        .order(bookings::time_reserved.asc())
        .get_results::<NaiveTime>(conn)
        .context("DB error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::test_pool, testing::*};

    #[test]
    fn test_overlapping_booking_marks_table_taken() {
        let pool = test_pool();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let user = insert_user(conn, "guest@example.com");
        let first = insert_table(conn, 1, 2);
        let second = insert_table(conn, 2, 4);
        insert_booking(conn, first.id, user.id, date(), hm(19, 0), 3);

        let statuses = table_statuses(conn, date(), hm(18, 0), 3).unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].0.id, first.id);
        assert!(!statuses[0].1);
        assert_eq!(statuses[1].0.id, second.id);
        assert!(statuses[1].1);

        assert!(!is_table_available(conn, first.id, date(), hm(18, 0), 3).unwrap());
        assert!(is_table_available(conn, second.id, date(), hm(18, 0), 3).unwrap());
    }

    #[test]
    fn test_booking_outside_window_keeps_table_free() {
        let pool = test_pool();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let user = insert_user(conn, "guest@example.com");
        let table = insert_table(conn, 1, 2);
        insert_booking(conn, table.id, user.id, date(), hm(12, 0), 3);
        insert_booking(conn, table.id, user.id, next_date(), hm(18, 0), 3);

        // earlier booking still running at 14:00 is not seen by the check
        assert!(is_table_available(conn, table.id, date(), hm(14, 0), 3).unwrap());
        assert!(is_table_available(conn, table.id, date(), hm(18, 0), 3).unwrap());
        assert!(!is_table_available(conn, table.id, date(), hm(10, 0), 3).unwrap());
        assert!(!is_table_available(conn, table.id, date(), hm(9, 0), 3).unwrap());
    }

    #[test]
    fn test_booked_times_per_table_and_date() {
        let pool = test_pool();
        let mut pooled = pool.get().unwrap();
        let conn = &mut *pooled;
        let user = insert_user(conn, "guest@example.com");
        let table = insert_table(conn, 1, 2);
        let other = insert_table(conn, 2, 2);
        insert_booking(conn, table.id, user.id, date(), hm(18, 0), 3);
        insert_booking(conn, table.id, user.id, date(), hm(11, 30), 3);
        insert_booking(conn, other.id, user.id, date(), hm(13, 0), 3);
        insert_booking(conn, table.id, user.id, next_date(), hm(15, 0), 3);

        let times = booked_times(conn, table.id, date()).unwrap();
        assert_eq!(times, vec![hm(11, 30), hm(18, 0)]);
    }
}
