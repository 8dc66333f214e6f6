//! Date and time arithmetic behind the booking flow.

use anyhow::bail;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{config::Schedule, models::bookings::Booking};

/// Every bookable start time, from opening up to and including the last
/// booking time.
pub fn all_slots(schedule: &Schedule) -> Vec<NaiveTime> {
    let step = Duration::minutes(schedule.slot_minutes.max(1));

    let mut slots = Vec::new();
    let mut time = schedule.opening_time;
    while time <= schedule.last_booking_time {
        slots.push(time);
        let (next, wrapped) = time.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        time = next;
    }
    slots
}

/// `all` minus every time present in `booked`. Order of `all` is kept.
pub fn free_slots(all: &[NaiveTime], booked: &[NaiveTime]) -> Vec<NaiveTime> {
    all.iter()
        .filter(|slot| !booked.contains(slot))
        .copied()
        .collect()
}

/// Closed interval of start times that conflict with a booking at `time`.
///
/// The end is clamped to the last second of the day instead of wrapping.
pub fn availability_window(time: NaiveTime, hours: i64) -> (NaiveTime, NaiveTime) {
    let (end, wrapped) = time.overflowing_add_signed(Duration::hours(hours));
    if wrapped != 0 {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(time);
        (time, last_second)
    } else {
        (time, end)
    }
}

pub fn in_window(window: (NaiveTime, NaiveTime), time: NaiveTime) -> bool {
    window.0 <= time && time <= window.1
}

/// First and last date open for booking when today is `today`.
pub fn bookable_dates(today: NaiveDate, schedule: &Schedule) -> (NaiveDate, NaiveDate) {
    let first = today + Duration::days(1);
    let last = first + Duration::days((schedule.booking_days - 1).max(0));
    (first, last)
}

pub fn check_date(date: NaiveDate, today: NaiveDate, schedule: &Schedule) -> anyhow::Result<()> {
    let (first, last) = bookable_dates(today, schedule);
    if date < first || date > last {
        bail!("Booking is only possible from {} to {}", first, last);
    }
    Ok(())
}

pub fn check_time(time: NaiveTime, schedule: &Schedule) -> anyhow::Result<()> {
    if !all_slots(schedule).contains(&time) {
        bail!("Time {} is not a bookable slot", time.format("%H:%M"));
    }
    Ok(())
}

pub fn booking_end(date: NaiveDate, time: NaiveTime, duration_hours: i32) -> NaiveDateTime {
    date.and_time(time) + Duration::hours(i64::from(duration_hours))
}

pub fn is_expired(booking: &Booking, now: NaiveDateTime) -> bool {
    now >= booking_end(booking.date_reserved, booking.time_reserved, booking.duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking_at(date: NaiveDate, time: NaiveTime, duration: i32) -> Booking {
        Booking {
            id: 1,
            table_id: Some(1),
            client_id: Some(1),
            date_reserved: date,
            time_reserved: time,
            duration,
            message: None,
            created_at: date.and_hms_opt(0, 0, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_all_slots_cover_opening_hours() {
        let slots = all_slots(&Schedule::default());
        assert_eq!(slots.len(), 21);
        assert_eq!(slots.first(), Some(&hm(10, 0)));
        assert_eq!(slots[1], hm(10, 30));
        assert_eq!(slots.last(), Some(&hm(20, 0)));
        assert!(!slots.contains(&hm(20, 30)));
    }

    #[test]
    fn test_free_slots_is_flat_difference() {
        let all = all_slots(&Schedule::default());
        let booked = vec![hm(12, 0), hm(18, 30), hm(9, 0)];
        let free = free_slots(&all, &booked);

        assert_eq!(free.len(), all.len() - 2);
        assert!(!free.contains(&hm(12, 0)));
        assert!(!free.contains(&hm(18, 30)));
        assert!(free.contains(&hm(12, 30)));
        assert!(free.contains(&hm(11, 30)));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = availability_window(hm(18, 0), 3);
        assert_eq!(window, (hm(18, 0), hm(21, 0)));
        assert!(in_window(window, hm(18, 0)));
        assert!(in_window(window, hm(21, 0)));
        assert!(!in_window(window, hm(17, 30)));
        assert!(!in_window(window, hm(21, 30)));
    }

    #[test]
    fn test_window_clamped_at_midnight() {
        let window = availability_window(hm(22, 30), 3);
        assert_eq!(window, (hm(22, 30), NaiveTime::from_hms_opt(23, 59, 59).unwrap()));
    }

    #[test]
    fn test_bookable_dates_start_tomorrow() {
        let schedule = Schedule::default();
        let today = ymd(2026, 10, 19);
        assert_eq!(bookable_dates(today, &schedule), (ymd(2026, 10, 20), ymd(2026, 10, 26)));
        assert!(check_date(today, today, &schedule).is_err());
        assert!(check_date(ymd(2026, 10, 20), today, &schedule).is_ok());
        assert!(check_date(ymd(2026, 10, 26), today, &schedule).is_ok());
        assert!(check_date(ymd(2026, 10, 27), today, &schedule).is_err());
    }

    #[test]
    fn test_check_time_accepts_only_slots() {
        let schedule = Schedule::default();
        assert!(check_time(hm(10, 0), &schedule).is_ok());
        assert!(check_time(hm(19, 30), &schedule).is_ok());
        assert!(check_time(hm(10, 15), &schedule).is_err());
        assert!(check_time(hm(9, 30), &schedule).is_err());
    }

    #[test]
    fn test_expiry_uses_stored_duration() {
        let date = ymd(2026, 3, 5);
        let booking = booking_at(date, hm(18, 0), 3);

        assert!(!is_expired(&booking, date.and_hms_opt(20, 59, 59).unwrap()));
        assert!(is_expired(&booking, date.and_hms_opt(21, 0, 0).unwrap()));

        let short = booking_at(date, hm(18, 0), 1);
        assert!(is_expired(&short, date.and_hms_opt(19, 0, 0).unwrap()));
    }

    #[test]
    fn test_booking_end_crosses_midnight() {
        let end = booking_end(ymd(2026, 3, 5), hm(22, 0), 3);
        assert_eq!(end, ymd(2026, 3, 6).and_hms_opt(1, 0, 0).unwrap());
    }
}
