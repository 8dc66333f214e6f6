#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:tt, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[actix_web::post($url)]
                async fn $func_name(
                    state: actix_web::web::Data<$crate::AppState>,
                    info: actix_web::web::Json<$request>,
                ) -> impl actix_web::Responder {
                    let response = match [<$func_name _impl>](state, info).await {
                        Ok(response) => response,
                        Err(err) => {
                            log::debug!("{} failed: {:#}", $url, err);
                            <$response as $crate::protocol::ErrorResponse>::err(err.to_string())
                        }
                    };
                    actix_web::HttpResponse::Ok().json(response)
                }
            }
        )+
    };
}

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";
const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

// four digit years keep the text encoded dates ordered in SQLite
fn first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn last_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Current wall clock time of the restaurant.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn parse_date_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.as_ref().trim(), DATE_FMT).context("Invalid date format")
}

/// Accepts both `HH:MM` and `HH:MM:SS`.
pub fn parse_time_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveTime> {
    let s = s.as_ref().trim();
    NaiveTime::parse_from_str(s, TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .context("Invalid time format")
}

/// Inclusive date range; a missing bound leaves that side open.
pub fn parse_date_pair_str_opt<S1: AsRef<str>, S2: AsRef<str>>(
    first: Option<S1>,
    last: Option<S2>,
) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let first = first.map_or(Ok(first_date()), |d| {
        parse_date_str(d).context("Invalid start date")
    })?;
    let last = last.map_or(Ok(last_date()), |d| {
        parse_date_str(d).context("Invalid end date")
    })?;
    Ok((first, last))
}

pub fn format_date_str(date: &NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub fn format_time_str(time: &NaiveTime) -> String {
    time.format(TIME_FMT).to_string()
}

pub fn format_datetime_str(time: &NaiveDateTime) -> String {
    time.format(DATETIME_FMT).to_string()
}

/// Human readable date for emails, e.g. `5 March 2026`.
pub fn format_date_long(date: &NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_str() {
        let expected = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
        assert_eq!(parse_time_str("18:30").unwrap(), expected);
        assert_eq!(parse_time_str("18:30:00").unwrap(), expected);
        assert!(parse_time_str("6pm").is_err());
    }

    #[test]
    fn test_parse_date_str() {
        assert_eq!(
            parse_date_str("2026-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()
        );
        assert!(parse_date_str("05.03.2026").is_err());
    }

    #[test]
    fn test_parse_date_pair_str_opt() {
        let (first, last) = parse_date_pair_str_opt::<&str, &str>(None, None).unwrap();
        assert_eq!((first, last), (first_date(), last_date()));

        let (first, last) = parse_date_pair_str_opt(Some("2026-03-05"), None::<&str>).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(last, last_date());

        assert!(parse_date_pair_str_opt(None::<&str>, Some("tomorrow")).is_err());
    }

    #[test]
    fn test_format_date_long() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(format_date_long(&date), "5 March 2026");
        assert_eq!(format_date_str(&date), "2026-03-05");
    }
}
