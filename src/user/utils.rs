use anyhow::{bail, Context};
use blake2::{Blake2b512, Digest};
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{
    database::assert,
    models::{user_logins::UserLoginData, users::UserData},
};

const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Blake2b512::digest(password.as_bytes()))
}

/// Opaque token derived from `seed` and the current instant.
pub fn new_token(seed: &str, now: NaiveDateTime) -> String {
    let nanos = now.and_utc().timestamp_nanos_opt().unwrap_or_default();
    format!("{:x}", Blake2b512::digest(format!("{}:{}", seed, nanos).as_bytes()))
}

pub fn get_user_id_from_token(
    conn: &mut SqliteConnection,
    token: &str,
    max_login_secs: i64,
    now: NaiveDateTime,
) -> anyhow::Result<i32> {
    use crate::schema::user_logins;

    let data = user_logins::table
        .filter(user_logins::token.eq(token))
        .order(user_logins::login_time.desc())
        .limit(1)
        .get_result::<UserLoginData>(conn)
        .optional()
        .context("DB error")?;

    if let Some(data) = data {
        let time_diff = now.signed_duration_since(data.login_time);
        if time_diff.num_seconds() <= max_login_secs {
            Ok(data.user_id)
        } else {
            bail!("Login expired");
        }
    } else {
        bail!("You are not logged in");
    }
}

/// Active user owning the login `token`.
pub fn login_user(
    conn: &mut SqliteConnection,
    token: &str,
    max_login_secs: i64,
) -> anyhow::Result<UserData> {
    let user_id = get_user_id_from_token(conn, token, max_login_secs, crate::utils::now())?;
    assert::assert_user(conn, user_id)
}

/// Lower-cased, trimmed email if it looks like `local@domain.tld`.
pub fn normalize_email(email: &str) -> anyhow::Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        bail!("Enter a valid email address");
    }
    Ok(email)
}

pub fn validate_password(password: &str, confirmation: &str) -> anyhow::Result<()> {
    if password != confirmation {
        bail!("The two password fields didn't match");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!(
            "This password is too short. It must contain at least {} characters",
            MIN_PASSWORD_LEN
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        bail!("This password is entirely numeric");
    }
    Ok(())
}

/// `+` followed by 7 to 15 digits, spaces and dashes ignored.
pub fn normalize_phone(phone: &str) -> anyhow::Result<String> {
    let phone: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = phone.strip_prefix('+').unwrap_or("");
    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("Enter a valid phone number");
    }
    Ok(phone)
}

/// ISO 3166 alpha-2 country code, upper-cased.
pub fn normalize_country(country: &str) -> anyhow::Result<String> {
    let country = country.trim().to_uppercase();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("Select a valid country");
    }
    Ok(country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Guest@Example.COM ").unwrap(),
            "guest@example.com"
        );
        assert!(normalize_email("guest").is_err());
        assert!(normalize_email("guest@localhost").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a b@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct-horse", "correct-horse").is_ok());
        assert!(validate_password("correct-horse", "correct-house").is_err());
        assert!(validate_password("short", "short").is_err());
        assert!(validate_password("1234567890", "1234567890").is_err());
    }

    #[test]
    fn test_normalize_phone_and_country() {
        assert_eq!(normalize_phone("+7 999 123-45-67").unwrap(), "+79991234567");
        assert!(normalize_phone("89991234567").is_err());
        assert!(normalize_phone("+7").is_err());
        assert_eq!(normalize_country("ru").unwrap(), "RU");
        assert!(normalize_country("Russia").is_err());
    }

    #[test]
    fn test_password_hash_is_stable() {
        assert_eq!(hash_password("secret-pass"), hash_password("secret-pass"));
        assert_ne!(hash_password("secret-pass"), hash_password("secret-pasS"));
        assert_eq!(hash_password("secret-pass").len(), 128);
    }
}
