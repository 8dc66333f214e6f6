use std::{env, fmt::Display, str::FromStr};

use anyhow::{bail, Context};
use chrono::NaiveTime;

use crate::models::bookings::DEFAULT_DURATION_HOURS;

/// Opening hours and slot layout used by the booking flow.
#[derive(Clone, Copy, Debug)]
pub struct Schedule {
    pub opening_time: NaiveTime,
    /// Latest time a booking may start at.
    pub last_booking_time: NaiveTime,
    pub slot_minutes: i64,
    /// Number of days open for booking, counted from tomorrow.
    pub booking_days: i64,
    /// Span checked for overlapping bookings, starting at the requested time.
    pub window_hours: i64,
    pub duration_hours: i32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            last_booking_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
            slot_minutes: 30,
            booking_days: 7,
            window_hours: 3,
            duration_hours: DEFAULT_DURATION_HOURS,
        }
    }
}

/// How the SMTP connection is secured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmtpSecurity {
    Plain,
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// TLS from the first byte, usually port 465.
    Tls,
}

#[derive(Clone, Debug, Default)]
pub struct EmailConfig {
    pub host: Option<String>,
    pub port: u16,
    /// Sender address, also the mailbox receiving contact form messages.
    pub host_user: String,
    pub host_password: Option<String>,
    pub use_tls: bool,
    pub use_ssl: bool,
}

impl EmailConfig {
    pub fn security(&self) -> SmtpSecurity {
        if self.use_ssl {
            SmtpSecurity::Tls
        } else if self.use_tls {
            SmtpSecurity::StartTls
        } else {
            SmtpSecurity::Plain
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub database_url: String,
    pub pool_size: u32,
    pub static_dir: String,
    pub site_url: String,
    pub login_ttl_secs: i64,
    pub reset_ttl_secs: i64,
    pub expire_interval_secs: u64,
    pub email: EmailConfig,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub schedule: Schedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            database_url: "restaurant.db".to_string(),
            pool_size: 8,
            static_dir: "static".to_string(),
            site_url: "http://127.0.0.1:8080".to_string(),
            login_ttl_secs: 3600,
            reset_ttl_secs: 3 * 24 * 3600,
            expire_interval_secs: 300,
            email: EmailConfig {
                host: None,
                port: 25,
                host_user: "noreply@localhost".to_string(),
                host_password: None,
                use_tls: false,
                use_ssl: false,
            },
            admin_email: None,
            admin_password: None,
            schedule: Schedule::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let default = Self::default();
        Self {
            bind_address: load_or("BIND_ADDRESS", default.bind_address)?,
            database_url: load_or("DATABASE_URL", default.database_url)?,
            pool_size: load_or("DB_POOL_SIZE", default.pool_size)?,
            static_dir: load_or("STATIC_DIR", default.static_dir)?,
            site_url: load_or("SITE_URL", default.site_url)?,
            login_ttl_secs: load_or("LOGIN_TTL_SECS", default.login_ttl_secs)?,
            reset_ttl_secs: load_or("PASSWORD_RESET_TTL_SECS", default.reset_ttl_secs)?,
            expire_interval_secs: load_or("EXPIRE_INTERVAL_SECS", default.expire_interval_secs)?,
            email: EmailConfig {
                host: load_opt("EMAIL_HOST")?,
                port: load_or("EMAIL_PORT", default.email.port)?,
                host_user: load_or("EMAIL_HOST_USER", default.email.host_user)?,
                host_password: load_opt("EMAIL_HOST_PASSWORD")?,
                use_tls: load_or("EMAIL_USE_TLS", default.email.use_tls)?,
                use_ssl: load_or("EMAIL_USE_SSL", default.email.use_ssl)?,
            },
            admin_email: load_opt("ADMIN_EMAIL")?,
            admin_password: load_opt("ADMIN_PASSWORD")?,
            schedule: default.schedule,
        }
        .validate()
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.expire_interval_secs == 0 {
            bail!("EXPIRE_INTERVAL_SECS must be positive");
        }
        if self.pool_size == 0 {
            bail!("DB_POOL_SIZE must be positive");
        }
        if self.email.use_tls && self.email.use_ssl {
            bail!("EMAIL_USE_TLS and EMAIL_USE_SSL are mutually exclusive");
        }
        Ok(self)
    }
}

fn load_opt<T: FromStr>(key: &str) -> anyhow::Result<Option<T>>
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid {}", key)),
        _ => Ok(None),
    }
}

fn load_or<T: FromStr + Display>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: Display,
{
    match load_opt(key)? {
        Some(value) => Ok(value),
        None => {
            log::info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
