use std::sync::Arc;

use actix_web::web;
use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use crate::{
    config::{EmailConfig, SmtpSecurity},
    models::{bookings::Booking, tables::TableData, users::UserData},
    utils::{format_date_long, format_time_str},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Mail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    /// Address emails are sent from.
    fn sender(&self) -> &str;

    fn send(&self, mail: &Mail) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    from: String,
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(host: &str, config: &EmailConfig) -> anyhow::Result<Self> {
        let builder = match config.security() {
            SmtpSecurity::Tls => SmtpTransport::relay(host).context("SMTP TLS setup")?,
            SmtpSecurity::StartTls => {
                SmtpTransport::starttls_relay(host).context("SMTP STARTTLS setup")?
            }
            SmtpSecurity::Plain => SmtpTransport::builder_dangerous(host),
        };
        let mut builder = builder.port(config.port);
        if let Some(password) = &config.host_password {
            builder = builder.credentials(Credentials::new(
                config.host_user.clone(),
                password.clone(),
            ));
        }

        Ok(Self {
            from: config.host_user.clone(),
            transport: builder.build(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn sender(&self) -> &str {
        &self.from
    }

    fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        let mut builder = Message::builder()
            .from(self.from.parse::<Mailbox>().context("Invalid sender address")?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for to in &mail.to {
            builder = builder.to(to.parse::<Mailbox>().context("Invalid recipient address")?);
        }
        let message = builder.body(mail.body.clone()).context("Failed to build email")?;

        self.transport.send(&message).context("SMTP error")?;
        Ok(())
    }
}

/// Writes emails to the log when no SMTP server is configured.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new<S: Into<String>>(from: S) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    fn sender(&self) -> &str {
        &self.from
    }

    fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        log::info!(
            "email from {} to {}: {}\n{}",
            self.from,
            mail.to.join(", "),
            mail.subject,
            mail.body
        );
        Ok(())
    }
}

pub fn from_config(config: &EmailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.host {
        Some(host) => {
            log::info!(
                "Sending email through {}:{} ({:?})",
                host,
                config.port,
                config.security()
            );
            Ok(Arc::new(SmtpMailer::new(host, config)?))
        }
        None => {
            log::warn!("EMAIL_HOST not set, emails will only be logged");
            Ok(Arc::new(LogMailer::new(config.host_user.clone())))
        }
    }
}

/// Sends `mail` on the blocking pool. Failures are logged and swallowed.
pub async fn deliver(mailer: Arc<dyn Mailer>, mail: Mail) {
    let to = mail.to.join(", ");
    match web::block(move || mailer.send(&mail)).await {
        Ok(Ok(())) => log::info!("email sent to {}", to),
        Ok(Err(err)) => log::warn!("failed to send email to {}: {:#}", to, err),
        Err(err) => log::warn!("failed to send email to {}: {}", to, err),
    }
}

pub fn booking_confirmation(user: &UserData, table: &TableData, booking: &Booking) -> Mail {
    let body = format!(
        "Dear {},\n\n\
         Table No. {} [seats: {}] on {} at {} has been booked successfully.\n\n\
         Thank you for using our service!\n\
         See you soon!",
        user.first_name,
        table.number,
        table.seats,
        format_date_long(&booking.date_reserved),
        format_time_str(&booking.time_reserved),
    );

    Mail {
        to: vec![user.email.clone()],
        subject: "Table booking confirmation".to_string(),
        body,
    }
}

pub fn password_reset(user: &UserData, reset_link: &str) -> Mail {
    let body = format!(
        "Hello {},\n\n\
         A password reset was requested for your account.\n\
         Follow the link below to choose a new password:\n\n\
         {}\n\n\
         If you did not request this, ignore this email.",
        user.first_name, reset_link,
    );

    Mail {
        to: vec![user.email.clone()],
        subject: "Password reset".to_string(),
        body,
    }
}

pub fn contact_feedback(mailbox: &str, name: &str, email: &str, phone: &str, message: &str) -> Mail {
    let body = format!(
        "Feedback received from a user:\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Message: {}\n",
        name, email, phone, message,
    );

    Mail {
        to: vec![mailbox.to_string()],
        subject: format!("Message from user {}", email),
        body,
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::{Mail, Mailer};

    /// Keeps every email instead of sending it.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<Mail>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<Mail> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Mailer for RecordingMailer {
        fn sender(&self) -> &str {
            "restaurant@example.com"
        }

        fn send(&self, mail: &Mail) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }
}
