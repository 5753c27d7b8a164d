//! SMTP delivery of start-ride codes.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use yatra_core::mailer::{Mailer, OtpMessage, OTP_SUBJECT};
use yatra_core::repository::BoxError;

use crate::app_config::SmtpConfig;

/// Sends mail through an authenticated SMTP relay (STARTTLS).
///
/// One instance is built at startup and shared by every request.
#[derive(Clone)]
pub struct SmtpMailer {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Self {
        Self {
            smtp_server: config.host.clone(),
            smtp_port: config.port,
            credentials: Credentials::new(config.username.clone(), config.password.clone()),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport, BoxError> {
        Ok(SmtpTransport::starttls_relay(&self.smtp_server)?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    fn build_message(&self, message: &OtpMessage) -> Result<Message, BoxError> {
        Ok(Message::builder()
            .from(self.from_header().parse()?)
            .to(message.to.parse()?)
            .subject(OTP_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(message.render_html())?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), BoxError> {
        let email = self.build_message(message)?;
        let mailer = self.build_transport()?;

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "bot".to_string(),
            password: "secret".to_string(),
            from_email: "rides@example.com".to_string(),
            from_name: "Sharing Yatra".to_string(),
        })
    }

    #[test]
    fn test_builds_html_message() {
        let message = OtpMessage {
            to: "a@x.com".to_string(),
            recipient_name: "Asha".to_string(),
            code: "482913".to_string(),
            valid_for_seconds: 180,
        };

        let email = mailer().build_message(&message).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("To: a@x.com"));
        assert!(raw.contains("Sharing Yatra"));
        assert!(raw.contains("482913"));
    }

    #[test]
    fn test_rejects_bad_recipient() {
        let message = OtpMessage {
            to: "not an address".to_string(),
            recipient_name: "Asha".to_string(),
            code: "482913".to_string(),
            valid_for_seconds: 180,
        };

        assert!(mailer().build_message(&message).is_err());
    }
}
