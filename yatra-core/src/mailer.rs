use async_trait::async_trait;
use yatra_shared::Masked;

use crate::repository::BoxError;

pub const OTP_SUBJECT: &str = "Action Required: Your Sharing Yatra Start-Ride Code";

/// The start-ride code email sent to a customer.
#[derive(Debug, Clone)]
pub struct OtpMessage {
    pub to: String,
    pub recipient_name: String,
    pub code: String,
    pub valid_for_seconds: i64,
}

impl OtpMessage {
    /// Whole minutes rounded up; windows under a minute are given in seconds.
    pub fn validity_text(&self) -> String {
        let seconds = self.valid_for_seconds.max(0);
        if seconds < 60 {
            return format!("{} seconds", seconds);
        }
        match (seconds + 59) / 60 {
            1 => "1 minute".to_string(),
            minutes => format!("{} minutes", minutes),
        }
    }

    pub fn render_html(&self) -> String {
        format!(
            r#"
<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2 style="color: #0056b3;">Sharing Yatra - Ride Verification</h2>
    <p>Dear {name},</p>
    <p>Please use the following One-Time Password (OTP) to begin your ride. This code is valid for {validity}.</p>
    <h1 style="font-size: 36px; text-align: center; letter-spacing: 3px; color: #111; background-color: #f4f4f4; padding: 15px 0; border-radius: 5px;">
        {code}
    </h1>
    <p style="font-weight: bold; color: #D9534F;">
        Share this OTP with your Driver Partner to start the ride.
    </p>
    <p>For your security, do not share this code with anyone else.</p>
    <hr style="border: 0; border-top: 1px solid #eee;">
    <p style="font-size: 0.9em; color: #777;">
        Thank you,<br>
        The Sharing Yatra Team<br>
        Happy Journey
    </p>
</div>
"#,
            name = escape_html(&self.recipient_name),
            validity = self.validity_text(),
            code = self.code,
        )
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Outbound mail transport. Built once at startup and shared.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), BoxError>;
}

/// Writes the code to the log instead of sending mail. Development only.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, message: &OtpMessage) -> Result<(), BoxError> {
        tracing::info!(
            "OTP for {}: {} (valid for {})",
            Masked(message.to.as_str()),
            message.code,
            message.validity_text()
        );
        Ok(())
    }
}
