use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};
use yatra_shared::Masked;

use crate::mailer::{Mailer, OtpMessage};
use crate::otp::{validity_cutoff, OtpRecord};
use crate::repository::OtpRepository;
use crate::{RideError, RideResult};

/// Issues start-ride codes and looks them up again for verification.
pub struct OtpIssuer {
    otps: Arc<dyn OtpRepository>,
    mailer: Arc<dyn Mailer>,
    ttl: Duration,
}

impl OtpIssuer {
    pub fn new(otps: Arc<dyn OtpRepository>, mailer: Arc<dyn Mailer>, ttl: Duration) -> Self {
        Self { otps, mailer, ttl }
    }

    /// Replace any outstanding code for `email` and mail the new one.
    ///
    /// The record is persisted before the mail goes out; if sending fails the
    /// code stays valid until it expires.
    pub async fn issue(&self, email: &str, display_name: &str) -> RideResult<OtpRecord> {
        let email = email.trim();
        let display_name = display_name.trim();
        if email.is_empty() || display_name.is_empty() {
            return Err(RideError::Validation(
                "customer email and name are required".to_string(),
            ));
        }

        let record = OtpRecord::issue(email);
        self.otps.replace_for_email(&record).await.map_err(|e| {
            error!("Failed to store OTP for {}: {}", Masked(email), e);
            RideError::transport(e)
        })?;

        let message = OtpMessage {
            to: email.to_string(),
            recipient_name: display_name.to_string(),
            code: record.otp.clone(),
            valid_for_seconds: self.ttl.num_seconds(),
        };
        self.mailer.send_otp(&message).await.map_err(|e| {
            error!("Failed to mail OTP to {}: {}", Masked(email), e);
            RideError::transport(e)
        })?;

        info!("OTP issued for {}", Masked(email));
        Ok(record)
    }

    /// Find a live code matching both `email` and `code`.
    ///
    /// The record is not deleted here; the caller spends it together with the
    /// state change it authorises.
    pub async fn consume(&self, email: &str, code: &str) -> RideResult<Option<OtpRecord>> {
        let cutoff = validity_cutoff(Utc::now(), self.ttl);
        self.otps
            .find_valid(email, code.trim(), cutoff)
            .await
            .map_err(RideError::transport)
    }

    /// Remove codes that can no longer be accepted.
    pub async fn purge_expired(&self) -> RideResult<u64> {
        let cutoff = validity_cutoff(Utc::now(), self.ttl);
        self.otps
            .purge_issued_before(cutoff)
            .await
            .map_err(RideError::transport)
    }
}
