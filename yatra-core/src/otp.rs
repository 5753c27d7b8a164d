use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Default validity window for an issued code.
pub const DEFAULT_OTP_TTL_SECONDS: i64 = 180;

/// A single-use code bound to a customer email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub otp: String,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn new(email: &str, otp: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            otp,
            created_at: Utc::now(),
        }
    }

    /// Fresh record with a random code.
    pub fn issue(email: &str) -> Self {
        Self::new(email, generate_code())
    }

    /// Whether the code is still live for a given `validity_cutoff`.
    pub fn issued_after(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at > cutoff
    }
}

/// Uniform 6-digit code in `OTP_MIN..=OTP_MAX`.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX).to_string()
}

/// Earliest creation time a code may have and still be accepted.
pub fn validity_cutoff(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now - ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_six_digits() {
        for _ in 0..500 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = code.parse().unwrap();
            assert!((OTP_MIN..=OTP_MAX).contains(&n));
        }
    }

    #[test]
    fn test_expiry_window() {
        let ttl = Duration::seconds(DEFAULT_OTP_TTL_SECONDS);
        let mut record = OtpRecord::issue("a@x.com");
        let now = Utc::now();
        assert!(record.issued_after(validity_cutoff(now, ttl)));

        record.created_at = now - Duration::minutes(4);
        assert!(!record.issued_after(validity_cutoff(now, ttl)));

        // exactly ttl old is already expired
        record.created_at = now - ttl;
        assert!(!record.issued_after(validity_cutoff(now, ttl)));
    }

    #[test]
    fn test_persisted_shape() {
        let record = OtpRecord::new("a@x.com", "123456".to_string());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["otp"], "123456");
        assert!(value.get("createdAt").is_some());
    }
}
