use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus, RideScope, RideView};
use crate::driver::{DriverCredentials, DriverProfile, DriverSession};
use crate::otp::OtpRecord;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the store must apply atomically when a ride advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommit {
    pub booking_id: Uuid,
    /// Status read before the OTP was checked; the update is guarded on it.
    pub expected: BookingStatus,
    pub next: BookingStatus,
    /// Vehicle whose capacity goes up by one, on completion only.
    pub release_vehicle: Option<Uuid>,
    /// The consumed code, deleted by id in the same unit of work.
    pub otp_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied { vehicle_released: bool },
    /// Booking no longer had the expected status. Nothing was written.
    StatusChanged,
    /// The OTP row was already gone. Nothing was written.
    OtpSpent,
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, BoxError>;

    async fn list_driver_rides(
        &self,
        driver_id: Uuid,
        scope: RideScope,
    ) -> Result<Vec<RideView>, BoxError>;

    /// Status-guarded update, capacity release and OTP deletion as one unit.
    async fn commit_transition(&self, commit: &TransitionCommit) -> Result<CommitOutcome, BoxError>;
}

/// Repository trait for OTP records
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Delete every code for `record.email`, then store `record`.
    async fn replace_for_email(&self, record: &OtpRecord) -> Result<(), BoxError>;

    /// Exact email + code match created strictly after `issued_after`.
    async fn find_valid(
        &self,
        email: &str,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>, BoxError>;

    /// Drop codes created at or before `cutoff`; returns how many went.
    async fn purge_issued_before(&self, cutoff: DateTime<Utc>) -> Result<u64, BoxError>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn get_driver_profile(&self, id: Uuid) -> Result<Option<DriverProfile>, BoxError>;

    async fn find_driver_credentials(&self, email: &str) -> Result<Option<DriverCredentials>, BoxError>;
}

/// Checks a submitted password against a stored hash.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, BoxError>;
}

/// Server-side driver sessions keyed by an opaque token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &DriverSession, ttl_seconds: u64) -> Result<String, BoxError>;

    async fn resolve_session(&self, token: &str) -> Result<Option<DriverSession>, BoxError>;

    async fn revoke_session(&self, token: &str) -> Result<(), BoxError>;
}

/// Fixed-window request counter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records a hit on `key`; `false` once more than `limit` hits land in the window.
    async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> Result<bool, BoxError>;
}
