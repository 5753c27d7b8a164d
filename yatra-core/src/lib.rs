pub mod booking;
pub mod driver;
pub mod events;
pub mod issuer;
pub mod lifecycle;
pub mod mailer;
pub mod memory;
pub mod otp;
pub mod repository;
pub mod vehicle;

pub use booking::{Booking, BookingStatus, RideScope, RideTransition, RideView};
pub use driver::{DriverCredentials, DriverProfile, DriverSession};
pub use issuer::OtpIssuer;
pub use lifecycle::{RideLifecycle, TransitionResult};
pub use otp::OtpRecord;
pub use vehicle::Vehicle;

#[derive(Debug, thiserror::Error)]
pub enum RideError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid or expired OTP")]
    InvalidCredential,
    #[error("Ride status is '{0}' and cannot be updated this way.")]
    InvalidState(BookingStatus),
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl RideError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type RideResult<T> = Result<T, RideError>;
