use std::sync::Arc;
use yatra_core::repository::{
    BookingRepository, DriverRepository, PasswordVerifier, RateLimiter, SessionStore,
};
use yatra_core::{OtpIssuer, RideLifecycle};
use yatra_store::app_config::BusinessRules;

#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<OtpIssuer>,
    pub lifecycle: Arc<RideLifecycle>,
    pub bookings: Arc<dyn BookingRepository>,
    pub drivers: Arc<dyn DriverRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub passwords: Arc<dyn PasswordVerifier>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub business_rules: BusinessRules,
}
