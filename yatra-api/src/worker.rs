use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use yatra_core::OtpIssuer;

/// Periodically drops OTP codes older than the validity window.
pub async fn start_otp_sweeper(issuer: Arc<OtpIssuer>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    info!("OTP sweeper started, running every {:?}", every);

    loop {
        ticker.tick().await;
        match issuer.purge_expired().await {
            Ok(0) => {}
            Ok(removed) => info!("Purged {} expired OTP codes", removed),
            Err(e) => error!("Failed to purge expired OTP codes: {}", e),
        }
    }
}
