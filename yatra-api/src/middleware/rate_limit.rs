use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::{error::AppError, state::AppState};

const OTP_WINDOW_SECONDS: i64 = 60 * 60;

/// Caps OTP issuance per client IP. Fails open when the counter store is down.
pub async fn otp_rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("ratelimit:start-ride:{}", addr.ip());
    let limit = state.business_rules.otp_requests_per_hour;

    match state.rate_limiter.check_rate_limit(&key, limit, OTP_WINDOW_SECONDS).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err(AppError::RateLimited(
            "Too many OTP requests. Please try again after an hour.".to_string(),
        )),
        Err(e) => {
            tracing::warn!("Rate limiter unavailable, allowing request: {}", e);
            Ok(next.run(req).await)
        }
    }
}
