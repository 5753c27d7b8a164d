use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;
use yatra_core::DriverSession;
use yatra_shared::Masked;

use crate::{error::AppError, middleware::otp_rate_limit_middleware, state::AppState};

const START_RIDE_REQUIRED: &str = "Customer email and name are required to send an OTP.";
const VERIFY_REQUIRED: &str = "Booking ID and OTP are required.";

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRideRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub booking_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub otp: Option<String>,
}

/// Ride forms post codes both as `"123456"` and `123456`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn present(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/start-ride", post(start_ride))
        .route_layer(axum::middleware::from_fn_with_state(state, otp_rate_limit_middleware))
}

pub fn driver_routes() -> Router<AppState> {
    Router::new().route("/verify-otp", post(verify_otp))
}

/// POST /start-ride
/// Issue and mail a fresh OTP to the customer
async fn start_ride(
    State(state): State<AppState>,
    payload: Result<Json<StartRideRequest>, JsonRejection>,
) -> Result<Json<ApiMessage>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::ValidationError(START_RIDE_REQUIRED.to_string()))?;

    let (Some(email), Some(name)) = (present(req.email), present(req.name)) else {
        return Err(AppError::ValidationError(START_RIDE_REQUIRED.to_string()));
    };

    state
        .issuer
        .issue(&email, &name)
        .await
        .map_err(|e| AppError::from_ride(e, "Failed to send OTP"))?;

    info!("Start-ride OTP sent to {}", Masked(email.as_str()));
    Ok(Json(ApiMessage::ok("OTP sent successfully")))
}

/// POST /verify-otp
/// Spend a customer OTP to start or complete a ride
async fn verify_otp(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverSession>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<ApiMessage>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::ValidationError(VERIFY_REQUIRED.to_string()))?;

    let (Some(booking_id), Some(otp)) = (present(req.booking_id), present(req.otp)) else {
        return Err(AppError::ValidationError(VERIFY_REQUIRED.to_string()));
    };

    let result = state
        .lifecycle
        .verify_and_advance(&driver, &booking_id, &otp)
        .await
        .map_err(|e| AppError::from_ride(e, "Server error during OTP verification."))?;

    Ok(Json(ApiMessage::ok(result.message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_request_accepts_numeric_otp() {
        let req: VerifyOtpRequest =
            serde_json::from_str(r#"{"bookingId":"b1","otp":482913}"#).unwrap();
        assert_eq!(req.booking_id.as_deref(), Some("b1"));
        assert_eq!(req.otp.as_deref(), Some("482913"));
    }

    #[test]
    fn test_verify_request_missing_fields() {
        let req: VerifyOtpRequest = serde_json::from_str(r#"{"otp":"482913"}"#).unwrap();
        assert!(req.booking_id.is_none());

        let req: VerifyOtpRequest = serde_json::from_str(r#"{"bookingId":null,"otp":true}"#).unwrap();
        assert!(req.booking_id.is_none());
        assert!(req.otp.is_none());
    }

    #[test]
    fn test_blank_fields_are_absent() {
        assert_eq!(present(Some("  ".to_string())), None);
        assert_eq!(present(Some(" a@x.com ".to_string())).as_deref(), Some("a@x.com"));
    }
}
