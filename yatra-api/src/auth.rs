use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use yatra_core::DriverSession;
use yatra_shared::Masked;

use crate::{error::AppError, state::AppState};

const INVALID_CREDENTIALS: &str = "Invalid Credentials";
const LOGIN_REQUIRED: &str = "Email and password are required.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub driver: DriverSession,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/driver-login", post(driver_login))
}

/// POST /driver-login
/// Check a driver's password and open a session
async fn driver_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::ValidationError(LOGIN_REQUIRED.to_string()))?;

    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::ValidationError(LOGIN_REQUIRED.to_string()));
    }

    let creds = state
        .drivers
        .find_driver_credentials(email)
        .await
        .map_err(|e| AppError::internal("Server Error", e))?
        .ok_or_else(|| AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()))?;

    let matched = state
        .passwords
        .verify(&password, &creds.password_hash)
        .await
        .map_err(|e| AppError::internal("Server Error", e))?;
    if !matched {
        info!("Failed login for {}", Masked(email));
        return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
    }

    let driver = creds.session();
    let token = state
        .sessions
        .create_session(&driver, state.business_rules.session_ttl_seconds)
        .await
        .map_err(|e| AppError::internal("Server Error", e))?;

    info!("Driver {} logged in", driver.driver_id);
    Ok(Json(LoginResponse { success: true, token, driver }))
}
