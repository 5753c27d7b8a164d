use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use yatra_core::{DriverProfile, DriverSession, RideScope, RideView};

use crate::{error::AppError, middleware::SessionToken, rides::ApiMessage, state::AppState};

#[derive(Debug, Serialize)]
pub struct RidesResponse {
    pub rides: Vec<RideView>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/driver-dashboard", get(dashboard))
        .route("/driver-rides", get(active_rides))
        .route("/driver-history", get(ride_history))
        .route("/logout", get(logout))
}

/// GET /driver-dashboard
async fn dashboard(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverSession>,
) -> Result<Json<DriverProfile>, AppError> {
    let profile = state
        .drivers
        .get_driver_profile(driver.driver_id)
        .await
        .map_err(|e| AppError::internal("Error Loading your Dashboard", e))?
        .ok_or_else(|| AppError::NotFoundError("Driver not found.".to_string()))?;

    Ok(Json(profile))
}

/// GET /driver-rides
/// Assigned rides that are not completed yet, newest first
async fn active_rides(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverSession>,
) -> Result<Json<RidesResponse>, AppError> {
    list_rides(&state, &driver, RideScope::Active).await
}

/// GET /driver-history
async fn ride_history(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverSession>,
) -> Result<Json<RidesResponse>, AppError> {
    list_rides(&state, &driver, RideScope::History).await
}

async fn list_rides(
    state: &AppState,
    driver: &DriverSession,
    scope: RideScope,
) -> Result<Json<RidesResponse>, AppError> {
    let rides = state
        .bookings
        .list_driver_rides(driver.driver_id, scope)
        .await
        .map_err(|e| AppError::internal("Error Loading your rides", e))?;

    tracing::debug!("Driver {} has {} {:?} rides", driver.driver_id, rides.len(), scope);
    Ok(Json(RidesResponse { rides }))
}

/// GET /logout
async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Json<ApiMessage>, AppError> {
    state
        .sessions
        .revoke_session(&token)
        .await
        .map_err(|e| AppError::internal("Logout failed", e))?;

    Ok(Json(ApiMessage::ok("Logged out")))
}
