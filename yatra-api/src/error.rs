use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use yatra_core::RideError;

/// Every failure leaves the API as `{ success: false, message }`.
#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    RateLimited(String),
    /// `message` goes to the client, `cause` only to the log.
    InternalServerError { message: String, cause: String },
}

impl AppError {
    pub fn internal(message: &str, cause: impl std::fmt::Display) -> Self {
        AppError::InternalServerError {
            message: message.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Map a domain error; `internal_message` is what a transport failure shows.
    pub fn from_ride(err: RideError, internal_message: &str) -> Self {
        match err {
            RideError::Validation(msg) => AppError::ValidationError(msg),
            RideError::NotFound(what) => AppError::NotFoundError(format!("{} not found.", what)),
            RideError::InvalidCredential => {
                AppError::ValidationError("Invalid or expired OTP. Please try again.".to_string())
            }
            err @ RideError::InvalidState(_) => AppError::ValidationError(err.to_string()),
            RideError::Transport(cause) => AppError::internal(internal_message, cause),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::InternalServerError { message, cause } => {
                tracing::error!("Internal Server Error: {}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yatra_core::BookingStatus;

    #[test]
    fn test_ride_errors_map_to_envelope_status() {
        let cases = [
            (RideError::NotFound("Booking"), StatusCode::NOT_FOUND),
            (RideError::InvalidCredential, StatusCode::BAD_REQUEST),
            (RideError::InvalidState(BookingStatus::Completed), StatusCode::BAD_REQUEST),
            (RideError::Validation("x".to_string()), StatusCode::BAD_REQUEST),
            (RideError::Transport("db down".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = AppError::from_ride(err, "Server error").into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_invalid_state_echoes_status() {
        match AppError::from_ride(RideError::InvalidState(BookingStatus::Pending), "x") {
            AppError::ValidationError(msg) => {
                assert_eq!(msg, "Ride status is 'pending' and cannot be updated this way.")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
