use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState};

/// Opaque session token of the current request, kept so logout can revoke it.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Auth schemes are case-insensitive, so `bearer` and `BEARER` work too.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn unauthenticated() -> AppError {
    AppError::AuthenticationError("Authentication required.".to_string())
}

/// Resolves the driver session and hands it to handlers as an extension.
pub async fn driver_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(unauthenticated)?;

    let session = state
        .sessions
        .resolve_session(&token)
        .await
        .map_err(|e| AppError::internal("Session lookup failed", e))?
        .ok_or_else(unauthenticated)?;

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(SessionToken(token));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer 9f2c"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("9f2c"));
    }

    #[test]
    fn test_bearer_scheme_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("bearer 9f2c"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("9f2c"));

        headers.insert("Authorization", HeaderValue::from_static("BEARER 9f2c"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("9f2c"));

        headers.insert("Authorization", HeaderValue::from_static("Bearer9f2c"));
        assert_eq!(bearer_token(&headers), None);
    }
}
