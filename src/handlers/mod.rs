pub mod bookings;
pub mod documents;
pub mod earnings;
pub mod health;
pub mod offers;

use axum::http::HeaderMap;

use crate::errors::AppError;

/// Provider-facing endpoints share a single bearer token.
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
