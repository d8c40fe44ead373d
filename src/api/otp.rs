use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, SendOtpResponse};
use crate::services::otp;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub email: String,
}

/// Both values may arrive as JSON numbers or strings; they are
/// normalized before comparison.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub entered_otp: serde_json::Value,
    #[serde(default)]
    pub generated_otp: serde_json::Value,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /send-otp
/// Generate a six-digit code, email it, and return it to the caller.
/// The server holds no record of the code; the client echoes it back
/// to /verify-otp.
pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let code = otp::generate_code();

    // On transport failure the code is not returned to the caller.
    state.mailer.send_otp(email, code).await?;

    Ok(Json(SendOtpResponse {
        otp: code,
        message: "OTP sent successfully".to_string(),
    }))
}

/// POST /verify-otp
/// Exact comparison of the entered code against the previously issued
/// one. Malformed input and a wrong code fail identically.
pub async fn verify_otp(
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<&'static str, ApiError> {
    let entered = otp::normalize_code(&payload.entered_otp);
    let generated = otp::normalize_code(&payload.generated_otp);

    match (entered, generated) {
        (Some(entered), Some(generated)) if otp::verify_code(&entered, &generated) => {
            Ok("OTP verified successfully")
        }
        _ => Err(ApiError::AuthError("Invalid OTP".to_string())),
    }
}
