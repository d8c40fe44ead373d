use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, LoginResponse, RegisterResponse};
use crate::services::NewAccount;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /Newuser
/// Register an account. The response carries the identity projection
/// only; the password hash never leaves the service layer.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if payload.username.trim().is_empty()
        || payload.password.is_empty()
        || payload.email.trim().is_empty()
    {
        return Err(ApiError::validation(
            "Username, password, and email are required",
        ));
    }

    let user = state
        .accounts
        .register(NewAccount {
            username: payload.username.trim().to_string(),
            password: payload.password,
            email: payload.email.trim().to_string(),
            phone_number: payload.phone_number,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// POST /login
/// Verify credentials by email and return the minimal identity
/// projection. No token or session is issued.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let identity = state
        .accounts
        .login(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        status: "Success".to_string(),
        msg: "Login successful".to_string(),
        data: identity,
    }))
}
