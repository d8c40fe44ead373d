use serde::Serialize;

use crate::services::{ItemDto, LoginResult, RegisteredUser};

/// Error envelope for failed requests. Raw driver errors never reach
/// this type; the taxonomy in `error.rs` classifies them first.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub otp: u32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: String,
    pub msg: String,
    pub data: LoginResult,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub msg: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemDto>,
}
