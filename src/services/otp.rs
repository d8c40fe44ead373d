//! One-time passcode generation and verification.
//!
//! Codes are never persisted: the server issues a code, mails it, and
//! returns it to the caller, who echoes it back alongside the entered
//! value for verification. There is no expiry and no single-use marker.

use rand::Rng;

/// Inclusive bounds of the six-digit code range.
pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;

/// Draw a code uniformly from `[OTP_MIN, OTP_MAX]`.
#[must_use]
pub fn generate_code() -> u32 {
    rand::rng().random_range(OTP_MIN..=OTP_MAX)
}

/// Normalize a submitted code to its trimmed string form. Clients send
/// codes back either as JSON numbers or strings; both compare equal.
#[must_use]
pub fn normalize_code(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Exact equality on the normalized string forms. A wrong code and a
/// malformed one are not distinguished; both fail verification.
#[must_use]
pub fn verify_code(entered: &str, generated: &str) -> bool {
    let entered = entered.trim();
    let generated = generated.trim();

    !entered.is_empty() && entered == generated
}
