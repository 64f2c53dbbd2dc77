use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Server did not become ready after {attempts} attempts")]
    ServerUnavailable { attempts: u32 },

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Rejected by server: {0}")]
    ValidationError(String),

    #[error("Not authenticated - please log in again")]
    Unauthenticated,

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0:#}")]
    Storage(anyhow::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shapes the backend uses for error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Extract the human-readable message from an error response body.
    ///
    /// Prefers the JSON `message` field, then `error`, then the raw body.
    pub fn server_message(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            if let Some(msg) = parsed.message.or(parsed.error) {
                return msg;
            }
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            Self::truncate_body(trimmed)
        }
    }

    /// Map a non-success status from an authenticated endpoint.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => ApiError::Unauthenticated,
            code => ApiError::RequestFailed {
                status: code,
                message: Self::server_message(status, body),
            },
        }
    }

    /// Map a non-success status from the credential exchange endpoint.
    pub fn from_login_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 401 | 403 => ApiError::InvalidCredentials(Self::server_message(status, body)),
            code => ApiError::RequestFailed {
                status: code,
                message: Self::server_message(status, body),
            },
        }
    }

    /// Map a non-success status from the registration endpoint.
    pub fn from_signup_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 | 409 | 422 => ApiError::ValidationError(Self::server_message(status, body)),
            code => ApiError::RequestFailed {
                status: code,
                message: Self::server_message(status, body),
            },
        }
    }

    /// Whether this error means the stored session is no longer usable.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_prefers_json_message() {
        let msg = ApiError::server_message(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Email already in use", "error": "Conflict"}"#,
        );
        assert_eq!(msg, "Email already in use");

        let msg = ApiError::server_message(StatusCode::BAD_REQUEST, r#"{"error": "Bad input"}"#);
        assert_eq!(msg, "Bad input");
    }

    #[test]
    fn test_server_message_falls_back_to_body_or_reason() {
        let msg = ApiError::server_message(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(msg, "upstream down");

        let msg = ApiError::server_message(StatusCode::NOT_FOUND, "");
        assert_eq!(msg, "Not Found");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated, 520 total bytes"));

        // Multi-byte characters straddling the limit must not panic
        let accents = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = ApiError::truncate_body(&accents);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_from_status_auth_failures() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthenticated());
        assert!(ApiError::from_status(StatusCode::FORBIDDEN, "").is_unauthenticated());

        match ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"Post not found"}"#) {
            ApiError::RequestFailed { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Post not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_login_and_signup_mapping() {
        assert!(matches!(
            ApiError::from_login_status(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid"}"#),
            ApiError::InvalidCredentials(m) if m == "Invalid"
        ));
        assert!(matches!(
            ApiError::from_login_status(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ApiError::RequestFailed { status: 500, .. }
        ));
        assert!(matches!(
            ApiError::from_signup_status(StatusCode::CONFLICT, r#"{"error":"Username taken"}"#),
            ApiError::ValidationError(m) if m == "Username taken"
        ));
        assert!(matches!(
            ApiError::from_signup_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::RequestFailed { status: 401, .. }
        ));
    }
}
