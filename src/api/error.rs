//! Error classification for remote API calls.
//!
//! The flows only care about three distinctions: the request never made it
//! (network-class), the server processed it and said no (logical rejection,
//! with the server's own message when it sent one), or the session is gone
//! (auth expiry). Everything a caller shows to the user comes out of
//! [`ApiError::user_message`]; control flow branches on the variant.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Shown for any failure where the request itself did not complete
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Fallback when the server rejected a request without a usable message
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself failed: no connectivity, timeout, TLS failure.
    #[error("request failed")]
    Network(#[source] reqwest::Error),

    /// The server rejected the credential; the session is absent or expired.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The server processed the request and reported a logical failure
    /// (bad credentials, expired OTP, duplicate serial number, ...).
    #[error("{message}")]
    Rejected {
        status: StatusCode,
        message: String,
    },

    /// The server answered 2xx with a body this client could not decode.
    #[error("unexpected response from server")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Message suitable for direct display.
    ///
    /// Network-class failures collapse to one generic connectivity message;
    /// server-reported failures surface the server's message verbatim when it
    /// sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => CONNECTIVITY_MESSAGE.to_string(),
            ApiError::Unauthorized { message } | ApiError::Rejected { message, .. } => {
                if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message.clone()
                }
            }
            ApiError::Decode(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Classify a non-2xx response from its status and raw body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Rejected { status, message }
        }
    }
}

/// Error body shapes the API is known to produce
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull a human-readable message out of an error response body
fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.error).filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_prefers_message_field() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"OTP has expired","error":"ignored"}"#,
        );
        assert_eq!(err.user_message(), "OTP has expired");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_from_status_falls_back_to_error_field() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"error":"Serial number taken"}"#);
        assert_eq!(err.user_message(), "Serial number taken");
    }

    #[test]
    fn test_from_status_unauthorized_variant() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "{}");
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_unparseable_body_uses_generic_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>nope</html>");
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
