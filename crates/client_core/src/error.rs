use shared::{
    domain::{Screen, UnknownFocusArea},
    error::ErrorCode,
};
use thiserror::Error;

use crate::backend::Endpoint;

pub const GENERIC_AUTH_ERROR: &str = "Authentication failed";
pub const GUEST_LOGIN_ERROR: &str = "Guest login failed";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot {action} while on the {screen} screen")]
    InvalidTransition {
        screen: Screen,
        action: &'static str,
    },
    #[error(transparent)]
    UnknownFocusArea(#[from] UnknownFocusArea),
    #[error("{message}")]
    Auth { message: String },
    #[error("Guest login failed")]
    GuestLogin,
    #[error("invalid {field} value '{value}': expected a non-negative number")]
    InvalidBaseline { field: &'static str, value: String },
    #[error("no session established; sign in first")]
    MissingSession,
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: Endpoint,
        status: u16,
        detail: Option<String>,
    },
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponseShape { endpoint: Endpoint, reason: String },
}

impl ClientError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Status { status, .. } => Some(ErrorCode::from_status(*status)),
            _ => None,
        }
    }

    /// Whether the same call may succeed if repeated without changing input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
            || matches!(
                self.code(),
                Some(ErrorCode::RateLimited | ErrorCode::Internal)
            )
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}
