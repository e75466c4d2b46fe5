use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    RateLimited,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            400 | 422 => ErrorCode::Validation,
            429 => ErrorCode::RateLimited,
            500..=599 => ErrorCode::Internal,
            _ => ErrorCode::Unknown,
        }
    }
}

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is usually a plain string, but request validation failures carry
/// a list of `{ "loc": [...], "msg": "..." }` objects instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(message.into())),
        }
    }

    /// Parses a raw response body; anything that is not a JSON object yields
    /// an empty detail.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Array(entries) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_string_detail_is_surfaced() {
        let body = br#"{"detail":"bad credentials"}"#;
        assert_eq!(
            ErrorDetail::from_body(body).message().as_deref(),
            Some("bad credentials")
        );
    }

    #[test]
    fn validation_list_detail_joins_messages() {
        let body = br#"{"detail":[{"loc":["body","email"],"msg":"field required"},{"msg":"too short"}]}"#;
        assert_eq!(
            ErrorDetail::from_body(body).message().as_deref(),
            Some("field required; too short")
        );
    }

    #[test]
    fn missing_or_unparsable_detail_yields_none() {
        assert_eq!(ErrorDetail::from_body(b"{}").message(), None);
        assert_eq!(ErrorDetail::from_body(b"<html>502</html>").message(), None);
        assert_eq!(ErrorDetail::from_body(br#"{"detail":""}"#).message(), None);
    }

    #[test]
    fn status_codes_map_to_error_codes() {
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_status(422), ErrorCode::Validation);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::Internal);
        assert_eq!(ErrorCode::from_status(418), ErrorCode::Unknown);
    }
}
