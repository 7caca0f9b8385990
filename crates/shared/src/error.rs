use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

impl ErrorCode {
    /// Maps a GraphQL `extensions.code` value onto the client taxonomy.
    pub fn from_extension_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "UNAUTHENTICATED" | "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "FORBIDDEN" => ErrorCode::Forbidden,
            "NOT_FOUND" => ErrorCode::NotFound,
            "BAD_USER_INPUT" | "GRAPHQL_VALIDATION_FAILED" | "VALIDATION" => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
