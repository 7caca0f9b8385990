//! Error types for gateway access, session handling and entity forms.

use shared::error::{ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Api(#[from] ApiException),

    #[error("gateway response for {0} carried no data")]
    MissingData(&'static str),

    #[error("gateway rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("invalid gateway url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            GatewayError::Api(api) => Some(api.code),
            GatewayError::Status { status: 401, .. } => Some(ErrorCode::Unauthorized),
            GatewayError::Status { status: 403, .. } => Some(ErrorCode::Forbidden),
            GatewayError::Status { status: 404, .. } => Some(ErrorCode::NotFound),
            _ => None,
        }
    }

    /// True when the gateway no longer accepts the session token.
    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(ErrorCode::Unauthorized)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login failed: {0}")]
    Login(#[source] GatewayError),

    #[error("gateway returned no login payload")]
    EmptyLogin,

    #[error("failed to persist session: {0}")]
    Persist(#[source] anyhow::Error),

    #[error("failed to serialize session user: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SessionError {
    /// Message shown in the login banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Login(_) | SessionError::EmptyLogin => {
                "Invalid username or password. Please try again."
            }
            SessionError::Persist(_) | SessionError::Encode(_) => {
                "Sign-in did not complete: the session could not be saved on this device."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl FormError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        FormError::Invalid {
            field,
            message: message.into(),
        }
    }
}
