use client_core::{FormError, GatewayError, SessionError};
use shared::error::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// The token was rejected; the session ends.
    Auth,
    /// Signed in, but the role may not perform the action.
    Permission,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Login,
    LoadEmployees,
    SaveEmployee,
    DeleteEmployee,
    General,
}

/// A failure as the terminal front end reports it.
#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(category: UiErrorCategory, context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_gateway(context: UiErrorContext, err: &GatewayError) -> Self {
        let category = match err {
            GatewayError::Transport(_) => UiErrorCategory::Transport,
            GatewayError::Status { status, .. } if *status >= 500 => UiErrorCategory::Transport,
            _ => match err.code() {
                Some(ErrorCode::Unauthorized) => UiErrorCategory::Auth,
                Some(ErrorCode::Forbidden) => UiErrorCategory::Permission,
                Some(ErrorCode::Validation | ErrorCode::NotFound) => UiErrorCategory::Validation,
                _ if matches!(err, GatewayError::Rejected { .. }) => UiErrorCategory::Validation,
                _ => UiErrorCategory::Unknown,
            },
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_session(err: &SessionError) -> Self {
        match err {
            SessionError::Login(GatewayError::Transport(_)) => Self {
                category: UiErrorCategory::Transport,
                context: UiErrorContext::Login,
                message: "Gateway unreachable; check the URL or network and retry sign-in."
                    .to_string(),
            },
            SessionError::Login(_) | SessionError::EmptyLogin => Self {
                category: UiErrorCategory::Auth,
                context: UiErrorContext::Login,
                message: err.user_message().to_string(),
            },
            SessionError::Persist(_) | SessionError::Encode(_) => Self {
                category: UiErrorCategory::Unknown,
                context: UiErrorContext::Login,
                message: err.user_message().to_string(),
            },
        }
    }

    pub fn from_form(err: &FormError) -> Self {
        match err {
            FormError::Invalid { .. } => Self {
                category: UiErrorCategory::Validation,
                context: UiErrorContext::SaveEmployee,
                message: err.to_string(),
            },
            FormError::Gateway(inner) => Self::from_gateway(UiErrorContext::SaveEmployee, inner),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.context {
            UiErrorContext::Login => "Sign-in failed",
            UiErrorContext::LoadEmployees => "Error loading employees",
            UiErrorContext::SaveEmployee => "Error saving employee",
            UiErrorContext::DeleteEmployee => "Error deleting employee",
            UiErrorContext::General => "Error",
        };
        write!(f, "{prefix}: {}", self.message)?;
        if self.requires_reauth() && self.context != UiErrorContext::Login {
            write!(f, " (sign in again with `login`)")?;
        }
        Ok(())
    }
}

impl std::error::Error for UiError {}

#[cfg(test)]
#[path = "tests/ui_error_tests.rs"]
mod tests;
