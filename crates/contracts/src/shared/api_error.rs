use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by one of the remote collaborators.
///
/// `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("You are not signed in")]
    Unauthenticated,
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Build a `Rejected` error from a non-success response body.
    pub fn rejected(status: u16, body: &str, fields: ErrorFields, fallback: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.describe(fields, fallback))
            .unwrap_or_else(|_| fallback.to_string());
        ServiceError::Rejected { status, message }
    }
}

/// Fields of an error body that carry the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFields {
    /// Analysis service: `detail`, then `message`.
    DetailOrMessage,
    /// Chat service: `detail` only.
    DetailOnly,
}

/// Structured error body returned by the analysis and chat services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// First non-empty field allowed by `fields`, else `fallback`.
    pub fn describe(&self, fields: ErrorFields, fallback: &str) -> String {
        let message = match fields {
            ErrorFields::DetailOrMessage => self.message.as_deref(),
            ErrorFields::DetailOnly => None,
        };
        [self.detail.as_deref(), message]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}
