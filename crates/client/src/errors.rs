use std::fmt;

use serde_json::Value;
use thiserror::Error;

use models::ModelError;
use service::errors::ServiceError;

/// What the data client was trying to do, as used in caller-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a primary API call was abandoned. Every variant triggers the fallback path.
#[derive(Debug, Error)]
pub enum PrimaryFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("empty response body (status {status})")]
    EmptyBody { status: u16 },
    #[error("HTML page instead of JSON (status {status})")]
    HtmlBody { status: u16 },
    #[error("malformed JSON (status {status}): {error}")]
    MalformedJson { status: u16, error: String },
    #[error("request rejected with status {status}")]
    Status { status: u16, body: Value },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl PrimaryFailure {
    /// Stable label for logs and metrics.
    pub fn cause(&self) -> &'static str {
        match self {
            PrimaryFailure::Transport(_) => "transport",
            PrimaryFailure::EmptyBody { .. } => "empty_body",
            PrimaryFailure::HtmlBody { .. } => "html_body",
            PrimaryFailure::MalformedJson { .. } => "malformed_json",
            PrimaryFailure::Status { status, .. } if *status < 500 => "client_status",
            PrimaryFailure::Status { .. } => "server_status",
            PrimaryFailure::UnexpectedShape(_) => "unexpected_shape",
        }
    }

    /// A reachable backend answered with a 4xx; falling back bypasses whatever it rejected.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PrimaryFailure::Status { status, .. } if (400..500).contains(status))
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The fallback path failed; this is terminal for the operation.
    #[error("failed to {action} {resource}: {source}")]
    Fallback {
        resource: String,
        action: Action,
        #[source]
        source: ServiceError,
    },
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("http client error: {0}")]
    Http(String),
}

impl ClientError {
    /// Short caller-facing summary, e.g. "failed to read providers".
    pub fn summary(&self) -> String {
        match self {
            ClientError::Fallback { resource, action, .. } => format!("failed to {action} {resource}"),
            other => other.to_string(),
        }
    }
}
