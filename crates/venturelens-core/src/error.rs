use crate::types::{FlowKind, Tier};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VentureLensError {
    #[error("Missing credential: no API key configured for {provider}")]
    MissingCredential { provider: String },

    #[error("{provider} request failed: {message}")]
    Upstream { provider: String, message: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("{message}")]
    FlowFailed {
        flow: FlowKind,
        message: String,
        #[source]
        cause: Box<VentureLensError>,
    },

    #[error("The {tier} plan does not include {flow}")]
    NotEntitled { flow: FlowKind, tier: Tier },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VentureLensError {
    /// Follows `FlowFailed` wrappers down to the error that started it.
    pub fn root_cause(&self) -> &VentureLensError {
        match self {
            VentureLensError::FlowFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    pub fn missing_credential(provider: impl Into<String>) -> Self {
        VentureLensError::MissingCredential {
            provider: provider.into(),
        }
    }

    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        VentureLensError::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VentureLensError>;
