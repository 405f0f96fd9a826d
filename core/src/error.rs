use serde_json::Value;
use thiserror::Error;

pub const MSG_INVALID_AST: &str = "Invalid or missing AST object";
pub const MSG_UNKNOWN_EVENT: &str = "Unknown event type";
pub const MSG_INVALID_PAYLOAD: &str = "Invalid request payload";
pub const MSG_MISSING_EXPERIMENT_STREAM: &str = "Expected stream from dataset-run";
pub const MSG_INVALID_JSON_BODY: &str = "Invalid JSON body";

/// Terminal failures of a single run request. Each one becomes exactly one
/// error response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    Execution(String),

    #[error("{0}")]
    Contract(String),
}

impl DispatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        DispatchError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        DispatchError::Validation {
            message: message.into(),
            details: Some(Value::String(details.into())),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            DispatchError::Validation { .. } => 400,
            DispatchError::Execution(_) | DispatchError::Contract(_) => 500,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            DispatchError::Validation { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

/// Scoring sink failures. Never leaves the score publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("scoring sink unreachable")]
    Transport(#[source] anyhow::Error),

    #[error("scoring sink timed out")]
    Timeout,

    #[error("unexpected status: {status}")]
    HttpStatus { status: u16, body_snippet: String },

    #[error("score encode error")]
    Encode(#[source] serde_json::Error),

    #[error("too many scores in flight ({limit})")]
    AtCapacity { limit: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("config read error: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error")]
    Parse(#[source] toml::de::Error),

    #[error("env var invalid: {key}")]
    EnvInvalid {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}
