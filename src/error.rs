//! Error types for the Workday client.
//!
//! Two families live here. [`ClientError`] is returned by construction and
//! configuration paths only. [`CallError`] never escapes an invocation: it is
//! captured into the [`CallRecord`](crate::invoker::CallRecord) of the call that
//! produced it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a client session.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure captured into a call record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallError {
    /// The request never reached the server, or the server never answered.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Non-success HTTP status without a SOAP Fault in the body.
    #[error("Unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    /// The service answered with a SOAP Fault.
    #[error("SOAP Fault [{code}]: {message}")]
    Fault { code: String, message: String },

    /// The response body is not a usable SOAP envelope.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Input rejected locally before anything was sent.
    #[error("Local validation error: {message}")]
    Local { message: String },
}

impl CallError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn local(message: impl Into<String>) -> Self {
        Self::Local {
            message: message.into(),
        }
    }

    pub fn fault(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fault {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Get the stable string code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT",
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::Fault { .. } => "SOAP_FAULT",
            Self::Protocol { .. } => "PROTOCOL",
            Self::Local { .. } => "LOCAL_VALIDATION",
        }
    }

    /// True when nothing came back from the remote side.
    pub fn is_unanswered(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Local { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_kind() {
        assert_eq!(CallError::transport("refused").kind(), "TRANSPORT");
        assert_eq!(CallError::HttpStatus { status: 502 }.kind(), "HTTP_STATUS");
        assert_eq!(CallError::fault("soapenv:Client", "bad").kind(), "SOAP_FAULT");
        assert_eq!(CallError::protocol("garbage").kind(), "PROTOCOL");
        assert_eq!(CallError::local("unreadable").kind(), "LOCAL_VALIDATION");
    }

    #[test]
    fn test_call_error_display() {
        let err = CallError::fault("SOAP-ENV:Client.validationError", "Invalid ID value");
        assert_eq!(
            err.to_string(),
            "SOAP Fault [SOAP-ENV:Client.validationError]: Invalid ID value"
        );
    }

    #[test]
    fn test_call_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(CallError::HttpStatus { status: 503 }).unwrap();
        assert_eq!(json["kind"], "http_status");
        assert_eq!(json["status"], 503);
    }

    #[test]
    fn test_unanswered() {
        assert!(CallError::transport("timeout").is_unanswered());
        assert!(!CallError::fault("c", "m").is_unanswered());
    }
}
