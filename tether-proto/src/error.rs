use serde::{Deserialize, Serialize};

/// Well-known error classification names used by the dispatcher itself.
/// Target methods are free to report any other name.
pub mod names {
    pub const METHOD_NOT_FOUND: &str = "MethodNotFound";
    pub const INVALID_ARGUMENT: &str = "InvalidArgument";
    pub const PANIC: &str = "Panic";
    pub const INTERNAL_ERROR: &str = "InternalError";
}

/// A failure reported by the remote side: a classification name plus a
/// human-readable message. Richer payloads do not survive the channel.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct RemoteError {
    pub name: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(names::METHOD_NOT_FOUND, format!("method not found: {method}"))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(names::INVALID_ARGUMENT, message)
    }
}
