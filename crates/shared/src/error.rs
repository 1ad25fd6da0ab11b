use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure classes hosts can report to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A request named a record that does not exist.
    NotFound,
    /// The countdown could not be scheduled.
    Unavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Unavailable => "unavailable",
        })
    }
}

/// Error envelope shared by every crate; serializes as the payload of
/// [`crate::protocol::PortalEvent::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct PortalError {
    pub code: ErrorCode,
    pub message: String,
}

impl PortalError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
