//! Graph error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::CheckoutId;

/// Errors raised by the transport or protocol layer of a graph call.
///
/// These are distinct from [`MutationError`]: a mutation can succeed at the
/// transport level and still carry structured per-field errors in its
/// payload.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The call never produced a usable response (network, timeout, 5xx).
    #[error("graph transport error: {0}")]
    Transport(String),

    /// The request referenced a checkout the graph does not know.
    #[error("unknown checkout: {0}")]
    UnknownCheckout(CheckoutId),

    /// The request was rejected before execution (malformed, incomplete).
    #[error("invalid graph request: {0}")]
    InvalidRequest(String),
}

/// Convenience type alias for graph call results.
pub type Result<T> = std::result::Result<T, GraphError>;

/// A structured error entry returned inside a mutation payload.
///
/// Mirrors the graph's `{field, message, code}` error shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationError {
    /// The input field the error refers to, if any.
    pub field: Option<String>,
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code, if the graph provides one.
    pub code: Option<String>,
}

impl MutationError {
    /// Creates an error entry with just a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
            code: None,
        }
    }

    /// Creates an error entry with field and code.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Returns true if the message indicates the referenced order or line
    /// is not yet visible to the graph's read path.
    ///
    /// These errors clear up on their own once replication catches up, so
    /// callers retry them; everything else is a rejection of the request.
    pub fn is_transient(&self) -> bool {
        let message = self.message.to_ascii_lowercase();
        message.contains("does not exist")
            || message.contains("not found")
            || message.contains("not available")
    }
}

impl std::fmt::Display for MutationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.field, &self.code) {
            (Some(field), Some(code)) => write!(f, "{} [{field}/{code}]", self.message),
            (Some(field), None) => write!(f, "{} [{field}]", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}
