//! Error types for the client
//!
//! Storage faults are absorbed at the store boundary; request faults are
//! normalized into a single [`RequestError`] shape before reaching callers.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

// == Storage Error Enum ==
/// Failure of the durable storage medium on write.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing the record would exceed the medium's capacity ceiling
    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Payload could not be serialized into a record
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing file could not be written
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// == Error Kind ==
/// Where a request failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A response arrived with a status outside the success range
    Server,
    /// The request was dispatched but no response arrived
    Network,
    /// The request could not be built or sent for a local reason
    Local,
    /// A success response carried a non-null `error` field
    Application,
    /// A success response body did not match the expected shape
    Decode,
}

// == Request Error ==
/// Normalized failure returned by every request client call.
#[derive(Error, Debug, Clone)]
#[error("{message}{}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
pub struct RequestError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    details: Option<Value>,
}

impl RequestError {
    /// Label used when a failed response carries no `error` text.
    pub const GENERIC_API_ERROR: &'static str = "API Error";

    /// Message for requests that never received a response.
    pub const NETWORK_ERROR: &'static str = "Network Error: No response received";

    /// Builds a failure for a non-success HTTP status.
    pub fn server(status: u16, message: Option<String>, details: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Server,
            message: message.unwrap_or_else(|| Self::GENERIC_API_ERROR.to_string()),
            status: Some(status),
            details,
        }
    }

    /// Builds a failure for a request that got no response.
    pub fn network() -> Self {
        Self {
            kind: ErrorKind::Network,
            message: Self::NETWORK_ERROR.to_string(),
            status: None,
            details: None,
        }
    }

    /// Builds a failure for a local fault, embedding the cause text.
    pub fn local(cause: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Local,
            message: format!("Request Error: {}", cause),
            status: None,
            details: None,
        }
    }

    /// Builds a failure from an application error carried in a 2xx body.
    pub fn application(message: impl Into<String>, details: Value) -> Self {
        Self {
            kind: ErrorKind::Application,
            message: message.into(),
            status: None,
            details: Some(details),
        }
    }

    /// Builds a failure for a 2xx body that could not be decoded.
    pub fn decode(cause: impl fmt::Display, details: Option<Value>) -> Self {
        Self {
            kind: ErrorKind::Decode,
            message: format!("Invalid response body: {}", cause),
            status: None,
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable failure description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, present only for [`ErrorKind::Server`] failures.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Raw server payload, if any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Returns true if the failure is a transient transport fault.
    ///
    /// Only failures without a server-acknowledged outcome qualify: network
    /// faults and local faults. Server statuses, application errors and
    /// undecodable bodies are definite answers and are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Network | ErrorKind::Local)
    }
}

// == Result Type Alias ==
/// Convenience Result type for request client calls.
pub type Result<T> = std::result::Result<T, RequestError>;
