//! Adapter error type and its mapping onto gRPC status codes.

use thiserror::Error;
use tonic::Status;

/// Result type alias using [`AdapterError`].
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while translating a gNMI request.
///
/// Each variant corresponds to the gRPC status code the client observes;
/// the payload is the human-readable message.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Path missing from the schema, or requested node absent from the
    /// device response.
    #[error("{0}")]
    NotFound(String),

    /// Unsupported encoding or client-declared model.
    #[error("{0}")]
    Unimplemented(String),

    /// Device session failure.
    #[error("{0}")]
    Unknown(String),

    /// Marshalling failure building a typed value or JSON response.
    #[error("{0}")]
    Internal(String),
}

impl AdapterError {
    /// The gRPC status code this error maps to.
    pub fn code(&self) -> tonic::Code {
        match self {
            AdapterError::NotFound(_) => tonic::Code::NotFound,
            AdapterError::Unimplemented(_) => tonic::Code::Unimplemented,
            AdapterError::Unknown(_) => tonic::Code::Unknown,
            AdapterError::Internal(_) => tonic::Code::Internal,
        }
    }
}

impl From<AdapterError> for Status {
    fn from(err: AdapterError) -> Status {
        Status::new(err.code(), err.to_string())
    }
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        AdapterError::Internal(format!("XML encoding failed: {err}"))
    }
}

impl From<quick_xml::Error> for AdapterError {
    fn from(err: quick_xml::Error) -> Self {
        AdapterError::Internal(format!("XML processing failed: {err}"))
    }
}
