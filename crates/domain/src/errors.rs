use thiserror::Error;

/// Failures raised while decoding or encoding DNS wire data.
///
/// Every variant leads to the same outcome at the server boundary: the packet
/// is dropped without a reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),
}

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("Zone store failure: {0}")]
    StoreFailure(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Zone in use: {0}")]
    ZoneInUse(String),

    #[error("Invalid zone file line {line}: {reason}")]
    InvalidZoneFile { line: usize, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// True for errors caused by the packet itself rather than by the server.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, DomainError::Wire(_))
    }
}
