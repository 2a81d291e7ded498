//! Error types for the form engine

use thiserror::Error;

/// Form engine error type
///
/// Nothing here is fatal. Store operations on unknown ids are no-ops; the
/// `*NotFound` variants are only produced by the strict application-layer
/// entry points.
#[derive(Error, Debug)]
pub enum FormsError {
    /// Field id absent from the schema
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// Option id absent from the field
    #[error("option not found: {0}")]
    OptionNotFound(String),

    /// Condition id absent from the field
    #[error("condition not found: {0}")]
    ConditionNotFound(String),

    /// Structural failure while hydrating a schema
    #[error("malformed schema: {0}")]
    MalformedSchema(String),

    /// Untrusted external input could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Payload could not be serialized
    #[error("encode error: {0}")]
    Encode(String),

    /// Share link base or location is not a usable URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Persistence collaborator failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Export collaborator failure
    #[error("export error: {0}")]
    Export(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FormsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for the form engine
pub type Result<T> = std::result::Result<T, FormsError>;
