//! # Errors
//!
//! Errors shared across the workspace. All use `thiserror`.
//!
//! ## Design
//!
//! - Parse errors name the offending field path (`badge.issuer.id`), so a
//!   failed auto-detect points at the most plausible schema violation.
//! - Network errors distinguish a bad target, a non-2xx status, an empty
//!   body, and a body that does not have the expected shape.

use thiserror::Error;

/// Failure to turn raw document bytes into a model record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A field required by the claimed generation is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong type or an unusable value.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// The document does not match any supported generation.
    #[error("unknown generation: {0}")]
    UnknownGeneration(String),

    /// The bytes are not a JSON document at all.
    #[error("document is not valid JSON: {0}")]
    NotValidJson(String),
}

impl ParseError {
    /// Convenience constructor for [`ParseError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Convenience constructor for [`ParseError::InvalidField`].
    pub fn invalid(field: impl Into<String>) -> Self {
        Self::InvalidField(field.into())
    }
}

/// Error raised by an external fetch (issuer profile, revocation list,
/// blockchain transaction).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The URL or transaction identifier could not be turned into a request.
    #[error("bad request target: {0}")]
    BadRequestTarget(String),

    /// The remote answered with a non-2xx status.
    #[error("{target} returned HTTP {status}")]
    NonSuccessStatus {
        /// The URL that was requested.
        target: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The remote answered with an empty body, or the transport failed
    /// before a body arrived.
    #[error("no response body from {0}")]
    MissingBody(String),

    /// The body arrived but lacks an expected field or has the wrong shape.
    #[error("malformed response from {target}: {reason}")]
    MalformedBody {
        /// The URL that was requested.
        target: String,
        /// What was wrong with the body.
        reason: String,
    },
}

/// Error during document canonicalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// The input bytes are not a JSON document.
    #[error("input is not a JSON document: {0}")]
    InvalidInput(String),

    /// The normalization service rejected the document.
    #[error("normalization failed: {0}")]
    Failed(String),
}

impl From<serde_json::Error> for CanonicalizationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Failed(e.to_string())
    }
}

/// Error decoding a hex digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// Odd number of hex characters.
    #[error("hex string has odd length {0}")]
    OddLength(usize),

    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex character at offset {0}")]
    InvalidCharacter(usize),
}
