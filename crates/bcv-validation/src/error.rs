//! # Validation Errors
//!
//! Every way a run can end in `Failure`. The `Display` text is the
//! user-facing failure reason.

use thiserror::Error;

use bcv_core::{CanonicalizationError, Network, NetworkError, ParseError, Timestamp};

/// Why a validation run failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The credential is anchored to a different chain than configured.
    #[error("credential is not anchored to {expected} (detected: {})", .found.map_or("unknown", |n| n.as_str()))]
    ChainMismatch {
        expected: Network,
        found: Option<Network>,
    },

    /// The document could not be re-serialized for hashing.
    #[error("failed to serialize document for hashing: {0}")]
    Serialization(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// No anchoring transaction id in the receipt or the configuration.
    #[error("no transaction id to look up")]
    MissingTransactionId,

    /// The anchoring transaction reports no input signer address.
    #[error("transaction {0} has no signing address")]
    MissingSignerAddress(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("local hash {local} does not match expected hash {expected}")]
    HashMismatch { local: String, expected: String },

    #[error("merkle root {merkle_root} does not match transaction hash {remote}")]
    MerkleRootMismatch { merkle_root: String, remote: String },

    #[error("merkle proof does not lead from the target hash to the merkle root")]
    MerkleProofInvalid,

    /// A 1.2+ credential reached a receipt check without a receipt.
    #[error("credential has no merkle receipt")]
    MissingReceipt,

    /// A 1.x credential has no embedded signature.
    #[error("credential has no embedded signature")]
    MissingSignature,

    #[error("unsupported signed attribute: {0}")]
    UnsupportedSignedAttribute(String),

    /// Signature recovery produced no address.
    #[error("could not recover a signing address from the credential signature")]
    SignatureNotRecovered,

    #[error("signature was made by {recovered}, expected issuer key {expected}")]
    SignatureMismatch { expected: String, recovered: String },

    #[error("invalid issuer profile: {0}")]
    IssuerProfile(ParseError),

    #[error("issuer key not found: {0}")]
    KeyNotFound(String),

    /// The signing key was not valid at the transaction time.
    #[error("issuer key {key} was not valid at {at}: {detail}")]
    KeyTemporallyInvalid {
        key: String,
        at: Timestamp,
        detail: String,
    },

    #[error("invalid revocation list: {0}")]
    RevocationList(ParseError),

    #[error("credential has been revoked: {reason}")]
    RevokedCredential { reason: String },

    #[error("issuer key expired at {expires_at}")]
    ExpiredKey { expires_at: Timestamp },

    #[error("Aborted")]
    Aborted,
}
