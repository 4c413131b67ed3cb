//! # bcv-validation: Credential Validation Pipeline
//!
//! Proves that a parsed credential is unaltered, anchored by the
//! transaction it names, issued under a key the issuer controlled at the
//! time, and neither revoked nor expired.
//!
//! The order of checks depends on the credential's generation:
//!
//! | generation | local hash compared to | issuer check | revocation |
//! |---|---|---|---|
//! | 1.1 | OP_RETURN hash | recovered signature vs profile key | spent revocation addresses |
//! | 1.2 | receipt target, root vs OP_RETURN | recovered signature vs profile key | spent revocation addresses |
//! | 2.x | receipt target, root vs OP_RETURN | transaction signer in key schedule | hosted revocation list, key expiry |
//!
//! Canonicalization, signature recovery, transaction lookup and JSON
//! fetching are injected through the traits in [`collaborators`].
//!
//! ## Crate Policy
//!
//! - No I/O of its own: every external effect goes through a collaborator.
//! - At most one external call in flight per pipeline.
//! - No automatic retry. A caller retries by building a new [`Pipeline`].

pub mod collaborators;
pub mod config;
pub mod error;
pub mod phase;
pub mod pipeline;

pub use collaborators::{
    Canonicalizer, JsonFetcher, NoSignatureRecovery, Services, SignatureRecovery, TransactionData,
    TransactionDataSource,
};
pub use config::PipelineConfig;
pub use error::ValidationError;
pub use phase::{Phase, Transition};
pub use pipeline::{AbortHandle, Outcome, Pipeline, Report};
