//! # bcv-vc: Blockcerts Credential Model
//!
//! Parses the five Blockcerts document generations into one [`Credential`]
//! record, parses hosted issuer profiles and revocation lists, and resolves
//! which issuer key was authoritative at a given instant.
//!
//! ## Modules
//!
//! - [`credential`]: the immutable record types.
//! - [`parser`]: per-generation extractors behind [`parse`] and [`parse_as`].
//! - [`issuer`]: issuer profiles with key rotation schedules.
//! - [`revocation`]: hosted revocation lists.
//! - [`trust`]: key schedule lookups by instant and by address.
//!
//! ## Crate Policy
//!
//! - Depends on `bcv-core` and `bcv-crypto` only.
//! - No I/O: every input is a byte buffer or a `serde_json::Value`.
//! - Every missing or wrong-typed field is a named [`ParseError`], never a
//!   panic and never a partially populated record.
//!
//! [`ParseError`]: bcv_core::ParseError

pub mod credential;
pub mod issuer;
mod json;
pub mod parser;
pub mod revocation;
pub mod trust;

pub use bcv_crypto::{ProofStep, Receipt};
pub use credential::{Assertion, Credential, Metadata, Recipient, SignatureImage, VerificationInfo};
pub use issuer::{
    detect_issuer_generation, parse_issuer, parse_issuer_value, IntroductionMethod, Issuer, IssuerVersion,
    KeyRotationEntry,
};
pub use parser::{detect_generation, parse, parse_as};
pub use revocation::{RevocationList, RevokedAssertion};
pub use trust::{is_authorized_address, key_valid_at, window_contains};
