//! # bcv-core: Foundational Types for the Blockcerts Verifier
//!
//! This crate is the leaf of the workspace. It defines the primitives every
//! other crate agrees on: which schema generation a document belongs to,
//! which chain it is anchored to, how instants are represented, how hex
//! digests are produced and compared, and the error kinds surfaced to
//! callers.
//!
//! ## Key Design Principles
//!
//! 1. **One ordered `Generation` enum.** The five Blockcerts schema
//!    generations are totally ordered, so "parse as generation >= X" is a
//!    plain comparison. Exhaustive `match` everywhere.
//!
//! 2. **UTC-only timestamps.** `Timestamp` normalizes every input (RFC 3339,
//!    naive datetimes, bare dates, epoch seconds) to UTC with seconds
//!    precision so temporal key checks compare like with like.
//!
//! 3. **Hex is lowercase.** All digests leave this crate lowercase, and
//!    `hex_eq` compares case-insensitively so provider casing never causes
//!    a spurious mismatch.
//!
//! 4. **Canonicalization is a seam.** RDF canonicalization is an external
//!    service; `Canonicalizer` is the contract the pipeline consumes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bcv-*` crates.
//! - No `unsafe` code.
//! - Errors propagate as `Result`; library code does not unwrap.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod generation;
pub mod identity;
pub mod temporal;

pub use canonical::{Canonicalizer, JcsCanonicalizer};
pub use digest::{bytes_to_hex, hex_eq, hex_to_bytes, sha256, sha256_hex};
pub use error::{CanonicalizationError, DigestError, NetworkError, ParseError};
pub use generation::{Generation, HashScheme};
pub use identity::{BlockchainAddress, Network};
pub use temporal::Timestamp;
