//! # bcv-crypto: Merkle Receipt Verification
//!
//! Blockcerts batch-issue credentials: each document hash is a leaf of a
//! SHA-256 Merkle tree whose root is written to a blockchain transaction.
//! A credential carries a *receipt*: its leaf (the target hash), the
//! anchored root, and the sibling path between them.
//!
//! - **Verification** (`merkle::verify`): pure fold of the sibling path,
//!   fail-closed on any malformed hex or untagged step.
//! - **Construction** (`merkle::MerkleTree`): builds the root and a receipt
//!   path per leaf, used to produce fixtures and to cross-check proofs.
//!
//! ## Crate Policy
//!
//! - Depends only on `bcv-core` internally.
//! - No I/O, no shared state: verification is trivially parallel.
//! - No mocking of hashing in tests: all tests use real SHA-256.

pub mod merkle;

pub use merkle::{verify, MerkleTree, ProofStep, Receipt};
