//! # bcv-client: HTTP Collaborators
//!
//! Production implementations of the network-bound validation
//! collaborators:
//!
//! - [`HttpJsonFetcher`] fetches issuer profiles and revocation lists.
//! - [`BlockchainInfoSource`] and [`BlockCypherSource`] look up anchoring
//!   transactions; [`TransactionSource`] selects one from [`ClientConfig`].
//!
//! Each wraps a `reqwest::Client` with the configured timeout. All are
//! `Send + Sync` and cheap to clone. Retries are not built in; a failed
//! lookup surfaces as a [`bcv_core::NetworkError`] and fails the run.

pub mod config;
pub mod error;
pub mod fetcher;
mod http;
pub mod transactions;

pub use config::{ClientConfig, Provider};
pub use error::ClientError;
pub use fetcher::HttpJsonFetcher;
pub use transactions::{BlockCypherSource, BlockchainInfoSource, TransactionSource};
