//! # External Collaborators
//!
//! The pipeline consumes four services it does not implement. Each is a
//! trait so a run can be handed production clients, offline fixtures, or
//! test doubles. All must be safe for concurrent use by independent
//! pipelines.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use bcv_core::{BlockchainAddress, Network, NetworkError, Timestamp};

pub use bcv_core::Canonicalizer;

/// Recovers the address that produced a message signature.
pub trait SignatureRecovery: Send + Sync {
    /// Derive the signing address for `message` on `network`, or `None`
    /// when the signature does not decode.
    fn recover_address(
        &self,
        message: &str,
        signature: &str,
        network: Network,
    ) -> Option<BlockchainAddress>;
}

/// What the pipeline needs from an anchoring transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    /// Hash embedded in the zero-value OP_RETURN output, prefix stripped.
    pub op_return_hash: String,
    /// Addresses whose outputs of this transaction were later spent.
    pub spent_addresses: Vec<BlockchainAddress>,
    /// Block or first-seen time.
    pub timestamp: Timestamp,
    /// Address that signed the transaction's first input.
    pub signer_address: Option<BlockchainAddress>,
}

/// Looks up anchoring transactions.
pub trait TransactionDataSource: Send + Sync {
    fn fetch_transaction(
        &self,
        network: Network,
        transaction_id: &str,
    ) -> impl Future<Output = Result<TransactionData, NetworkError>> + Send;
}

/// Fetches JSON documents (issuer profiles, revocation lists).
pub trait JsonFetcher: Send + Sync {
    fn fetch_json(&self, url: &str) -> impl Future<Output = Result<Value, NetworkError>> + Send;
}

impl<T: SignatureRecovery> SignatureRecovery for Arc<T> {
    fn recover_address(
        &self,
        message: &str,
        signature: &str,
        network: Network,
    ) -> Option<BlockchainAddress> {
        (**self).recover_address(message, signature, network)
    }
}

impl<T: TransactionDataSource> TransactionDataSource for Arc<T> {
    fn fetch_transaction(
        &self,
        network: Network,
        transaction_id: &str,
    ) -> impl Future<Output = Result<TransactionData, NetworkError>> + Send {
        (**self).fetch_transaction(network, transaction_id)
    }
}

impl<T: JsonFetcher> JsonFetcher for Arc<T> {
    fn fetch_json(&self, url: &str) -> impl Future<Output = Result<Value, NetworkError>> + Send {
        (**self).fetch_json(url)
    }
}

/// Signature recovery for deployments without an elliptic-curve backend.
///
/// Always answers `None`, so 1.x credentials fail at
/// `CheckingIssuerSignature` with a recovery error instead of passing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignatureRecovery;

impl SignatureRecovery for NoSignatureRecovery {
    fn recover_address(&self, _: &str, _: &str, _: Network) -> Option<BlockchainAddress> {
        None
    }
}

/// The collaborators handed to one pipeline.
#[derive(Debug, Clone)]
pub struct Services<C, R, T, F> {
    pub canonicalizer: C,
    pub recovery: R,
    pub transactions: T,
    pub fetcher: F,
}
