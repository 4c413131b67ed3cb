//! # Transaction Data Sources
//!
//! Map public block explorer responses onto [`TransactionData`]. The
//! anchored hash is the payload of the output whose script is
//! `OP_RETURN PUSH32` (`6a20`), with that prefix stripped.

mod blockchain_info;
mod blockcypher;

pub use blockchain_info::BlockchainInfoSource;
pub use blockcypher::BlockCypherSource;

use bcv_core::{Network, NetworkError};
use bcv_validation::{TransactionData, TransactionDataSource};

use crate::config::{ClientConfig, Provider};
use crate::error::ClientError;

const OP_RETURN_PUSH32: &str = "6a20";

/// The hash carried by the first `OP_RETURN PUSH32` script, lowercased.
pub(crate) fn op_return_hash<'a>(scripts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    scripts.into_iter().find_map(|script| {
        let script = script.to_ascii_lowercase();
        let hash = script.strip_prefix(OP_RETURN_PUSH32)?;
        (!hash.is_empty()).then(|| hash.to_string())
    })
}

pub(crate) fn no_op_return(target: &str) -> NetworkError {
    NetworkError::MalformedBody {
        target: target.to_string(),
        reason: "no OP_RETURN output".to_string(),
    }
}

/// The configured provider's source.
#[derive(Debug, Clone)]
pub enum TransactionSource {
    BlockchainInfo(BlockchainInfoSource),
    BlockCypher(BlockCypherSource),
}

impl TransactionSource {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(match config.provider {
            Provider::BlockchainInfo => Self::BlockchainInfo(BlockchainInfoSource::new(config)?),
            Provider::BlockCypher => Self::BlockCypher(BlockCypherSource::new(config)?),
        })
    }
}

impl TransactionDataSource for TransactionSource {
    async fn fetch_transaction(
        &self,
        network: Network,
        transaction_id: &str,
    ) -> Result<TransactionData, NetworkError> {
        match self {
            Self::BlockchainInfo(source) => source.fetch_transaction(network, transaction_id).await,
            Self::BlockCypher(source) => source.fetch_transaction(network, transaction_id).await,
        }
    }
}

/// Reject identifiers that would change the request path.
pub(crate) fn check_transaction_id(transaction_id: &str) -> Result<(), NetworkError> {
    if transaction_id.is_empty() || !transaction_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(NetworkError::BadRequestTarget(format!(
            "invalid transaction id: {transaction_id:?}"
        )));
    }
    Ok(())
}
