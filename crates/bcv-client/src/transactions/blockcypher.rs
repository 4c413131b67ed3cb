//! BlockCypher `txs` lookups.

use serde::Deserialize;

use bcv_core::{BlockchainAddress, Network, NetworkError, Timestamp};
use bcv_validation::{TransactionData, TransactionDataSource};

use super::{check_transaction_id, no_op_return, op_return_hash};
use crate::config::{ClientConfig, Provider};
use crate::error::ClientError;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct Tx {
    confirmed: Option<String>,
    received: Option<String>,
    #[serde(default)]
    inputs: Vec<Input>,
    #[serde(default)]
    outputs: Vec<Output>,
}

#[derive(Debug, Deserialize)]
struct Input {
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Output {
    #[serde(default)]
    script: String,
    spent_by: Option<String>,
    #[serde(default)]
    addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct BlockCypherSource {
    http: HttpClient,
    mainnet_url: String,
    testnet_url: String,
}

impl BlockCypherSource {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let config = ClientConfig {
            provider: Provider::BlockCypher,
            ..config.clone()
        };
        Ok(Self {
            http: HttpClient::new(&config)?,
            mainnet_url: config.base_url(Network::Mainnet),
            testnet_url: config.base_url(Network::Testnet),
        })
    }

    fn url(&self, network: Network, transaction_id: &str) -> String {
        let base = match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Testnet => &self.testnet_url,
        };
        format!("{base}/txs/{transaction_id}?limit=500")
    }
}

fn to_transaction_data(tx: Tx, target: &str) -> Result<TransactionData, NetworkError> {
    let op_return_hash = op_return_hash(tx.outputs.iter().map(|o| o.script.as_str()))
        .ok_or_else(|| no_op_return(target))?;

    // Unconfirmed transactions carry only the first-seen time.
    let time = tx
        .confirmed
        .as_deref()
        .or(tx.received.as_deref())
        .ok_or_else(|| NetworkError::MalformedBody {
            target: target.to_string(),
            reason: "no confirmed or received time".to_string(),
        })?;
    let timestamp = Timestamp::parse(time).map_err(|e| NetworkError::MalformedBody {
        target: target.to_string(),
        reason: e.to_string(),
    })?;

    let spent_addresses = tx
        .outputs
        .iter()
        .filter(|o| o.spent_by.is_some())
        .filter_map(|o| o.addresses.as_ref()?.first())
        .map(|a| BlockchainAddress::new(a))
        .collect();
    let signer_address = tx
        .inputs
        .first()
        .and_then(|i| i.addresses.first())
        .map(|a| BlockchainAddress::new(a));

    Ok(TransactionData {
        op_return_hash,
        spent_addresses,
        timestamp,
        signer_address,
    })
}

impl TransactionDataSource for BlockCypherSource {
    async fn fetch_transaction(
        &self,
        network: Network,
        transaction_id: &str,
    ) -> Result<TransactionData, NetworkError> {
        check_transaction_id(transaction_id)?;
        let target = self.url(network, transaction_id);
        let tx: Tx = self.http.get(&target).await?;
        to_transaction_data(tx, &target)
    }
}
