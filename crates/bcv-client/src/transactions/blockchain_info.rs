//! blockchain.info `rawtx` lookups.

use serde::Deserialize;

use bcv_core::{BlockchainAddress, Network, NetworkError, Timestamp};
use bcv_validation::{TransactionData, TransactionDataSource};

use super::{check_transaction_id, no_op_return, op_return_hash};
use crate::config::{ClientConfig, Provider};
use crate::error::ClientError;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct RawTx {
    time: i64,
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    out: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    prev_out: Option<RawPrevOut>,
}

#[derive(Debug, Deserialize)]
struct RawPrevOut {
    addr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    #[serde(default)]
    script: String,
    #[serde(default)]
    spent: bool,
    addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlockchainInfoSource {
    http: HttpClient,
    mainnet_url: String,
    testnet_url: String,
}

impl BlockchainInfoSource {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let config = ClientConfig {
            provider: Provider::BlockchainInfo,
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
        format!("{base}/rawtx/{transaction_id}?cors=true")
    }
}

fn to_transaction_data(tx: RawTx, target: &str) -> Result<TransactionData, NetworkError> {
    let op_return_hash =
        op_return_hash(tx.out.iter().map(|o| o.script.as_str())).ok_or_else(|| no_op_return(target))?;
    let timestamp = Timestamp::from_epoch_secs(tx.time).map_err(|e| NetworkError::MalformedBody {
        target: target.to_string(),
        reason: e.to_string(),
    })?;
    let spent_addresses = tx
        .out
        .iter()
        .filter(|o| o.spent)
        .filter_map(|o| o.addr.as_deref())
        .map(BlockchainAddress::new)
        .collect();
    let signer_address = tx
        .inputs
        .first()
        .and_then(|i| i.prev_out.as_ref())
        .and_then(|p| p.addr.as_deref())
        .map(BlockchainAddress::new);

    Ok(TransactionData {
        op_return_hash,
        spent_addresses,
        timestamp,
        signer_address,
    })
}

impl TransactionDataSource for BlockchainInfoSource {
    async fn fetch_transaction(
        &self,
        network: Network,
        transaction_id: &str,
    ) -> Result<TransactionData, NetworkError> {
        check_transaction_id(transaction_id)?;
        let target = self.url(network, transaction_id);
        let tx: RawTx = self.http.get(&target).await?;
        to_transaction_data(tx, &target)
    }
}
