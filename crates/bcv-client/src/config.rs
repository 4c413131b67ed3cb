//! Client configuration: request timeout and per-network provider base URLs.

use serde::{Deserialize, Serialize};

use bcv_core::Network;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const BLOCKCHAIN_INFO_MAINNET: &str = "https://blockchain.info";
pub const BLOCKCHAIN_INFO_TESTNET: &str = "https://testnet.blockchain.info";
pub const BLOCKCYPHER_MAINNET: &str = "https://api.blockcypher.com/v1/btc/main";
pub const BLOCKCYPHER_TESTNET: &str = "https://api.blockcypher.com/v1/btc/test3";

/// Which public API answers transaction lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    #[default]
    BlockchainInfo,
    #[serde(rename = "blockcypher")]
    BlockCypher,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockchainInfo => "blockchain-info",
            Self::BlockCypher => "blockcypher",
        }
    }

    fn default_base_url(&self, network: Network) -> &'static str {
        match (self, network) {
            (Self::BlockchainInfo, Network::Mainnet) => BLOCKCHAIN_INFO_MAINNET,
            (Self::BlockchainInfo, Network::Testnet) => BLOCKCHAIN_INFO_TESTNET,
            (Self::BlockCypher, Network::Mainnet) => BLOCKCYPHER_MAINNET,
            (Self::BlockCypher, Network::Testnet) => BLOCKCYPHER_TESTNET,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blockchain-info" => Ok(Self::BlockchainInfo),
            "blockcypher" => Ok(Self::BlockCypher),
            other => Err(format!("unknown transaction provider: {other}")),
        }
    }
}

/// HTTP client settings shared by the fetcher and the transaction sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ClientConfig {
    pub provider: Provider,
    /// Overrides the provider's public mainnet endpoint.
    pub mainnet_base_url: Option<String>,
    /// Overrides the provider's public testnet endpoint.
    pub testnet_base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            mainnet_base_url: None,
            testnet_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Point both networks at the given base URLs.
    pub fn with_base_urls(mut self, mainnet: impl Into<String>, testnet: impl Into<String>) -> Self {
        self.mainnet_base_url = Some(mainnet.into());
        self.testnet_base_url = Some(testnet.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Base URL for `network`, without a trailing slash.
    pub fn base_url(&self, network: Network) -> String {
        let configured = match network {
            Network::Mainnet => self.mainnet_base_url.as_deref(),
            Network::Testnet => self.testnet_base_url.as_deref(),
        };
        configured
            .unwrap_or_else(|| self.provider.default_base_url(network))
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_urls_follow_provider() {
        let config = ClientConfig::new(Provider::BlockCypher);
        assert_eq!(config.base_url(Network::Testnet), BLOCKCYPHER_TESTNET);
        assert_eq!(ClientConfig::default().base_url(Network::Mainnet), BLOCKCHAIN_INFO_MAINNET);
    }

    #[test]
    fn test_override_strips_trailing_slash() {
        let config = ClientConfig::default().with_base_urls("http://localhost:9/", "http://localhost:9/test/");
        assert_eq!(config.base_url(Network::Mainnet), "http://localhost:9");
        assert_eq!(config.base_url(Network::Testnet), "http://localhost:9/test");
    }

    #[test]
    fn test_provider_names() {
        for provider in [Provider::BlockchainInfo, Provider::BlockCypher] {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(provider));
            assert_eq!(
                serde_json::to_value(provider).unwrap(),
                serde_json::Value::from(provider.as_str())
            );
        }
        assert!("electrum".parse::<Provider>().is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"provider": "blockcypher"}"#).unwrap();
        assert_eq!(config.provider, Provider::BlockCypher);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
