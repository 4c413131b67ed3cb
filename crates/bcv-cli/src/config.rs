//! # CLI Configuration
//!
//! Optional YAML file; every field has a default and command-line flags
//! override what the file sets.
//!
//! ```yaml
//! network: testnet
//! provider: blockcypher
//! testnet_base_url: https://api.blockcypher.com/v1/btc/test3
//! timeout_secs: 10
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bcv_client::ClientConfig;
use bcv_core::Network;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub network: Network,
    #[serde(flatten)]
    pub client: ClientConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            client: ClientConfig::default(),
        }
    }
}

impl CliConfig {
    /// Read `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            network = %config.network,
            provider = %config.client.provider,
            "config loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcv_client::Provider;
    use std::io::Write;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_no_path_gives_defaults() {
        let config = CliConfig::load(None).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.network, Network::Mainnet);
    }

    #[test]
    fn test_yaml_fields_are_flat() {
        let file = write(
            "network: testnet\nprovider: blockcypher\ntestnet_base_url: http://localhost:3000\ntimeout_secs: 5\n",
        );
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.client.provider, Provider::BlockCypher);
        assert_eq!(config.client.base_url(Network::Testnet), "http://localhost:3000");
        assert_eq!(config.client.timeout_secs, 5);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let file = write("network: testnet\n");
        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let file = write("provider: electrum\n");
        let err = CliConfig::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/bcv.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bcv.yaml"));
    }
}
