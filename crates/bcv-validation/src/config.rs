//! Per-run pipeline configuration.

use serde::{Deserialize, Serialize};

use bcv_core::{Network, Timestamp};

/// Settings for one validation run.
///
/// Built with [`PipelineConfig::new`] and the `with_*` methods:
///
/// ```
/// use bcv_core::Network;
/// use bcv_validation::PipelineConfig;
///
/// let config = PipelineConfig::new(Network::Testnet).with_transaction_id("d75b7a5b");
/// assert_eq!(config.transaction_id.as_deref(), Some("d75b7a5b"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Chain the credential must be anchored to.
    pub network: Network,
    /// Anchoring transaction id, overriding the receipt. Required for 1.1
    /// credentials, which carry none.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Clock used by the expiration check. `None` reads the system clock.
    #[serde(default)]
    pub now: Option<Timestamp>,
}

impl PipelineConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            transaction_id: None,
            now: None,
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_now(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.now.unwrap_or_else(Timestamp::now)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(Network::Mainnet)
    }
}
