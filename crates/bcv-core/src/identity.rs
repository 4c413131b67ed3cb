//! # Chain and Address Identity
//!
//! `Network` names the chain a credential is anchored to; `BlockchainAddress`
//! is a key or address with any scheme-scoping prefix removed.
//!
//! Blockcerts v2 issuers publish keys as `ecdsa-koblitz-pubkey:1Abc...`
//! while transaction providers report bare `1Abc...`. Comparison happens
//! on the bare form. Base58 addresses are case-sensitive, so comparison is
//! exact; only hex digests are case-normalized (see `digest`).

use serde::{Deserialize, Serialize};

/// The blockchain network a document is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin main network.
    Mainnet,
    /// Bitcoin test network.
    Testnet,
}

impl Network {
    /// Returns the lowercase network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Infer the network from an address prefix.
    ///
    /// `1...` is a mainnet pay-to-pubkey-hash address; `m...` and `n...` are
    /// testnet. Anything else is undeterminable and yields `None`.
    pub fn infer_from_address(address: &BlockchainAddress) -> Option<Self> {
        match address.as_str().chars().next()? {
            '1' => Some(Self::Mainnet),
            'm' | 'n' => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Map a Blockcerts v2 anchor `chain` value to a network.
    ///
    /// `mockchain` anchors are never valid on a real network and map to
    /// `None`, as do unknown values.
    pub fn from_chain_name(chain: &str) -> Option<Self> {
        match chain {
            "bitcoinMainnet" => Some(Self::Mainnet),
            "bitcoinTestnet" | "bitcoinRegtest" => Some(Self::Testnet),
            _ => None,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "bitcoinmainnet" => Ok(Self::Mainnet),
            "testnet" | "bitcointestnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// A blockchain address or public key with any `scheme:` prefix removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockchainAddress(String);

impl BlockchainAddress {
    /// Build an address, stripping a scheme prefix such as
    /// `ecdsa-koblitz-pubkey:` and surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        let bare = match raw.rsplit_once(':') {
            Some((_, rest)) => rest,
            None => raw,
        };
        Self(bare.to_string())
    }

    /// The bare address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address is empty after prefix stripping.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare with a raw string, ignoring any scheme prefix on either side.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == Self::new(raw).0
    }
}

impl std::fmt::Display for BlockchainAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_stripped() {
        let a = BlockchainAddress::new("ecdsa-koblitz-pubkey:1Q3P94rdNyftFBEKiN1fxmt2HSbtFSRs2G");
        assert_eq!(a.as_str(), "1Q3P94rdNyftFBEKiN1fxmt2HSbtFSRs2G");
        assert!(a.matches("1Q3P94rdNyftFBEKiN1fxmt2HSbtFSRs2G"));
        assert!(a.matches("ecdsa-koblitz-pubkey:1Q3P94rdNyftFBEKiN1fxmt2HSbtFSRs2G"));
    }

    #[test]
    fn test_address_comparison_is_case_sensitive() {
        let a = BlockchainAddress::new("1AbC");
        assert!(!a.matches("1abc"));
    }

    #[test]
    fn test_infer_network() {
        let main = BlockchainAddress::new("1Q3P94rdNyftFBEKiN1fxmt2HSbtFSRs2G");
        let test_m = BlockchainAddress::new("mgdWjvq4RYAAP5goUNagTRMx7Xw534S5am");
        let test_n = BlockchainAddress::new("n2h5AGW1xtnSFeXNr6SCSwXty6kP42Pri4");
        let unknown = BlockchainAddress::new("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy");
        assert_eq!(Network::infer_from_address(&main), Some(Network::Mainnet));
        assert_eq!(Network::infer_from_address(&test_m), Some(Network::Testnet));
        assert_eq!(Network::infer_from_address(&test_n), Some(Network::Testnet));
        assert_eq!(Network::infer_from_address(&unknown), None);
        assert_eq!(Network::infer_from_address(&BlockchainAddress::new("")), None);
    }

    #[test]
    fn test_chain_names() {
        assert_eq!(Network::from_chain_name("bitcoinMainnet"), Some(Network::Mainnet));
        assert_eq!(Network::from_chain_name("bitcoinTestnet"), Some(Network::Testnet));
        assert_eq!(Network::from_chain_name("mockchain"), None);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert!("ropsten".parse::<Network>().is_err());
    }
}
