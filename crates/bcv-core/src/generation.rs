//! # Schema Generations
//!
//! The five Blockcerts document schemas, oldest first. The ordering is
//! semantic: auto-detection walks generations in ascending order, and
//! issuer features such as hosted revocation lists are gated on
//! `generation >= Generation::V2Alpha`.

use serde::{Deserialize, Serialize};

/// A Blockcerts schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// Schema 1.1: flat document, embedded signature, no receipt.
    #[serde(rename = "1.1")]
    V1_1,
    /// Schema 1.2: signed `document` wrapped with a Chainpoint receipt.
    #[serde(rename = "1.2")]
    V1_2,
    /// Schema 2.0-alpha: Open Badges assertion, Merkle proof in `signature`.
    #[serde(rename = "2.0-alpha")]
    V2Alpha,
    /// Schema 2.0: as 2.0-alpha with `recipientProfile` and chain-tagged anchors.
    #[serde(rename = "2.0")]
    V2,
    /// Schema 2.1: as 2.0 with display HTML and JSON-LD context 2.1.
    #[serde(rename = "2.1")]
    V2_1,
}

/// How the local document hash is produced and checked for a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashScheme {
    /// SHA-256 of the raw bytes, compared directly to the OP_RETURN value;
    /// issuer signature recovered from the embedded signature string.
    Legacy,
    /// Canonicalized embedded `document`, compared to a receipt target;
    /// issuer signature recovered from the embedded signature string.
    ReceiptSigned,
    /// Canonicalized document minus `signature`, compared to a receipt
    /// target; issuer authenticated by the transaction's signing key.
    AnchoredProfile,
}

impl Generation {
    /// Every generation, oldest first.
    pub const ALL: [Generation; 5] = [
        Generation::V1_1,
        Generation::V1_2,
        Generation::V2Alpha,
        Generation::V2,
        Generation::V2_1,
    ];

    /// Returns the schema version string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V2Alpha => "2.0-alpha",
            Self::V2 => "2.0",
            Self::V2_1 => "2.1",
        }
    }

    /// The hashing and trust model used to validate this generation.
    pub fn hash_scheme(&self) -> HashScheme {
        match self {
            Self::V1_1 => HashScheme::Legacy,
            Self::V1_2 => HashScheme::ReceiptSigned,
            Self::V2Alpha | Self::V2 | Self::V2_1 => HashScheme::AnchoredProfile,
        }
    }

    /// Whether a document of this generation carries a Merkle receipt.
    pub fn has_receipt(&self) -> bool {
        *self >= Self::V1_2
    }

    /// Whether a document of this generation carries an embedded
    /// signature string.
    pub fn has_embedded_signature(&self) -> bool {
        *self < Self::V2Alpha
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Generation {
    type Err = crate::error::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::ParseError::UnknownGeneration(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_ordered() {
        let mut sorted = Generation::ALL;
        sorted.sort();
        assert_eq!(sorted, Generation::ALL);
        assert!(Generation::V1_1 < Generation::V2_1);
    }

    #[test]
    fn test_hash_scheme_per_generation() {
        assert_eq!(Generation::V1_1.hash_scheme(), HashScheme::Legacy);
        assert_eq!(Generation::V1_2.hash_scheme(), HashScheme::ReceiptSigned);
        for g in [Generation::V2Alpha, Generation::V2, Generation::V2_1] {
            assert_eq!(g.hash_scheme(), HashScheme::AnchoredProfile);
        }
    }

    #[test]
    fn test_receipt_and_signature_presence() {
        assert!(!Generation::V1_1.has_receipt());
        assert!(Generation::V1_1.has_embedded_signature());
        assert!(Generation::V1_2.has_receipt());
        assert!(Generation::V1_2.has_embedded_signature());
        assert!(Generation::V2.has_receipt());
        assert!(!Generation::V2.has_embedded_signature());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("2.0-alpha".parse::<Generation>().unwrap(), Generation::V2Alpha);
        assert_eq!("1.1".parse::<Generation>().unwrap(), Generation::V1_1);
        assert!("3.0".parse::<Generation>().is_err());
    }

    #[test]
    fn test_serde_uses_version_strings() {
        let json = serde_json::to_string(&Generation::V2Alpha).unwrap();
        assert_eq!(json, "\"2.0-alpha\"");
    }
}
