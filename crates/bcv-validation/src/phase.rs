//! # Validation Phases
//!
//! ```text
//! NotStarted → AssertingChain → ComputingLocalHash → FetchingRemoteHash
//!   → ComparingHashes ─┬─ (1.1) ──────────────────────────────→ CheckingIssuerSignature
//!                      └─ CheckingMerkleRoot → CheckingReceipt ─┬─ (1.2) → CheckingIssuerSignature
//!                                                               └─ (2.x) → CheckingAuthenticity
//!   → CheckingRevokedStatus → [CheckingExpiration (2.x)] → Success
//! ```
//!
//! `Failure` is reachable from every non-terminal phase. `AssertingChain`
//! runs only for mainnet configurations.

use serde::Serialize;

/// A pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    NotStarted,
    AssertingChain,
    ComputingLocalHash,
    FetchingRemoteHash,
    ComparingHashes,
    CheckingMerkleRoot,
    CheckingReceipt,
    CheckingIssuerSignature,
    CheckingAuthenticity,
    CheckingRevokedStatus,
    CheckingExpiration,
    /// Every check passed. Terminal.
    Success,
    /// A check failed or the run was aborted. Terminal.
    Failure,
}

impl Phase {
    /// Whether this is a terminal phase (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Whether the phase waits on an external call.
    pub fn is_network_bound(&self) -> bool {
        matches!(
            self,
            Self::FetchingRemoteHash
                | Self::CheckingIssuerSignature
                | Self::CheckingAuthenticity
                | Self::CheckingRevokedStatus
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::AssertingChain => "AssertingChain",
            Self::ComputingLocalHash => "ComputingLocalHash",
            Self::FetchingRemoteHash => "FetchingRemoteHash",
            Self::ComparingHashes => "ComparingHashes",
            Self::CheckingMerkleRoot => "CheckingMerkleRoot",
            Self::CheckingReceipt => "CheckingReceipt",
            Self::CheckingIssuerSignature => "CheckingIssuerSignature",
            Self::CheckingAuthenticity => "CheckingAuthenticity",
            Self::CheckingRevokedStatus => "CheckingRevokedStatus",
            Self::CheckingExpiration => "CheckingExpiration",
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded `(from, to)` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}
