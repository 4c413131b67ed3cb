//! # Merkle Receipts
//!
//! Chainpoint-style receipts as embedded in Blockcerts 1.2+ documents.
//!
//! ## Algorithm
//!
//! Starting from the decoded target hash, each proof step names a sibling
//! hash and which side it sits on:
//!
//! - `left`:  `acc = SHA256(sibling || acc)`
//! - `right`: `acc = SHA256(acc || sibling)`
//!
//! After the last step the accumulator must equal the decoded Merkle root
//! byte-for-byte. An empty proof describes a single-leaf tree: the target
//! hash must equal the root.
//!
//! ## Fail-Closed Invariant
//!
//! Any odd-length or non-hex string, and any step that is neither `left`
//! nor `right`, makes the whole receipt invalid. Nothing is truncated or
//! skipped.
//!
//! ## Tree Construction
//!
//! [`MerkleTree`] follows the issuing side's layout: leaves are document
//! hashes (not re-hashed), pairs are concatenated left-to-right, and an odd
//! node at the end of a level is promoted unchanged to the next level.

use bcv_core::{bytes_to_hex, hex_to_bytes, sha256, DigestError};
use serde::Serialize;

/// One step of a Merkle inclusion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStep {
    /// The sibling hash sits to the left of the accumulator.
    Left(String),
    /// The sibling hash sits to the right of the accumulator.
    Right(String),
    /// A step carrying neither tag. Always invalidates the receipt.
    Untagged,
}

/// A Merkle receipt binding a document hash to an anchored root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Root of the batch tree (hex), as written to the chain.
    pub merkle_root: String,
    /// This document's leaf hash (hex).
    pub target_hash: String,
    /// Sibling path from the leaf to the root.
    pub proof: Vec<ProofStep>,
    /// Identifier of the anchoring transaction.
    pub transaction_id: String,
    /// Chain name declared by the anchor (`bitcoinMainnet`, ...), when present.
    pub chain: Option<String>,
}

/// Verify that folding the receipt's proof over its target hash reproduces
/// its Merkle root.
pub fn verify(receipt: &Receipt) -> bool {
    let Ok(mut acc) = hex_to_bytes(&receipt.target_hash) else {
        tracing::debug!(target_hash = %receipt.target_hash, "target hash is not hex");
        return false;
    };

    for (i, step) in receipt.proof.iter().enumerate() {
        let (sibling_hex, sibling_on_left) = match step {
            ProofStep::Left(h) => (h, true),
            ProofStep::Right(h) => (h, false),
            ProofStep::Untagged => {
                tracing::debug!(step = i, "proof step has no left/right tag");
                return false;
            }
        };
        let Ok(sibling) = hex_to_bytes(sibling_hex) else {
            tracing::debug!(step = i, "proof step hash is not hex");
            return false;
        };
        acc = if sibling_on_left {
            node_hash(&sibling, &acc)
        } else {
            node_hash(&acc, &sibling)
        };
    }

    match hex_to_bytes(&receipt.merkle_root) {
        Ok(root) => root == acc,
        Err(_) => {
            tracing::debug!(merkle_root = %receipt.merkle_root, "merkle root is not hex");
            false
        }
    }
}

/// `SHA256(left || right)`.
fn node_hash(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(left.len() + right.len());
    input.extend_from_slice(left);
    input.extend_from_slice(right);
    sha256(&input).to_vec()
}

/// A batch Merkle tree over document hashes.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaves; the last level holds the root.
    levels: Vec<Vec<Vec<u8>>>,
}

impl MerkleTree {
    /// Build a tree from hex leaf hashes.
    ///
    /// # Errors
    ///
    /// Returns a [`DigestError`] if any leaf is not valid hex.
    pub fn from_leaf_hashes(leaves: &[String]) -> Result<Self, DigestError> {
        let leaves = leaves
            .iter()
            .map(|h| hex_to_bytes(h))
            .collect::<Result<Vec<_>, _>>()?;

        let mut levels = vec![leaves];
        while let Some(level) = levels.last() {
            if level.len() <= 1 {
                break;
            }
            let next: Vec<Vec<u8>> = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => node_hash(left, right),
                    odd => odd.concat(),
                })
                .collect();
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Root hash as lowercase hex, or `None` for an empty tree.
    pub fn root_hex(&self) -> Option<String> {
        self.levels
            .last()
            .and_then(|level| level.first())
            .map(|root| bytes_to_hex(root))
    }

    /// Sibling path for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Option<Vec<ProofStep>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut steps = Vec::new();
        let mut pos = index;
        for level in &self.levels[..self.levels.len() - 1] {
            if pos % 2 == 1 {
                steps.push(ProofStep::Left(bytes_to_hex(&level[pos - 1])));
            } else if let Some(sibling) = level.get(pos + 1) {
                steps.push(ProofStep::Right(bytes_to_hex(sibling)));
            }
            pos /= 2;
        }
        Some(steps)
    }

    /// A complete receipt for the leaf at `index`, anchored by `transaction_id`.
    pub fn receipt(&self, index: usize, transaction_id: &str) -> Option<Receipt> {
        let proof = self.proof(index)?;
        Some(Receipt {
            merkle_root: self.root_hex()?,
            target_hash: bytes_to_hex(&self.levels[0][index]),
            proof,
            transaction_id: transaction_id.to_string(),
            chain: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcv_core::sha256_hex;

    fn leaf(i: usize) -> String {
        sha256_hex(format!("document-{i}").as_bytes())
    }

    fn receipt(target: &str, root: &str, proof: Vec<ProofStep>) -> Receipt {
        Receipt {
            merkle_root: root.to_string(),
            target_hash: target.to_string(),
            proof,
            transaction_id: "tx".to_string(),
            chain: None,
        }
    }

    #[test]
    fn test_empty_proof_requires_equal_hashes() {
        let h = leaf(0);
        assert!(verify(&receipt(&h, &h, vec![])));
        assert!(verify(&receipt(&h.to_uppercase(), &h, vec![])));
        assert!(!verify(&receipt(&h, &leaf(1), vec![])));
        assert!(!verify(&receipt("zz", "zz", vec![])));
    }

    #[test]
    fn test_two_leaf_proof_by_hand() {
        let a = leaf(0);
        let b = leaf(1);
        let mut concat = hex_to_bytes(&a).unwrap();
        concat.extend(hex_to_bytes(&b).unwrap());
        let root = sha256_hex(&concat);

        assert!(verify(&receipt(&a, &root, vec![ProofStep::Right(b.clone())])));
        assert!(verify(&receipt(&b, &root, vec![ProofStep::Left(a.clone())])));
        // Wrong side fails.
        assert!(!verify(&receipt(&a, &root, vec![ProofStep::Left(b)])));
    }

    #[test]
    fn test_untagged_step_invalidates() {
        let tree = MerkleTree::from_leaf_hashes(&[leaf(0), leaf(1)]).unwrap();
        let mut r = tree.receipt(0, "tx").unwrap();
        r.proof.push(ProofStep::Untagged);
        assert!(!verify(&r));
    }

    #[test]
    fn test_non_hex_and_odd_length_fail_closed() {
        let tree = MerkleTree::from_leaf_hashes(&[leaf(0), leaf(1), leaf(2)]).unwrap();
        let good = tree.receipt(0, "tx").unwrap();
        assert!(verify(&good));

        let mut odd_target = good.clone();
        odd_target.target_hash.push('a');
        assert!(!verify(&odd_target));

        let mut bad_step = good.clone();
        bad_step.proof[0] = ProofStep::Right("zz".repeat(32));
        assert!(!verify(&bad_step));

        let mut bad_root = good;
        bad_root.merkle_root = "not-hex".to_string();
        assert!(!verify(&bad_root));
    }

    #[test]
    fn test_surrounding_whitespace_fails_closed() {
        let tree = MerkleTree::from_leaf_hashes(&[leaf(0), leaf(1), leaf(2)]).unwrap();
        let good = tree.receipt(2, "tx").unwrap();

        let mut padded_target = good.clone();
        padded_target.target_hash = format!(" {}", good.target_hash);
        assert!(!verify(&padded_target));

        let mut padded_step = good.clone();
        if let Some(ProofStep::Left(h) | ProofStep::Right(h)) = padded_step.proof.first_mut() {
            h.push('\n');
        }
        assert!(!verify(&padded_step));

        let mut padded_root = good.clone();
        padded_root.merkle_root.push(' ');
        assert!(!verify(&padded_root));

        let h = leaf(0);
        assert!(!verify(&receipt(&format!("{h} "), &h, vec![])));
        assert!(MerkleTree::from_leaf_hashes(&[format!(" {h}")]).is_err());
    }

    #[test]
    fn test_mixed_case_hex_accepted() {
        let tree = MerkleTree::from_leaf_hashes(&[leaf(0), leaf(1)]).unwrap();
        let mut r = tree.receipt(1, "tx").unwrap();
        r.merkle_root = r.merkle_root.to_uppercase();
        r.target_hash = r.target_hash.to_uppercase();
        assert!(verify(&r));
    }

    #[test]
    fn test_odd_leaf_promoted() {
        let tree = MerkleTree::from_leaf_hashes(&[leaf(0), leaf(1), leaf(2)]).unwrap();
        // Third leaf is promoted at level 0, so its path has one step.
        assert_eq!(tree.proof(2).unwrap().len(), 1);
        assert_eq!(tree.proof(0).unwrap().len(), 2);
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = MerkleTree::from_leaf_hashes(&[leaf(7)]).unwrap();
        assert_eq!(tree.root_hex().unwrap(), leaf(7));
        let r = tree.receipt(0, "tx").unwrap();
        assert!(r.proof.is_empty());
        assert!(verify(&r));
    }

    #[test]
    fn test_empty_tree() {
        let tree = MerkleTree::from_leaf_hashes(&[]).unwrap();
        assert_eq!(tree.leaf_count(), 0);
        assert!(tree.root_hex().is_none());
        assert!(tree.proof(0).is_none());
    }

    #[test]
    fn test_all_indices_for_various_sizes() {
        for size in 1..=17 {
            let leaves: Vec<String> = (0..size).map(leaf).collect();
            let tree = MerkleTree::from_leaf_hashes(&leaves).unwrap();
            for i in 0..size {
                let r = tree.receipt(i, "tx").unwrap();
                assert!(verify(&r), "size {size} index {i}");
            }
        }
    }

    #[test]
    fn test_proof_step_serializes_tagged() {
        let json = serde_json::to_value(ProofStep::Left("ab".into())).unwrap();
        assert_eq!(json, serde_json::json!({"left": "ab"}));
    }
}
