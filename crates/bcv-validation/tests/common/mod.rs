//! Shared fixtures for pipeline tests: in-memory collaborators and
//! credential documents whose hashes, receipts and transactions agree.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

use bcv_core::{sha256_hex, BlockchainAddress, JcsCanonicalizer, Network, NetworkError, Timestamp};
use bcv_crypto::MerkleTree;
use bcv_validation::{
    JsonFetcher, Pipeline, PipelineConfig, Services, SignatureRecovery, TransactionData,
    TransactionDataSource,
};

pub const ISSUER_URL: &str = "https://issuer.example.org/profile.json";
pub const REVOCATION_URL: &str = "https://issuer.example.org/revocations.json";
pub const TX_ID: &str = "d75b7a5bdb3d5244b753e6b84e987267cfa4ffa7a532a2ed49ad3848be1d82f8";

pub const MAINNET_ISSUER_KEY: &str = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
pub const MAINNET_REVOCATION_KEY: &str = "1Q3P94rdNyftFBEKiN1fxmt2HSbtFSRs2G";
pub const MAINNET_RECIPIENT: &str = "1AAGG6jirbu9XwikFpkHokbbiYpjVtFe1G";

pub const TESTNET_ISSUER_KEY: &str = "msBCHdwaQ7N2ypBYupkp6uNxtr9Pg76imj";
pub const TESTNET_REVOCATION_KEY: &str = "mwsu1a2C5JzhrBXtNUfHF5Mb3RoiYqKAQL";
pub const TESTNET_RECIPIENT: &str = "mgdWjvq4RYAAP5goUNagTRMx7Xw534S5am";
pub const TESTNET_RECIPIENT_REVOCATION: &str = "n2Y6KsWYdQAwZzhYfXyVt2mKTdgAT2hRrf";

pub const V2_ID: &str = "urn:uuid:3bc1a96a-3501-46ed-8f75-49612bbac257";

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

pub fn addr(s: &str) -> BlockchainAddress {
    BlockchainAddress::new(s)
}

/// SHA-256 of the JCS form of `value`, as the pipeline computes it.
pub fn canonical_hash(value: &Value) -> String {
    let canonical = JcsCanonicalizer::canonicalize(&serde_json::to_vec(value).unwrap()).unwrap();
    sha256_hex(canonical.as_bytes())
}

/// A two-leaf batch containing `target`; returns `(merkle_root, proof)`.
pub fn batch_with(target: &str) -> (String, Value) {
    let other = sha256_hex(b"another credential in the same batch");
    let tree = MerkleTree::from_leaf_hashes(&[target.to_string(), other]).unwrap();
    let receipt = tree.receipt(0, TX_ID).unwrap();
    (receipt.merkle_root, serde_json::to_value(&receipt.proof).unwrap())
}

// ── Documents ────────────────────────────────────────────────────────

fn v1_body(recipient_key_field: &str, recipient_key: &str) -> Value {
    let mut body = json!({
        "certificate": {
            "name": "Certificate of Accomplishment",
            "description": "Awarded for completing the introductory course.",
            "language": "en-US",
            "id": "https://www.theissuer.edu/criteria/2016/05/certificate-type.json",
            "issuer": {
                "id": ISSUER_URL,
                "name": "The Issuer University",
                "email": "registrar@theissuer.edu",
                "url": "https://www.theissuer.edu"
            }
        },
        "recipient": {
            "type": "email",
            "givenName": "Ada",
            "familyName": "Lovelace",
            "identity": "ada@example.org",
            "hashed": false
        },
        "assertion": {
            "issuedOn": "2016-05-06",
            "uid": "56e2e3b0f8fd0d1a9b1d3b3e",
            "id": "https://www.theissuer.edu/certificates/56e2e3b0f8fd0d1a9b1d3b3e.json"
        },
        "verify": {
            "signer": "https://www.theissuer.edu/keys/signer.asc",
            "attribute-signed": "uid",
            "type": "ECDSA(secp256k1)"
        },
        "signature": "H0osFKEWOKZ9XtKsQxqD8SbgsDn5ON3mBqvDGR0dlpHeMv6mZTsCwZ8vKWzRmb3qDy9d0lLjU/Nt2f8aLcbAc8o="
    });
    body["recipient"][recipient_key_field] = json!(recipient_key);
    body
}

/// A 1.1 document anchored on mainnet.
pub fn v1_1_document() -> Vec<u8> {
    serde_json::to_vec_pretty(&v1_body("pubkey", MAINNET_RECIPIENT)).unwrap()
}

/// A 1.2 document on testnet; returns `(bytes, merkle_root)`.
pub fn v1_2_document() -> (Vec<u8>, String) {
    let mut body = v1_body("publicKey", TESTNET_RECIPIENT);
    body["recipient"]["revocationKey"] = json!(TESTNET_RECIPIENT_REVOCATION);
    let target = canonical_hash(&body);
    let (root, proof) = batch_with(&target);
    let doc = json!({
        "@context": "https://w3id.org/blockcerts/v1",
        "type": "BlockchainCertificate",
        "document": body,
        "receipt": {
            "type": "ChainpointSHA256v2",
            "targetHash": target,
            "merkleRoot": root,
            "proof": proof,
            "anchors": [{"sourceId": TX_ID, "type": "BTCOpReturn"}]
        }
    });
    (serde_json::to_vec_pretty(&doc).unwrap(), root)
}

fn v2_unsigned() -> Value {
    json!({
        "@context": ["https://w3id.org/openbadges/v2", "https://w3id.org/blockcerts/v2"],
        "type": "Assertion",
        "id": V2_ID,
        "badge": {
            "type": "BadgeClass",
            "id": "urn:uuid:82a4c9f2-3588-457b-80ea-da695571b8fc",
            "name": "Field Mapping Practicum",
            "description": "Awarded to participants who completed the practicum.",
            "issuer": {
                "id": ISSUER_URL,
                "type": "Profile",
                "name": "Example Field School",
                "url": "https://issuer.example.org",
                "email": "contact@issuer.example.org",
                "revocationList": REVOCATION_URL
            }
        },
        "recipient": {"type": "email", "identity": "alice@example.org", "hashed": false},
        "recipientProfile": {
            "type": ["RecipientProfile", "Extension"],
            "name": "Alice Liddell",
            "publicKey": format!("ecdsa-koblitz-pubkey:{TESTNET_RECIPIENT}")
        },
        "issuedOn": "2017-06-29T14:58:57+00:00",
        "verification": {
            "type": ["MerkleProofVerification2017", "Extension"],
            "publicKey": format!("ecdsa-koblitz-pubkey:{TESTNET_ISSUER_KEY}")
        }
    })
}

/// A 2.0 document anchored on testnet; returns `(bytes, merkle_root)`.
pub fn v2_document() -> (Vec<u8>, String) {
    v2_document_on("bitcoinTestnet")
}

pub fn v2_document_on(chain: &str) -> (Vec<u8>, String) {
    let mut doc = v2_unsigned();
    let target = canonical_hash(&doc);
    let (root, proof) = batch_with(&target);
    doc["signature"] = json!({
        "type": ["MerkleProof2017", "Extension"],
        "targetHash": target,
        "merkleRoot": root,
        "proof": proof,
        "anchors": [{"sourceId": TX_ID, "type": "BTCOpReturn", "chain": chain}]
    });
    (serde_json::to_vec_pretty(&doc).unwrap(), root)
}

// ── Issuer profiles ──────────────────────────────────────────────────

pub fn v1_profile(issuer_key: &str, revocation_key: Option<&str>) -> Value {
    let mut profile = json!({
        "id": ISSUER_URL,
        "name": "The Issuer University",
        "email": "registrar@theissuer.edu",
        "issuerKeys": [{"date": "2015-01-01", "key": issuer_key}]
    });
    if let Some(key) = revocation_key {
        profile["revocationKeys"] = json!([{"date": "2015-01-01", "key": key}]);
    }
    profile
}

/// A 2.0 profile with one key; `extra` fields (`revoked`, `expires`) are
/// merged into the key entry.
pub fn v2_profile(key: &str, extra: Value) -> Value {
    let mut entry = json!({
        "id": format!("ecdsa-koblitz-pubkey:{key}"),
        "created": "2017-01-01T00:00:00+00:00"
    });
    if let (Some(entry), Value::Object(extra)) = (entry.as_object_mut(), extra) {
        entry.extend(extra);
    }
    json!({
        "@context": ["https://w3id.org/openbadges/v2", "https://w3id.org/blockcerts/v2"],
        "type": "Profile",
        "id": ISSUER_URL,
        "name": "Example Field School",
        "revocationList": REVOCATION_URL,
        "publicKey": [entry]
    })
}

pub fn empty_revocation_list() -> Value {
    json!({"id": REVOCATION_URL, "revokedAssertions": []})
}

// ── Collaborators ────────────────────────────────────────────────────

/// Pauses a transaction lookup until released.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

pub struct MockTransactions {
    response: Result<TransactionData, NetworkError>,
    gate: Option<Gate>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockTransactions {
    pub fn answering(data: TransactionData) -> Self {
        Self {
            response: Ok(data),
            gate: None,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: NetworkError) -> Self {
        Self {
            response: Err(error),
            ..Self::answering(transaction(MAINNET_ISSUER_KEY, "00"))
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups that ran to the end rather than being dropped.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

impl TransactionDataSource for MockTransactions {
    async fn fetch_transaction(
        &self,
        _network: Network,
        transaction_id: &str,
    ) -> Result<TransactionData, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(transaction_id.to_string());
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// A transaction signed by `signer` carrying `op_return_hash`, mined
/// shortly after the 2.0 fixture's issue date.
pub fn transaction(signer: &str, op_return_hash: &str) -> TransactionData {
    TransactionData {
        op_return_hash: op_return_hash.to_string(),
        spent_addresses: Vec::new(),
        timestamp: ts("2017-06-29T15:00:00Z"),
        signer_address: Some(addr(signer)),
    }
}

#[derive(Default)]
pub struct MockFetcher {
    documents: HashMap<String, Value>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn with(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

impl JsonFetcher for MockFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, NetworkError> {
        self.fetched.lock().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| NetworkError::NonSuccessStatus {
                target: url.to_string(),
                status: 404,
            })
    }
}

/// Recovers a fixed address regardless of input.
pub struct FixedRecovery {
    address: Option<BlockchainAddress>,
    messages: Mutex<Vec<String>>,
}

impl FixedRecovery {
    pub fn new(address: Option<&str>) -> Self {
        Self {
            address: address.map(addr),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl SignatureRecovery for FixedRecovery {
    fn recover_address(
        &self,
        message: &str,
        _signature: &str,
        _network: Network,
    ) -> Option<BlockchainAddress> {
        self.messages.lock().push(message.to_string());
        self.address.clone()
    }
}

pub type TestPipeline =
    Pipeline<JcsCanonicalizer, Arc<FixedRecovery>, Arc<MockTransactions>, Arc<MockFetcher>>;

/// Build a pipeline over shared collaborators so tests can inspect them.
pub fn pipeline(
    document: &[u8],
    recovery: &Arc<FixedRecovery>,
    transactions: &Arc<MockTransactions>,
    fetcher: &Arc<MockFetcher>,
    config: PipelineConfig,
) -> TestPipeline {
    let credential = bcv_vc::parse(document).unwrap();
    Pipeline::new(
        credential,
        Services {
            canonicalizer: JcsCanonicalizer,
            recovery: Arc::clone(recovery),
            transactions: Arc::clone(transactions),
            fetcher: Arc::clone(fetcher),
        },
        config,
    )
}
