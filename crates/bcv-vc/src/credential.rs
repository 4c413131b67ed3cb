//! # Credential Model
//!
//! One record type for all five schema generations. Fields a generation does
//! not carry are `None` or empty; which fields are populated is determined by
//! [`Credential::generation`].
//!
//! A `Credential` is produced only by the parser and never mutated after
//! construction. The pipeline shares it behind an `Arc`.

use serde::Serialize;
use serde_json::{Map, Value};

use bcv_core::{BlockchainAddress, Generation, Timestamp};
use bcv_crypto::Receipt;

use crate::issuer::Issuer;

/// A parsed Blockcerts credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// The schema generation the document was parsed as.
    pub generation: Generation,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    /// Decoded certificate image (usually the issuer logo). Empty when the
    /// document references a remote image or has none.
    #[serde(skip)]
    pub image: Vec<u8>,
    pub language: String,
    /// Document identifier: a URI for 1.x, a `urn:uuid:` for 2.x.
    pub id: String,
    /// Opaque identifier distinct from `id`, when the generation has one.
    pub universal_identifier: Option<String>,
    /// Issuer as embedded in the credential. Key schedules are empty here;
    /// they come from the hosted issuer profile.
    pub issuer: Issuer,
    pub recipient: Recipient,
    pub assertion: Assertion,
    pub verification: VerificationInfo,
    /// Embedded issuer signature (1.x only).
    pub signature: Option<String>,
    /// Merkle receipt (1.2 and later).
    pub receipt: Option<Receipt>,
    /// Link at which the credential can be viewed, when the document has one.
    pub share_url: Option<String>,
    /// The exact input bytes, retained for hashing.
    #[serde(skip)]
    pub raw: Vec<u8>,
}

impl Credential {
    /// Free-form grouped metadata declared by the issuer.
    pub fn metadata(&self) -> &Metadata {
        &self.assertion.metadata
    }

    /// Inline HTML rendering, when the generation carries one.
    pub fn html_display(&self) -> Option<&str> {
        self.assertion.html_display.as_deref()
    }

    /// Transaction id of the anchoring transaction, when a receipt is present.
    pub fn transaction_id(&self) -> Option<&str> {
        self.receipt
            .as_ref()
            .map(|r| r.transaction_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// The credential holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Display name as written in the document (joined from the given and
    /// family names for 1.x).
    pub name: String,
    /// Only 1.x documents carry separate name parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Identity claim (usually an email address or its salted hash).
    pub identity: String,
    /// Identity type, e.g. `email`.
    pub identity_type: String,
    pub is_hashed: bool,
    /// Recipient's blockchain address.
    pub public_address: BlockchainAddress,
    /// Address whose spending revokes the credential (1.2 only).
    pub revocation_address: Option<BlockchainAddress>,
}

/// Display name for 1.x recipients, which store given and family names apart.
pub(crate) fn join_name(given: &str, family: &str) -> String {
    match (given.is_empty(), family.is_empty()) {
        (false, false) => format!("{given} {family}"),
        (false, true) => given.to_string(),
        (true, _) => family.to_string(),
    }
}

/// The issuing event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    pub issued_on: Timestamp,
    pub signature_images: Vec<SignatureImage>,
    pub evidence: String,
    /// Unique identifier of this assertion.
    pub uid: String,
    /// Canonical URI of the assertion.
    pub id: String,
    pub metadata: Metadata,
    pub html_display: Option<String>,
}

/// A signature image rendered on the credential, with the signer's title.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureImage {
    #[serde(skip)]
    pub image: Vec<u8>,
    pub title: Option<String>,
    pub name: Option<String>,
}

/// How the credential is meant to be verified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationInfo {
    /// URL of the signer's key material (1.x), absent for 2.x.
    pub signer: Option<String>,
    /// Name of the assertion attribute that was signed.
    pub signed_attribute: String,
    /// Verification method type, e.g. `ECDSA(secp256k1)` or
    /// `MerkleProofVerification2017`.
    pub method: String,
    /// Issuer key declared in the verification block (2.x).
    pub public_key: Option<BlockchainAddress>,
}

/// Issuer-defined metadata, grouped by top-level key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(pub Map<String, Value>);

impl Metadata {
    /// Decode the `metadataJson` string form. Empty input yields no groups.
    pub(crate) fn from_json_str(s: &str) -> Option<Self> {
        if s.trim().is_empty() {
            return Some(Self::default());
        }
        match serde_json::from_str::<Value>(s).ok()? {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up one group by name.
    pub fn group(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}
