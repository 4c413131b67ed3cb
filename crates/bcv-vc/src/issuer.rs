//! # Issuer Profiles
//!
//! An issuer publishes a JSON profile at its identity URL listing the keys
//! it has signed with over time. Two profile shapes exist:
//!
//! - **V1** (`issuerKeys`, `revocationKeys`): each entry is `{date, key}`;
//!   a key is valid from its date until the next entry's date.
//! - **V2** (`publicKey`, or `publicKeys` in 2.0-alpha profiles): each entry
//!   carries its own `created`, optional `revoked`, and optional `expires`
//!   instants, plus a hosted revocation list URL.
//!
//! [`detect_issuer_generation`] sniffs which shape a profile has;
//! [`parse_issuer`] builds an [`Issuer`] from it.

use serde::Serialize;
use serde_json::Value;

use bcv_core::{BlockchainAddress, ParseError, Timestamp};

use crate::json::{parse_json, Obj};

/// Issuer profile generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum IssuerVersion {
    /// `issuerKeys` schedule with implicit validity windows.
    V1,
    /// `publicKeys` entries of the 2.0-alpha schema.
    V2Alpha,
    /// `publicKey` entries with explicit created/revoked/expires.
    V2,
}

impl std::fmt::Display for IssuerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::V1 => "1",
            Self::V2Alpha => "2.0-alpha",
            Self::V2 => "2.0",
        })
    }
}

/// One entry of an issuer's key schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRotationEntry {
    /// Instant from which the key may sign.
    pub effective_from: Timestamp,
    pub key: BlockchainAddress,
    /// Instant at which the key was revoked, if ever.
    pub revoked_at: Option<Timestamp>,
    /// Instant at which the key stops being valid, if bounded.
    pub expires_at: Option<Timestamp>,
}

impl KeyRotationEntry {
    /// An entry valid from `effective_from` with no revocation or expiry.
    pub fn new(effective_from: Timestamp, key: BlockchainAddress) -> Self {
        Self {
            effective_from,
            key,
            revoked_at: None,
            expires_at: None,
        }
    }
}

/// How a recipient introduces their key to the issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntroductionMethod {
    /// The issuer accepts no introductions.
    None,
    /// Plain JSON POST to a URL.
    BasicPost { url: String },
    /// Browser-based flow with success and error redirect URLs.
    WebAuthenticated {
        url: String,
        success_url: String,
        error_url: String,
    },
}

/// An issuer, either embedded in a credential or loaded from its profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub version: IssuerVersion,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub image: Vec<u8>,
    /// Identity URL, from which the full profile can be fetched.
    pub id: String,
    /// Public listing URL.
    pub url: String,
    /// Signing key schedule, ordered by `effective_from`.
    pub issuer_keys: Vec<KeyRotationEntry>,
    /// Revocation key schedule (V1 profiles only).
    pub revocation_keys: Vec<KeyRotationEntry>,
    /// Hosted revocation list URL (V2 profiles).
    pub revocation_list: Option<String>,
    pub introduction: IntroductionMethod,
}

/// Sniff the profile shape from its key fields.
pub fn detect_issuer_generation(profile: &Value) -> Result<IssuerVersion, ParseError> {
    let root = Obj::root(profile)?;
    if root.has("publicKey") {
        Ok(IssuerVersion::V2)
    } else if root.has("publicKeys") {
        Ok(IssuerVersion::V2Alpha)
    } else if root.has("issuerKeys") {
        Ok(IssuerVersion::V1)
    } else {
        Err(ParseError::UnknownGeneration(
            "issuer profile has neither issuerKeys nor publicKey".to_string(),
        ))
    }
}

/// Parse a hosted issuer profile.
pub fn parse_issuer(bytes: &[u8]) -> Result<Issuer, ParseError> {
    parse_issuer_value(&parse_json(bytes)?)
}

/// Parse an issuer profile that has already been decoded as JSON.
pub fn parse_issuer_value(value: &Value) -> Result<Issuer, ParseError> {
    let version = detect_issuer_generation(value)?;
    let root = Obj::root(value)?;

    let (issuer_keys, revocation_keys) = match version {
        IssuerVersion::V1 => (
            v1_schedule(&root, "issuerKeys")?,
            if root.has("revocationKeys") {
                v1_schedule(&root, "revocationKeys")?
            } else {
                Vec::new()
            },
        ),
        IssuerVersion::V2Alpha => (v2_schedule(&root, "publicKeys", "publicKey")?, Vec::new()),
        IssuerVersion::V2 => (v2_schedule(&root, "publicKey", "id")?, Vec::new()),
    };
    if issuer_keys.is_empty() {
        return Err(ParseError::invalid(root.path(match version {
            IssuerVersion::V1 => "issuerKeys",
            IssuerVersion::V2Alpha => "publicKeys",
            IssuerVersion::V2 => "publicKey",
        })));
    }

    let revocation_list = match version {
        IssuerVersion::V1 => None,
        _ => root.opt_str("revocationList")?.map(str::to_string),
    };

    Ok(Issuer {
        version,
        name: root.str("name")?.to_string(),
        email: root.string_or_default("email")?,
        image: root.image("image")?,
        id: root.str("id")?.to_string(),
        url: root.string_or_default("url")?,
        issuer_keys,
        revocation_keys,
        revocation_list,
        introduction: introduction(&root)?,
    })
}

/// Build an issuer from the object embedded in a credential.
pub(crate) fn embedded_issuer(obj: &Obj<'_>, version: IssuerVersion) -> Result<Issuer, ParseError> {
    Ok(Issuer {
        version,
        name: obj.str("name")?.to_string(),
        email: obj.string_or_default("email")?,
        image: obj.image("image")?,
        id: obj.str("id")?.to_string(),
        url: obj.string_or_default("url")?,
        issuer_keys: Vec::new(),
        revocation_keys: Vec::new(),
        revocation_list: obj.opt_str("revocationList")?.map(str::to_string),
        introduction: IntroductionMethod::None,
    })
}

fn v1_schedule(root: &Obj<'_>, field: &str) -> Result<Vec<KeyRotationEntry>, ParseError> {
    let mut entries = root
        .objects(field)?
        .iter()
        .map(|entry| {
            Ok(KeyRotationEntry::new(
                entry.timestamp("date")?,
                BlockchainAddress::new(entry.str("key")?),
            ))
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    entries.sort_by_key(|e| e.effective_from);
    // Each key is superseded by the next one in the schedule.
    let successors: Vec<Timestamp> = entries.iter().skip(1).map(|e| e.effective_from).collect();
    for (entry, next) in entries.iter_mut().zip(successors) {
        entry.expires_at = Some(next);
    }
    Ok(entries)
}

fn v2_schedule(
    root: &Obj<'_>,
    field: &str,
    key_field: &str,
) -> Result<Vec<KeyRotationEntry>, ParseError> {
    let mut entries = root
        .objects(field)?
        .iter()
        .map(|entry| {
            Ok(KeyRotationEntry {
                effective_from: entry.timestamp("created")?,
                key: BlockchainAddress::new(entry.str(key_field)?),
                revoked_at: entry.opt_timestamp("revoked")?,
                expires_at: entry.opt_timestamp("expires")?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    entries.sort_by_key(|e| e.effective_from);
    Ok(entries)
}

fn introduction(root: &Obj<'_>) -> Result<IntroductionMethod, ParseError> {
    let Some(url) = root.opt_str("introductionURL")? else {
        return Ok(IntroductionMethod::None);
    };
    let method = root.opt_str("introductionAuthenticationMethod")?;
    match method {
        Some("web") => Ok(IntroductionMethod::WebAuthenticated {
            url: url.to_string(),
            success_url: root.str("introductionSuccessURL")?.to_string(),
            error_url: root.str("introductionErrorURL")?.to_string(),
        }),
        Some("none") => Ok(IntroductionMethod::None),
        Some("basic") | None => Ok(IntroductionMethod::BasicPost {
            url: url.to_string(),
        }),
        Some(_) => Err(ParseError::invalid(
            root.path("introductionAuthenticationMethod"),
        )),
    }
}
