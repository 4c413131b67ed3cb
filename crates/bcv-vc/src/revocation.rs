//! Hosted revocation lists published by V2 issuers.

use serde::Serialize;

use bcv_core::ParseError;

use crate::json::{parse_json, Obj};

/// One revoked credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedAssertion {
    pub id: String,
    pub revocation_reason: Option<String>,
}

/// An issuer's revocation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationList {
    pub id: Option<String>,
    pub issuer: Option<String>,
    pub revoked_assertions: Vec<RevokedAssertion>,
}

impl RevocationList {
    /// Parse a revocation list document. A list without `revokedAssertions`
    /// revokes nothing.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let value = parse_json(bytes)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self, ParseError> {
        let root = Obj::root(value)?;
        let revoked_assertions = if root.has("revokedAssertions") {
            root.objects("revokedAssertions")?
                .iter()
                .map(|entry| {
                    Ok(RevokedAssertion {
                        id: entry.str("id")?.to_string(),
                        revocation_reason: entry.opt_str("revocationReason")?.map(str::to_string),
                    })
                })
                .collect::<Result<Vec<_>, ParseError>>()?
        } else {
            Vec::new()
        };
        Ok(Self {
            id: root.opt_str("id")?.map(str::to_string),
            issuer: root.opt_str("issuer")?.map(str::to_string),
            revoked_assertions,
        })
    }

    /// The entry revoking `credential_id`, if any.
    pub fn find(&self, credential_id: &str) -> Option<&RevokedAssertion> {
        self.revoked_assertions
            .iter()
            .find(|entry| entry.id == credential_id)
    }
}
