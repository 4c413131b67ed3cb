//! Schema 1.1 and 1.2 extractors.
//!
//! Both share one body (`certificate`, `assertion`, `recipient`, `verify`,
//! `signature`). 1.1 carries it at the top level; 1.2 nests it under
//! `document` and adds a Chainpoint `receipt`, a recipient `publicKey` in
//! place of `pubkey`, and an optional recipient `revocationKey`.

use bcv_core::{BlockchainAddress, Generation, ParseError};
use bcv_crypto::Receipt;

use super::{metadata, receipt, share_url, signature_images, subtitle};
use crate::credential::{join_name, Assertion, Credential, Recipient, VerificationInfo};
use crate::issuer::{embedded_issuer, IssuerVersion};
use crate::json::Obj;

pub(super) fn is_v1_1(root: &Obj<'_>) -> bool {
    root.has("certificate") && root.has("assertion")
}

pub(super) fn is_v1_2(root: &Obj<'_>) -> bool {
    root.has("document")
}

pub(super) fn extract_v1_1(root: &Obj<'_>, raw: &[u8]) -> Result<Credential, ParseError> {
    if is_v1_2(root) || !is_v1_1(root) {
        return Err(ParseError::UnknownGeneration(
            "no top-level certificate and assertion".to_string(),
        ));
    }
    body(root, raw, Generation::V1_1, None)
}

pub(super) fn extract_v1_2(root: &Obj<'_>, raw: &[u8]) -> Result<Credential, ParseError> {
    if !is_v1_2(root) {
        return Err(ParseError::UnknownGeneration(
            "no embedded document".to_string(),
        ));
    }
    let document = root.obj("document")?;
    let receipt = receipt(&root.obj("receipt")?)?;
    body(&document, raw, Generation::V1_2, Some(receipt))
}

fn body(
    doc: &Obj<'_>,
    raw: &[u8],
    generation: Generation,
    receipt: Option<Receipt>,
) -> Result<Credential, ParseError> {
    let certificate = doc.obj("certificate")?;
    let assertion = doc.obj("assertion")?;
    let recipient = doc.obj("recipient")?;
    let verify = doc.obj("verify")?;

    let title = match certificate.opt_str("title")? {
        Some(title) => title,
        None => certificate.str("name")?,
    };
    let id = certificate.str("id")?.to_string();

    let (public_key_field, revocation_address) = match generation {
        Generation::V1_1 => ("pubkey", None),
        _ => (
            "publicKey",
            recipient.opt_str("revocationKey")?.map(BlockchainAddress::new),
        ),
    };

    let given_name = recipient.str("givenName")?;
    let family_name = recipient.str("familyName")?;

    let assertion = Assertion {
        issued_on: assertion.timestamp("issuedOn")?,
        signature_images: signature_images(&assertion, "image:signature")?,
        evidence: assertion.string_or_default("evidence")?,
        uid: assertion.str("uid")?.to_string(),
        id: assertion.string_or_default("id")?,
        metadata: metadata(&assertion, "metadataJson")?,
        html_display: None,
    };

    Ok(Credential {
        generation,
        title: title.to_string(),
        subtitle: subtitle(&certificate)?,
        description: certificate.str("description")?.to_string(),
        image: certificate.image("image")?,
        language: certificate.string_or_default("language")?,
        universal_identifier: Some(assertion.uid.clone()),
        share_url: share_url([assertion.id.as_str(), id.as_str()]),
        id,
        issuer: embedded_issuer(&certificate.obj("issuer")?, IssuerVersion::V1)?,
        recipient: Recipient {
            name: join_name(given_name, family_name),
            given_name: Some(given_name.to_string()),
            family_name: Some(family_name.to_string()),
            identity: recipient.str("identity")?.to_string(),
            identity_type: recipient
                .opt_str("type")?
                .unwrap_or("email")
                .to_string(),
            is_hashed: recipient.bool_or("hashed", false)?,
            public_address: BlockchainAddress::new(recipient.str(public_key_field)?),
            revocation_address,
        },
        assertion,
        verification: VerificationInfo {
            signer: verify.opt_str("signer")?.map(str::to_string),
            signed_attribute: verify
                .opt_str("attribute-signed")?
                .unwrap_or("uid")
                .to_string(),
            method: verify.str("type")?.to_string(),
            public_key: None,
        },
        signature: Some(doc.str("signature")?.to_string()),
        receipt,
        raw: raw.to_vec(),
    })
}
