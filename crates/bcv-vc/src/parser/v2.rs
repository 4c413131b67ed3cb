//! Schema 2.x extractors: Open Badges assertions with a Merkle proof in
//! `signature`. The three generations are told apart by their Blockcerts
//! JSON-LD context and differ only in where the recipient's name and key
//! live and whether inline display HTML is carried.

use bcv_core::{BlockchainAddress, Generation, ParseError};

use super::{metadata, receipt, share_url, signature_images, subtitle};
use crate::credential::{Assertion, Credential, Recipient, VerificationInfo};
use crate::issuer::{embedded_issuer, IssuerVersion};
use crate::json::{context_urls, Obj};

struct Layout {
    generation: Generation,
    /// Context URL suffixes that identify the generation.
    contexts: &'static [&'static str],
    /// Name and key live in `recipientProfile` rather than `recipient`.
    recipient_profile: bool,
    display_html: bool,
}

const V2_ALPHA: Layout = Layout {
    generation: Generation::V2Alpha,
    contexts: &["/blockcerts/v2.0-alpha", "/schema/2.0-alpha/context.json"],
    recipient_profile: false,
    display_html: false,
};

const V2: Layout = Layout {
    generation: Generation::V2,
    contexts: &["/blockcerts/v2", "/blockcerts/v2.0", "/schema/2.0/context.json"],
    recipient_profile: true,
    display_html: false,
};

const V2_1: Layout = Layout {
    generation: Generation::V2_1,
    contexts: &["/blockcerts/v2.1", "/schema/2.1/context.json"],
    recipient_profile: true,
    display_html: true,
};

/// The newest 2.x generation whose context the document declares.
pub(super) fn context_generation(root: &Obj<'_>) -> Option<Generation> {
    let urls = context_urls(root);
    [&V2_1, &V2, &V2_ALPHA]
        .into_iter()
        .find(|layout| {
            urls.iter().any(|url| {
                let url = url.trim_end_matches('/');
                layout.contexts.iter().any(|suffix| url.ends_with(suffix))
            })
        })
        .map(|layout| layout.generation)
}

pub(super) fn extract_v2_alpha(root: &Obj<'_>, raw: &[u8]) -> Result<Credential, ParseError> {
    extract(root, raw, &V2_ALPHA)
}

pub(super) fn extract_v2(root: &Obj<'_>, raw: &[u8]) -> Result<Credential, ParseError> {
    extract(root, raw, &V2)
}

pub(super) fn extract_v2_1(root: &Obj<'_>, raw: &[u8]) -> Result<Credential, ParseError> {
    extract(root, raw, &V2_1)
}

fn extract(root: &Obj<'_>, raw: &[u8], layout: &Layout) -> Result<Credential, ParseError> {
    if context_generation(root) != Some(layout.generation) {
        return Err(ParseError::UnknownGeneration(format!(
            "no blockcerts {} context",
            layout.generation
        )));
    }

    let badge = root.obj("badge")?;
    let recipient = root.obj("recipient")?;
    let verification = root.obj("verification")?;
    let id = root.str("id")?.to_string();

    let (name, public_key) = if layout.recipient_profile {
        let profile = root.obj("recipientProfile")?;
        (profile.string_or_default("name")?, profile.str("publicKey")?)
    } else {
        (recipient.string_or_default("name")?, recipient.str("publicKey")?)
    };

    let issuer_version = match layout.generation {
        Generation::V2Alpha => IssuerVersion::V2Alpha,
        _ => IssuerVersion::V2,
    };

    let method = verification
        .first_str("type")?
        .ok_or_else(|| ParseError::missing(verification.path("type")))?;

    let html_display = if layout.display_html {
        root.opt_str("displayHtml")?.map(str::to_string)
    } else {
        None
    };

    Ok(Credential {
        generation: layout.generation,
        title: badge.str("name")?.to_string(),
        subtitle: subtitle(&badge)?,
        description: badge.str("description")?.to_string(),
        image: badge.image("image")?,
        language: root.string_or_default("language")?,
        universal_identifier: None,
        share_url: share_url([id.as_str()]),
        issuer: embedded_issuer(&badge.obj("issuer")?, issuer_version)?,
        recipient: Recipient {
            name,
            given_name: None,
            family_name: None,
            identity: recipient.str("identity")?.to_string(),
            identity_type: recipient.opt_str("type")?.unwrap_or("email").to_string(),
            is_hashed: recipient.bool_or("hashed", false)?,
            public_address: BlockchainAddress::new(public_key),
            revocation_address: None,
        },
        assertion: Assertion {
            issued_on: root.timestamp("issuedOn")?,
            signature_images: signature_images(&badge, "signatureLines")?,
            evidence: root.string_or_default("evidence")?,
            uid: id.clone(),
            id: id.clone(),
            metadata: metadata(root, "metadataJson")?,
            html_display,
        },
        verification: VerificationInfo {
            signer: None,
            signed_attribute: "uid".to_string(),
            method: method.to_string(),
            public_key: verification.opt_str("publicKey")?.map(BlockchainAddress::new),
        },
        signature: None,
        receipt: Some(receipt(&root.obj("signature")?)?),
        id,
        raw: raw.to_vec(),
    })
}
