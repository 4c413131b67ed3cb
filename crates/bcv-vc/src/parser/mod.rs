//! # Multi-Generation Parser
//!
//! Turns raw document bytes into a [`Credential`].
//!
//! Each generation has one extractor in [`EXTRACTORS`]. An extractor first
//! checks the generation's marker fields and answers
//! [`ParseError::UnknownGeneration`] when they are absent, then extracts its
//! required fields, answering `MissingField`/`InvalidField` with the dotted
//! path of the first offender.
//!
//! [`parse`] walks the table oldest first and returns the first success.
//! When every generation fails, it returns the last field-level error, so a
//! document that is recognisably 2.0 but lacks `badge.issuer.id` reports
//! exactly that instead of "unknown generation". Only when no generation
//! recognised the document does it return `UnknownGeneration`.

mod v1;
mod v2;

use serde_json::Value;

use bcv_core::{Generation, ParseError};
use bcv_crypto::{ProofStep, Receipt};

use crate::credential::{Credential, Metadata, SignatureImage};
use crate::json::{decode_data_uri, parse_json, Obj};

type ExtractFn = fn(&Obj<'_>, &[u8]) -> Result<Credential, ParseError>;

struct Extractor {
    generation: Generation,
    extract: ExtractFn,
}

/// Per-generation extractors, oldest first.
static EXTRACTORS: [Extractor; 5] = [
    Extractor {
        generation: Generation::V1_1,
        extract: v1::extract_v1_1,
    },
    Extractor {
        generation: Generation::V1_2,
        extract: v1::extract_v1_2,
    },
    Extractor {
        generation: Generation::V2Alpha,
        extract: v2::extract_v2_alpha,
    },
    Extractor {
        generation: Generation::V2,
        extract: v2::extract_v2,
    },
    Extractor {
        generation: Generation::V2_1,
        extract: v2::extract_v2_1,
    },
];

/// Parse a credential, detecting its generation.
pub fn parse(bytes: &[u8]) -> Result<Credential, ParseError> {
    let value = parse_json(bytes)?;
    let root = Obj::root(&value)?;

    let mut last_error: Option<ParseError> = None;
    for extractor in EXTRACTORS.iter() {
        match (extractor.extract)(&root, bytes) {
            Ok(credential) => {
                tracing::debug!(generation = %extractor.generation, "credential parsed");
                return Ok(credential);
            }
            Err(ParseError::UnknownGeneration(reason)) => {
                tracing::trace!(generation = %extractor.generation, %reason, "markers absent");
            }
            Err(e) => {
                tracing::debug!(generation = %extractor.generation, error = %e, "extraction failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        ParseError::UnknownGeneration("document matches no supported generation".to_string())
    }))
}

/// Parse a credential strictly as `generation`.
pub fn parse_as(bytes: &[u8], generation: Generation) -> Result<Credential, ParseError> {
    let value = parse_json(bytes)?;
    let root = Obj::root(&value)?;
    (extractor_for(generation).extract)(&root, bytes)
}

/// Sniff the generation from marker fields alone, without extracting.
pub fn detect_generation(value: &Value) -> Option<Generation> {
    let root = Obj::root(value).ok()?;
    if v1::is_v1_2(&root) {
        Some(Generation::V1_2)
    } else if v1::is_v1_1(&root) {
        Some(Generation::V1_1)
    } else {
        v2::context_generation(&root)
    }
}

fn extractor_for(generation: Generation) -> &'static Extractor {
    match generation {
        Generation::V1_1 => &EXTRACTORS[0],
        Generation::V1_2 => &EXTRACTORS[1],
        Generation::V2Alpha => &EXTRACTORS[2],
        Generation::V2 => &EXTRACTORS[3],
        Generation::V2_1 => &EXTRACTORS[4],
    }
}

/// Merkle receipt: a 1.2 `receipt` object or a 2.x `signature` object.
fn receipt(obj: &Obj<'_>) -> Result<Receipt, ParseError> {
    let proof = obj
        .array("proof")?
        .iter()
        .enumerate()
        .map(|(i, step)| proof_step(step, &format!("{}[{i}]", obj.path("proof"))))
        .collect::<Result<Vec<_>, ParseError>>()?;
    let anchors = obj.objects("anchors")?;
    let anchor = anchors
        .first()
        .ok_or_else(|| ParseError::invalid(obj.path("anchors")))?;
    Ok(Receipt {
        merkle_root: obj.str("merkleRoot")?.to_string(),
        target_hash: obj.str("targetHash")?.to_string(),
        proof,
        transaction_id: anchor.str("sourceId")?.to_string(),
        chain: anchor.opt_str("chain")?.map(str::to_string),
    })
}

/// A step with neither tag is kept as `Untagged`; the verifier rejects it.
fn proof_step(step: &Value, path: &str) -> Result<ProofStep, ParseError> {
    let Value::Object(map) = step else {
        return Err(ParseError::invalid(path));
    };
    let sibling = |tag: &str| -> Result<Option<String>, ParseError> {
        match map.get(tag) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(h)) => Ok(Some(h.clone())),
            Some(_) => Err(ParseError::invalid(format!("{path}.{tag}"))),
        }
    };
    Ok(match (sibling("left")?, sibling("right")?) {
        (Some(h), _) => ProofStep::Left(h),
        (None, Some(h)) => ProofStep::Right(h),
        (None, None) => ProofStep::Untagged,
    })
}

/// Signature images: a single data URI string, or an array of
/// `{image, jobTitle, name}` lines.
fn signature_images(obj: &Obj<'_>, key: &str) -> Result<Vec<SignatureImage>, ParseError> {
    match obj.get(key) {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![SignatureImage {
            image: decode_data_uri(s).ok_or_else(|| ParseError::invalid(obj.path(key)))?,
            title: None,
            name: None,
        }]),
        Some(Value::Array(_)) => obj
            .objects(key)?
            .iter()
            .map(|line| {
                Ok(SignatureImage {
                    image: line.image("image")?,
                    title: line.opt_str("jobTitle")?.map(str::to_string),
                    name: line.opt_str("name")?.map(str::to_string),
                })
            })
            .collect(),
        Some(_) => Err(ParseError::invalid(obj.path(key))),
    }
}

/// Metadata as an embedded JSON string or an inline object.
fn metadata(obj: &Obj<'_>, key: &str) -> Result<Metadata, ParseError> {
    match obj.get(key) {
        None => Ok(Metadata::default()),
        Some(Value::String(s)) => {
            Metadata::from_json_str(s).ok_or_else(|| ParseError::invalid(obj.path(key)))
        }
        Some(Value::Object(map)) => Ok(Metadata(map.clone())),
        Some(_) => Err(ParseError::invalid(obj.path(key))),
    }
}

/// A subtitle is either a plain string or `{content, display}`.
fn subtitle(obj: &Obj<'_>) -> Result<Option<String>, ParseError> {
    match obj.get("subtitle") {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Object(_)) => Ok(obj.obj("subtitle")?.opt_str("content")?.map(str::to_string)),
        Some(_) => Err(ParseError::invalid(obj.path("subtitle"))),
    }
}

/// The first candidate that is an http(s) URL.
fn share_url<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .find(|c| c.starts_with("https://") || c.starts_with("http://"))
        .map(str::to_string)
}
