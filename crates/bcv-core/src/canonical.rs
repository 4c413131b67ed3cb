//! # Canonicalization Seam
//!
//! Blockcerts 1.2+ hash a *canonical* serialization of the document so two
//! semantically identical JSON-LD documents hash identically. Issuers use
//! RDF Dataset Normalization (URDNA2015), which this workspace does not
//! implement: it is consumed through the [`Canonicalizer`] trait and
//! injected into each validation pipeline.
//!
//! [`JcsCanonicalizer`] is the one in-tree implementation. It produces RFC
//! 8785 (JSON Canonicalization Scheme) output: sorted keys, compact
//! separators, deterministic number formatting. It is deterministic and
//! order-independent for JSON input, which makes it suitable for offline
//! fixtures and for documents hashed with JCS, but it does not reproduce
//! URDNA2015 digests of issuer-produced credentials.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::CanonicalizationError;

/// External document normalization service.
///
/// Implementations must be deterministic for semantically identical input
/// and safe for concurrent use by independent pipelines.
pub trait Canonicalizer: Send + Sync {
    /// Normalize a serialized JSON document into its canonical string form.
    fn normalize(
        &self,
        document: &[u8],
    ) -> impl Future<Output = Result<String, CanonicalizationError>> + Send;
}

impl<T: Canonicalizer> Canonicalizer for Arc<T> {
    fn normalize(
        &self,
        document: &[u8],
    ) -> impl Future<Output = Result<String, CanonicalizationError>> + Send {
        (**self).normalize(document)
    }
}

/// RFC 8785 canonicalizer backed by `serde_jcs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JcsCanonicalizer;

impl JcsCanonicalizer {
    /// Canonicalize synchronously.
    pub fn canonicalize(document: &[u8]) -> Result<String, CanonicalizationError> {
        let value: Value = serde_json::from_slice(document)
            .map_err(|e| CanonicalizationError::InvalidInput(e.to_string()))?;
        Ok(serde_jcs::to_string(&value)?)
    }
}

impl Canonicalizer for JcsCanonicalizer {
    async fn normalize(&self, document: &[u8]) -> Result<String, CanonicalizationError> {
        Self::canonicalize(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_keys_compact() {
        let s = JcsCanonicalizer::canonicalize(br#"{"b": 2, "a": 1, "c": "hello"}"#).unwrap();
        assert_eq!(s, r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_nested_objects_sorted() {
        let s = JcsCanonicalizer::canonicalize(br#"{"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]}"#)
            .unwrap();
        assert_eq!(s, r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = JcsCanonicalizer::canonicalize(b"{not json").unwrap_err();
        assert!(matches!(err, CanonicalizationError::InvalidInput(_)));
    }

    #[test]
    fn test_unicode_passthrough() {
        let s = JcsCanonicalizer::canonicalize("{\"name\": \"\u{00e9}\"}".as_bytes()).unwrap();
        assert!(s.contains('\u{00e9}'));
    }

    #[tokio::test]
    async fn test_async_normalize_matches_sync() {
        let doc = br#"{"z": true, "a": null}"#;
        let a = JcsCanonicalizer.normalize(doc).await.unwrap();
        let b = JcsCanonicalizer::canonicalize(doc).unwrap();
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,30}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Canonical output is stable under re-serialization of its own input.
        #[test]
        fn canonicalization_is_idempotent(value in json_value()) {
            let bytes = serde_json::to_vec_pretty(&value).unwrap();
            let once = JcsCanonicalizer::canonicalize(&bytes).unwrap();
            let twice = JcsCanonicalizer::canonicalize(once.as_bytes()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
