//! Path-aware JSON field extraction.
//!
//! Every accessor converts a missing or wrong-typed field into a named
//! [`ParseError`] carrying the dotted path (`document.recipient.publicKey`).
//! `null` is treated the same as absent.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};

use bcv_core::{ParseError, Timestamp};

/// Decode raw bytes into a JSON value.
pub(crate) fn parse_json(bytes: &[u8]) -> Result<Value, ParseError> {
    serde_json::from_slice(bytes).map_err(|e| ParseError::NotValidJson(e.to_string()))
}

/// A JSON object together with its path from the document root.
#[derive(Debug, Clone)]
pub(crate) struct Obj<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Obj<'a> {
    /// Wrap the document root, which must be an object.
    pub(crate) fn root(value: &'a Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path: String::new(),
            }),
            _ => Err(ParseError::NotValidJson(
                "top-level value is not an object".to_string(),
            )),
        }
    }

    pub(crate) fn path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn require(&self, key: &str) -> Result<&'a Value, ParseError> {
        self.get(key).ok_or_else(|| ParseError::missing(self.path(key)))
    }

    pub(crate) fn str(&self, key: &str) -> Result<&'a str, ParseError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| ParseError::invalid(self.path(key)))
    }

    pub(crate) fn opt_str(&self, key: &str) -> Result<Option<&'a str>, ParseError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| ParseError::invalid(self.path(key))),
        }
    }

    pub(crate) fn string_or_default(&self, key: &str) -> Result<String, ParseError> {
        Ok(self.opt_str(key)?.unwrap_or_default().to_string())
    }

    pub(crate) fn obj(&self, key: &str) -> Result<Obj<'a>, ParseError> {
        let path = self.path(key);
        match self.require(key)? {
            Value::Object(map) => Ok(Obj { map, path }),
            _ => Err(ParseError::InvalidField(path)),
        }
    }

    pub(crate) fn array(&self, key: &str) -> Result<&'a [Value], ParseError> {
        self.require(key)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| ParseError::invalid(self.path(key)))
    }

    /// Objects of an array field, each with an indexed path.
    pub(crate) fn objects(&self, key: &str) -> Result<Vec<Obj<'a>>, ParseError> {
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let path = format!("{}[{i}]", self.path(key));
                match v {
                    Value::Object(map) => Ok(Obj { map, path }),
                    _ => Err(ParseError::InvalidField(path)),
                }
            })
            .collect()
    }

    /// A boolean that older issuers sometimes wrote as `"true"`/`"false"`.
    pub(crate) fn bool_or(&self, key: &str, default: bool) -> Result<bool, ParseError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
            Some(_) => Err(ParseError::invalid(self.path(key))),
        }
    }

    pub(crate) fn timestamp(&self, key: &str) -> Result<Timestamp, ParseError> {
        let s = self.str(key)?;
        Timestamp::parse(s).map_err(|_| ParseError::invalid(self.path(key)))
    }

    pub(crate) fn opt_timestamp(&self, key: &str) -> Result<Option<Timestamp>, ParseError> {
        match self.opt_str(key)? {
            None => Ok(None),
            Some(s) => Timestamp::parse(s)
                .map(Some)
                .map_err(|_| ParseError::invalid(self.path(key))),
        }
    }

    /// An image field holding a `data:` URI; remote URLs decode to no bytes.
    pub(crate) fn image(&self, key: &str) -> Result<Vec<u8>, ParseError> {
        match self.opt_str(key)? {
            None => Ok(Vec::new()),
            Some(s) => decode_data_uri(s).ok_or_else(|| ParseError::invalid(self.path(key))),
        }
    }

    /// A string, or the first string of an array (JSON-LD `type` fields).
    pub(crate) fn first_str(&self, key: &str) -> Result<Option<&'a str>, ParseError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Array(items)) => Ok(items.iter().find_map(Value::as_str)),
            Some(_) => Err(ParseError::invalid(self.path(key))),
        }
    }
}

/// Decode a base64 `data:` URI. Non-data URIs yield empty bytes; a data URI
/// whose payload does not decode yields `None`.
pub(crate) fn decode_data_uri(s: &str) -> Option<Vec<u8>> {
    let Some(rest) = s.strip_prefix("data:") else {
        return Some(Vec::new());
    };
    match rest.split_once(";base64,") {
        Some((_, payload)) => BASE64.decode(payload.trim()).ok(),
        None => rest.split_once(',').map(|(_, payload)| payload.as_bytes().to_vec()),
    }
}

/// All string entries of a JSON-LD `@context`, whether it is a single
/// string or an array mixing strings and inline objects.
pub(crate) fn context_urls(root: &Obj<'_>) -> Vec<String> {
    match root.get("@context") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
