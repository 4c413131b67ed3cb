//! # Hex Digests
//!
//! SHA-256 hashing and hex encoding for document hashes, Merkle nodes, and
//! on-chain OP_RETURN payloads.
//!
//! ## Case Policy
//!
//! Transaction providers disagree on hex casing. Every digest produced here
//! is lowercase, and [`hex_eq`] compares after lowercasing both sides.
//! Decoding is strict: odd lengths and non-hex characters are errors, never
//! silently truncated.

use sha2::{Digest, Sha256};

use crate::error::DigestError;

/// Encode bytes as lowercase hex.
pub fn bytes_to_hex(b: &[u8]) -> String {
    b.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Decode a hex string into bytes.
///
/// Accepts upper or lower case. Surrounding whitespace is not accepted.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, DigestError> {
    if hex.len() % 2 != 0 {
        return Err(DigestError::OddLength(hex.len()));
    }
    let bytes = hex.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for (i, pair) in bytes.chunks(2).enumerate() {
        let hi = nibble(pair[0]).ok_or(DigestError::InvalidCharacter(i * 2))?;
        let lo = nibble(pair[1]).ok_or(DigestError::InvalidCharacter(i * 2 + 1))?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Raw SHA-256 of a byte slice.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

/// SHA-256 of a byte slice, rendered as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    bytes_to_hex(&sha256(data))
}

/// Case-insensitive hex equality. Whitespace is significant.
pub fn hex_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        assert_eq!(
            sha256_hex(b"{}"),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hex_roundtrip_mixed_case() {
        let bytes = hex_to_bytes("DEADbeef").unwrap();
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bytes_to_hex(&bytes), "deadbeef");
    }

    #[test]
    fn test_odd_length_rejected() {
        assert_eq!(hex_to_bytes("abc"), Err(DigestError::OddLength(3)));
    }

    #[test]
    fn test_non_hex_rejected() {
        assert_eq!(hex_to_bytes("zz"), Err(DigestError::InvalidCharacter(0)));
        assert_eq!(hex_to_bytes("0g"), Err(DigestError::InvalidCharacter(1)));
    }

    #[test]
    fn test_empty_hex_decodes_to_empty() {
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_hex_eq_ignores_case() {
        assert!(hex_eq("ABCDEF", "abcdef"));
        assert!(!hex_eq(" abcdef", "abcdef"));
        assert!(!hex_eq("abcdef", "abcdee"));
    }
}
