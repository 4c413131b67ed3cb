//! # bcv-cli: Blockcerts Command-Line Interface
//!
//! ## Subcommands
//!
//! - `bcv parse`: parse a credential and print its display fields.
//! - `bcv issuer`: parse an issuer profile and print its key schedule.
//! - `bcv verify`: run the validation pipeline against live providers.
//!
//! Handlers return the process exit code: `0` valid, `1` invalid. Errors
//! that stop a command before it can decide exit with `2`.
//!
//! ```bash
//! bcv parse credential.json --generation 2.0
//! bcv issuer profile.json --json
//! bcv verify credential.json --network testnet --config bcv.yaml
//! ```

pub mod config;
pub mod issuer;
pub mod parse;
pub mod verify;

use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read a JSON document from disk.
pub fn read_document(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(bytes)
}
