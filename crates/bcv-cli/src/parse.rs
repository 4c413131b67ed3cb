//! # Parse Subcommand
//!
//! Parses a credential, auto-detecting its generation unless one is given.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bcv_core::Generation;
use bcv_vc::Credential;

use crate::read_document;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Credential JSON file.
    pub file: PathBuf,

    /// Parse strictly as this generation (1.1, 1.2, 2.0-alpha, 2.0, 2.1).
    #[arg(long)]
    pub generation: Option<Generation>,

    /// Print the parsed credential as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run_parse(args: &ParseArgs) -> Result<u8> {
    let bytes = read_document(&args.file)?;
    let parsed = match args.generation {
        Some(generation) => bcv_vc::parse_as(&bytes, generation),
        None => bcv_vc::parse(&bytes),
    };
    let credential = match parsed {
        Ok(credential) => credential,
        Err(e) => {
            eprintln!("{}: {e}", args.file.display());
            return Ok(1);
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&credential).context("failed to serialize credential")?;
        println!("{json}");
    } else {
        print!("{}", summary(&credential));
    }
    Ok(0)
}

/// Human-readable display fields, one per line.
pub fn summary(credential: &Credential) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: &str| {
        let _ = writeln!(out, "  {label:<13}{value}");
    };
    line("generation:", credential.generation.as_str());
    line("id:", &credential.id);
    line("title:", &credential.title);
    if let Some(subtitle) = &credential.subtitle {
        line("subtitle:", subtitle);
    }
    line(
        "issuer:",
        &format!("{} <{}>", credential.issuer.name, credential.issuer.id),
    );
    line(
        "recipient:",
        &format!("{} <{}>", credential.recipient.name, credential.recipient.identity),
    );
    line("address:", credential.recipient.public_address.as_str());
    line("issued on:", &credential.assertion.issued_on.to_iso8601());
    if let Some(transaction_id) = credential.transaction_id() {
        line("transaction:", transaction_id);
    }
    if let Some(share_url) = &credential.share_url {
        line("share url:", share_url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const V2_1: &[u8] = include_bytes!("../../bcv-vc/tests/fixtures/v2_1.json");
    const V1_1: &[u8] = include_bytes!("../../bcv-vc/tests/fixtures/v1_1.json");

    #[test]
    fn summary_lists_display_fields() {
        let credential = bcv_vc::parse(V2_1).unwrap();
        let text = summary(&credential);
        assert!(text.contains("generation:  2.1"), "{text}");
        assert!(text.contains("Alice Liddell"));
        assert!(text.contains("transaction:"));
        assert!(!text.contains("share url:"));
    }

    #[test]
    fn summary_includes_share_url_when_present() {
        let credential = bcv_vc::parse(V1_1).unwrap();
        let text = summary(&credential);
        assert!(text.contains("share url:   https://www.theissuer.edu/certificates/"));
        assert!(!text.contains("transaction:"));
    }

    #[test]
    fn strict_generation_mismatch_exits_nonzero() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, V1_1).unwrap();
        let args = ParseArgs {
            file: file.path().to_path_buf(),
            generation: Some(Generation::V2),
            json: false,
        };
        assert_eq!(run_parse(&args).unwrap(), 1);
    }
}
