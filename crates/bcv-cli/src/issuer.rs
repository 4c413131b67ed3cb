//! # Issuer Subcommand
//!
//! Parses a hosted issuer profile and prints its key schedules.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bcv_vc::{IntroductionMethod, Issuer, KeyRotationEntry};

use crate::read_document;

#[derive(Args, Debug)]
pub struct IssuerArgs {
    /// Issuer profile JSON file.
    pub file: PathBuf,

    /// Print the parsed profile as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run_issuer(args: &IssuerArgs) -> Result<u8> {
    let bytes = read_document(&args.file)?;
    let issuer = match bcv_vc::parse_issuer(&bytes) {
        Ok(issuer) => issuer,
        Err(e) => {
            eprintln!("{}: {e}", args.file.display());
            return Ok(1);
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&issuer).context("failed to serialize issuer")?;
        println!("{json}");
    } else {
        print!("{}", summary(&issuer));
    }
    Ok(0)
}

fn window(entry: &KeyRotationEntry) -> String {
    let mut out = format!("from {}", entry.effective_from);
    if let Some(revoked_at) = entry.revoked_at {
        let _ = write!(out, ", revoked {revoked_at}");
    }
    if let Some(expires_at) = entry.expires_at {
        let _ = write!(out, ", expires {expires_at}");
    }
    out
}

pub fn summary(issuer: &Issuer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  profile:     {}", issuer.version);
    let _ = writeln!(out, "  name:        {}", issuer.name);
    let _ = writeln!(out, "  id:          {}", issuer.id);
    if let Some(list) = &issuer.revocation_list {
        let _ = writeln!(out, "  revocations: {list}");
    }
    match &issuer.introduction {
        IntroductionMethod::None => {}
        IntroductionMethod::BasicPost { url } | IntroductionMethod::WebAuthenticated { url, .. } => {
            let _ = writeln!(out, "  introduce:   {url}");
        }
    }
    let _ = writeln!(out, "  issuer keys:");
    for entry in &issuer.issuer_keys {
        let _ = writeln!(out, "    {}  {}", entry.key, window(entry));
    }
    if !issuer.revocation_keys.is_empty() {
        let _ = writeln!(out, "  revocation keys:");
        for entry in &issuer.revocation_keys {
            let _ = writeln!(out, "    {}  {}", entry.key, window(entry));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_shows_key_windows() {
        let profile = json!({
            "id": "https://issuer.example.org/profile.json",
            "name": "Example Field School",
            "revocationList": "https://issuer.example.org/revocations.json",
            "publicKey": [{
                "id": "ecdsa-koblitz-pubkey:msBCHdwaQ7N2ypBYupkp6uNxtr9Pg76imj",
                "created": "2017-01-01T00:00:00+00:00",
                "revoked": "2018-01-01T00:00:00+00:00"
            }]
        });
        let issuer = bcv_vc::parse_issuer_value(&profile).unwrap();
        let text = summary(&issuer);
        assert!(text.contains("profile:     2.0"), "{text}");
        assert!(text.contains("msBCHdwaQ7N2ypBYupkp6uNxtr9Pg76imj  from 2017-01-01"), "{text}");
        assert!(text.contains("revoked 2018-01-01"), "{text}");
        assert!(!text.contains("revocation keys:"));
    }
}
