//! # Verify Subcommand
//!
//! Runs the validation pipeline against live providers. Signature recovery
//! for 1.x credentials is not available in this build, so those fail at
//! `CheckingIssuerSignature`. Ctrl-C aborts the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use bcv_client::{HttpJsonFetcher, Provider, TransactionSource};
use bcv_core::{HashScheme, JcsCanonicalizer, Network};
use bcv_validation::{NoSignatureRecovery, Outcome, Pipeline, PipelineConfig, Report, Services};

use crate::config::CliConfig;
use crate::read_document;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential JSON file.
    pub file: PathBuf,

    /// Network to validate against. Overrides the config file.
    #[arg(long)]
    pub network: Option<Network>,

    /// Anchoring transaction, for credentials that do not carry one.
    #[arg(long = "tx-id")]
    pub tx_id: Option<String>,

    /// Transaction provider. Overrides the config file.
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Apply command-line overrides on top of the file configuration.
pub fn effective_config(args: &VerifyArgs, config: &CliConfig) -> CliConfig {
    let mut config = config.clone();
    if let Some(network) = args.network {
        config.network = network;
    }
    if let Some(provider) = args.provider {
        config.client.provider = provider;
    }
    config
}

pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let bytes = read_document(&args.file)?;
    let credential = match bcv_vc::parse(&bytes) {
        Ok(credential) => credential,
        Err(e) => {
            eprintln!("{}: {e}", args.file.display());
            return Ok(1);
        }
    };
    if credential.generation.hash_scheme() != HashScheme::AnchoredProfile {
        tracing::warn!(
            generation = %credential.generation,
            "no signature recovery available; issuer signature check will fail"
        );
    }

    let config = effective_config(args, config);
    let mut pipeline_config = PipelineConfig::new(config.network);
    if let Some(tx_id) = &args.tx_id {
        pipeline_config = pipeline_config.with_transaction_id(tx_id.clone());
    }

    let services = Services {
        canonicalizer: JcsCanonicalizer,
        recovery: NoSignatureRecovery,
        transactions: TransactionSource::new(&config.client).context("transaction source")?,
        fetcher: HttpJsonFetcher::new(&config.client).context("document fetcher")?,
    };
    let pipeline = Pipeline::new(credential, services, pipeline_config);
    if !args.json {
        pipeline.on_transition(|_, to| eprintln!("  -> {to}"));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report = runtime.block_on(async {
        let handle = pipeline.abort_handle();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.abort();
            }
        });
        let report = pipeline.start().await;
        interrupt.abort();
        report
    });

    if args.json {
        let json = serde_json::to_string_pretty(&report_json(&report)).context("failed to serialize report")?;
        println!("{json}");
    } else {
        match &report.outcome {
            Some(Outcome::Success) => println!("VALID"),
            Some(Outcome::Failure { phase, error }) => println!("INVALID at {phase}: {error}"),
            None => println!("INCOMPLETE"),
        }
    }
    Ok(exit_code(&report))
}

pub fn exit_code(report: &Report) -> u8 {
    match &report.outcome {
        Some(outcome) if outcome.is_success() => 0,
        _ => 1,
    }
}

pub fn report_json(report: &Report) -> serde_json::Value {
    let outcome = report.outcome.as_ref();
    json!({
        "success": outcome.is_some_and(Outcome::is_success),
        "phase": outcome.and_then(Outcome::failed_phase),
        "reason": outcome.and_then(Outcome::reason),
        "transitions": report.transitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcv_validation::{Phase, Transition, ValidationError};

    fn args(network: Option<Network>, provider: Option<Provider>) -> VerifyArgs {
        VerifyArgs {
            file: PathBuf::from("credential.json"),
            network,
            tx_id: None,
            provider,
            json: false,
        }
    }

    #[test]
    fn flags_override_file_config() {
        let file = CliConfig::default();
        let config = effective_config(&args(Some(Network::Testnet), Some(Provider::BlockCypher)), &file);
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.client.provider, Provider::BlockCypher);
    }

    #[test]
    fn absent_flags_keep_file_config() {
        let mut file = CliConfig::default();
        file.network = Network::Testnet;
        assert_eq!(effective_config(&args(None, None), &file), file);
    }

    #[test]
    fn failure_report_json_names_phase_and_reason() {
        let report = Report {
            outcome: Some(Outcome::Failure {
                phase: Phase::ComparingHashes,
                error: ValidationError::MerkleProofInvalid,
            }),
            transitions: vec![Transition {
                from: Phase::ComparingHashes,
                to: Phase::Failure,
            }],
        };
        let value = report_json(&report);
        assert_eq!(value["success"], false);
        assert_eq!(value["phase"], json!(Phase::ComparingHashes));
        assert_eq!(value["reason"], ValidationError::MerkleProofInvalid.to_string());
        assert_eq!(value["transitions"].as_array().map(Vec::len), Some(1));
        assert_eq!(exit_code(&report), 1);
    }

    #[test]
    fn success_exits_zero() {
        let report = Report {
            outcome: Some(Outcome::Success),
            transitions: Vec::new(),
        };
        assert_eq!(exit_code(&report), 0);
        assert_eq!(report_json(&report)["reason"], serde_json::Value::Null);
    }
}
