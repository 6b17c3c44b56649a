//! The `provenant validate` subcommand.
//!
//! Validates a statement according to its predicate type: provenances
//! against the schema and IR extraction, claims against the claim
//! invariants and, optionally, an expected claim type and instant.

use std::path::PathBuf;
use std::process;

use chrono::{DateTime, Utc};
use clap::Args;
use color_eyre::eyre::Result;
use provenant_intoto::claims::{ClaimSpec, validate_claim, validate_claim_type};
use provenant_intoto::provenance::{SLSA_PROVENANCE_V02, parse_provenance_file};
use provenant_intoto::statement::parse_statement;
use provenant_intoto::ClaimError;

/// Arguments for `provenant validate`.
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the statement JSON file.
    pub statement: PathBuf,

    /// Require this claim type URI.
    #[arg(long, value_name = "URI")]
    pub claim_type: Option<String>,

    /// Require the claim to apply at this RFC 3339 instant.
    #[arg(long, value_name = "TIMESTAMP")]
    pub at: Option<DateTime<Utc>>,

    /// JSON Schema for provenances (defaults to the built-in amber schema).
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,
}

/// Execute the validate command.
pub fn execute(args: &ValidateArgs) -> Result<()> {
    let bytes = std::fs::read(&args.statement)?;

    let outcome = if is_provenance(&bytes) {
        let schema = super::load_schema(args.schema.as_deref())?;
        parse_provenance_file(&bytes, &schema).map(|ir| {
            format!(
                "provenance of {} (sha256:{})",
                ir.binary_name(),
                ir.binary_sha256_digest()
            )
        })
    } else {
        validate_claim_bytes(&bytes, args)
    };

    match outcome {
        Ok(description) => {
            println!("[PASS] {description}");
            println!();
            println!("Validation PASSED");
            Ok(())
        }
        Err(err) => {
            println!("[FAIL] {err}");
            println!();
            println!("Validation FAILED");
            process::exit(1);
        }
    }
}

fn is_provenance(bytes: &[u8]) -> bool {
    parse_statement(bytes).is_ok_and(|s| s.predicate_type == SLSA_PROVENANCE_V02)
}

fn validate_claim_bytes(bytes: &[u8], args: &ValidateArgs) -> Result<String, ClaimError> {
    let statement = parse_statement(bytes)?;
    let predicate = validate_claim(&statement)?;
    if let Some(expected) = &args.claim_type {
        validate_claim_type(&predicate, expected)?;
    }
    let kind = match predicate.decode_spec()? {
        ClaimSpec::Endorsement => "endorsement".to_owned(),
        ClaimSpec::Fuzz(spec) => format!("fuzz claim over {} target(s)", spec.per_target.len()),
    };
    if let Some(at) = args.at {
        predicate.check_applicable_at(at)?;
    }
    let subject = statement
        .subject
        .first()
        .map_or("<no subject>", |s| s.name.as_str());
    Ok(format!(
        "{kind} of {subject}, valid {} to {}",
        predicate.validity.not_before.to_rfc3339(),
        predicate.validity.not_after.to_rfc3339()
    ))
}
