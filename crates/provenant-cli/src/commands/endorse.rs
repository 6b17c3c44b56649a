//! The `provenant endorse` subcommand.
//!
//! Verifies that a set of provenances agree on one binary, then writes an
//! endorsement of that binary backed by the provenances.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use color_eyre::eyre::Result;
use provenant_intoto::claims::{ClaimValidity, ENDORSEMENT_V2, validate_claim, validate_claim_type};
use provenant_intoto::endorsement::generate_endorsement_at;
use provenant_verify::digest::check_binary_digest;
use provenant_verify::{ProvenanceVerifier, ReferenceValues};
use tracing::info;

/// Arguments for `provenant endorse`.
#[derive(Args)]
pub struct EndorseArgs {
    /// Provenance files describing the binary.
    #[arg(required = true)]
    pub provenances: Vec<PathBuf>,

    /// Where to write the endorsement statement.
    #[arg(short, long, value_name = "PATH", default_value = "endorsement.json")]
    pub output: PathBuf,

    /// JSON Schema for provenances (defaults to the built-in amber schema).
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// The binary itself; its SHA-256 must match the provenances.
    #[arg(long, value_name = "PATH")]
    pub binary: Option<PathBuf>,

    /// Expected SHA-256 of the binary.
    #[arg(long, value_name = "HEX")]
    pub binary_digest: Option<String>,

    /// Expected SHA-256 of the builder image.
    #[arg(long, value_name = "HEX")]
    pub builder_image_digest: Option<String>,

    /// Days from now until the endorsement takes effect.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub not_before_days: i64,

    /// Days from now until the endorsement expires.
    #[arg(long, default_value_t = 90, allow_negative_numbers = true)]
    pub not_after_days: i64,
}

/// Execute the endorse command.
pub fn execute(args: &EndorseArgs) -> Result<()> {
    let schema = super::load_schema(args.schema.as_deref())?;
    let verifier = ProvenanceVerifier::new(
        &schema,
        ReferenceValues {
            binary_sha256_digest: args.binary_digest.clone(),
            builder_image_sha256_digest: args.builder_image_digest.clone(),
        },
    );
    let provenances = verifier.verify_files(args.provenances.as_slice())?;

    if let Some(binary) = &args.binary {
        check_binary_digest(binary, &provenances.binary_digest)?;
    }

    let now = Utc::now();
    let validity = ClaimValidity::from_offsets(now, args.not_before_days, args.not_after_days);
    let endorsement = generate_endorsement_at(now, validity, &provenances);

    let predicate = validate_claim(&endorsement.to_raw()?)?;
    validate_claim_type(&predicate, ENDORSEMENT_V2)?;
    endorsement.write_to(&args.output)?;

    info!(
        binary = %provenances.binary_name,
        output = %args.output.display(),
        "endorsement written"
    );
    println!(
        "Endorsed {} (sha256:{}) with {} provenance(s)",
        provenances.binary_name,
        provenances.binary_digest,
        provenances.provenances.len()
    );
    println!("Written to {}", args.output.display());
    Ok(())
}
