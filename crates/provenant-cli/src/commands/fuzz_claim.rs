//! The `provenant fuzz-claim` subcommand.
//!
//! Aggregates one day of OSS-Fuzz coverage and ClusterFuzz logs, read from
//! a local mirror of the buckets, into a fuzz claim statement.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use color_eyre::eyre::Result;
use provenant_fuzz::{FuzzAggregator, FuzzParameters, LocalBlobStore, generate_fuzz_claim_at};
use provenant_intoto::claims::{ClaimValidity, FUZZ_CLAIM_V1, validate_claim, validate_claim_type};
use tracing::info;

/// Arguments for `provenant fuzz-claim`.
#[derive(Args)]
pub struct FuzzClaimArgs {
    /// TOML file of fuzz parameters.
    #[arg(long, value_name = "PATH")]
    pub params: PathBuf,

    /// Directory holding one subdirectory per bucket.
    #[arg(long, value_name = "DIR")]
    pub blob_root: PathBuf,

    /// Where to write the fuzz claim statement.
    #[arg(short, long, value_name = "PATH", default_value = "fuzz_claim.json")]
    pub output: PathBuf,

    /// Days from now until the claim takes effect.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub not_before_days: i64,

    /// Days from now until the claim expires.
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    pub not_after_days: i64,
}

/// Execute the fuzz-claim command.
pub fn execute(args: &FuzzClaimArgs) -> Result<()> {
    let params = FuzzParameters::load(&args.params)?;
    let store = LocalBlobStore::new(&args.blob_root);
    let aggregation = FuzzAggregator::new(&store, &params).aggregate()?;

    let now = Utc::now();
    let validity = ClaimValidity::from_offsets(now, args.not_before_days, args.not_after_days);
    let claim = generate_fuzz_claim_at(now, validity, &params, &aggregation)?;

    let predicate = validate_claim(&claim.to_raw()?)?;
    validate_claim_type(&predicate, FUZZ_CLAIM_V1)?;
    claim.write_to(&args.output)?;

    let project = &aggregation.spec.per_project;
    info!(
        project = %params.project_name,
        output = %args.output.display(),
        "fuzz claim written"
    );
    println!(
        "Fuzz claim for {} at {}",
        params.project_name, aggregation.revision
    );
    println!("  targets:          {}", aggregation.spec.per_target.len());
    println!("  fuzz time (s):    {}", project.fuzz_time_seconds);
    println!("  fuzz tests:       {}", project.number_fuzz_tests);
    println!("  crashes detected: {}", project.detected_crashes);
    println!("  line coverage:    {}", project.line_coverage);
    println!("  branch coverage:  {}", project.branch_coverage);
    println!("Written to {}", args.output.display());
    Ok(())
}
