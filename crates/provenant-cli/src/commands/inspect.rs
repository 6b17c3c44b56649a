//! The `provenant inspect` subcommand.
//!
//! Displays a claim statement in human-readable format.

use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::Result;
use provenant_verify::inspect;

/// Arguments for `provenant inspect`.
#[derive(Args)]
pub struct InspectArgs {
    /// Path to the claim statement JSON file.
    pub statement: PathBuf,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the inspect command.
pub fn execute(args: &InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.statement)?;
    let source = args.statement.display().to_string();
    let summary = inspect::summarize(&bytes, &source)?;

    if args.json {
        let output = serde_json::json!({
            "statementType": summary.statement_type,
            "predicateType": summary.predicate_type,
            "claimType": summary.claim_type,
            "subject": {
                "name": summary.subject_name,
                "digests": summary.subject_digests,
            },
            "issuedOn": summary.issued_on.to_rfc3339(),
            "validity": {
                "notBefore": summary.not_before.to_rfc3339(),
                "notAfter": summary.not_after.to_rfc3339(),
            },
            "evidenceCount": summary.evidence_count,
            "fuzzTargets": summary.fuzz_targets,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", inspect::format_summary(&summary));
    }

    Ok(())
}
