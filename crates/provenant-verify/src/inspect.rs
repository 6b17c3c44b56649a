//! Human-readable claim display.
//!
//! Extracts key fields from a claim statement and formats them for
//! terminal display.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use provenant_intoto::claims::{ClaimSpec, validate_claim};
use provenant_intoto::statement::parse_statement;

use crate::error::VerificationError;

/// Extracted summary of a claim statement.
#[derive(Debug)]
pub struct ClaimSummary {
    /// The in-toto statement type URI.
    pub statement_type: String,
    /// The predicate type URI.
    pub predicate_type: String,
    /// The claim type URI.
    pub claim_type: String,
    /// Subject name.
    pub subject_name: String,
    /// Subject digests as `algorithm:hex`.
    pub subject_digests: Vec<String>,
    /// When the claim was issued.
    pub issued_on: DateTime<Utc>,
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
    /// Number of evidence entries.
    pub evidence_count: usize,
    /// Fuzz targets covered, for fuzz claims.
    pub fuzz_targets: Option<usize>,
}

/// Validate a claim statement and extract its summary.
pub fn summarize(bytes: &[u8], source: &str) -> Result<ClaimSummary, VerificationError> {
    let claim_error = |source_err| VerificationError::Claim {
        path: source.to_owned(),
        source: source_err,
    };

    let statement = parse_statement(bytes).map_err(claim_error)?;
    let predicate = validate_claim(&statement).map_err(claim_error)?;
    let fuzz_targets = match predicate.decode_spec().map_err(claim_error)? {
        ClaimSpec::Fuzz(spec) => Some(spec.per_target.len()),
        ClaimSpec::Endorsement => None,
    };

    let subject = statement.subject.first();
    Ok(ClaimSummary {
        statement_type: statement.statement_type.clone(),
        predicate_type: statement.predicate_type.clone(),
        claim_type: predicate.claim_type.clone(),
        subject_name: subject.map(|s| s.name.clone()).unwrap_or_default(),
        subject_digests: subject
            .map(|s| s.digest.iter().map(|(k, v)| format!("{k}:{v}")).collect())
            .unwrap_or_default(),
        issued_on: predicate.issued_on,
        not_before: predicate.validity.not_before,
        not_after: predicate.validity.not_after,
        evidence_count: predicate.evidence.len(),
        fuzz_targets,
    })
}

/// Format a summary as a human-readable string.
pub fn format_summary(summary: &ClaimSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Claim Summary");
    let _ = writeln!(out, "-------------");
    let _ = writeln!(out, "Statement type:  {}", summary.statement_type);
    let _ = writeln!(out, "Predicate type:  {}", summary.predicate_type);
    let _ = writeln!(out, "Claim type:      {}", summary.claim_type);
    let _ = writeln!(out, "Subject:         {}", summary.subject_name);
    for digest in &summary.subject_digests {
        let _ = writeln!(out, "  digest:        {digest}");
    }
    let _ = writeln!(out, "Issued on:       {}", summary.issued_on.to_rfc3339());
    let _ = writeln!(out, "Not before:      {}", summary.not_before.to_rfc3339());
    let _ = writeln!(out, "Not after:       {}", summary.not_after.to_rfc3339());
    let _ = writeln!(out, "Evidence:        {}", summary.evidence_count);
    if let Some(targets) = summary.fuzz_targets {
        let _ = writeln!(out, "Fuzz targets:    {targets}");
    }
    out
}
