//! Endorsement statement generation.
//!
//! An endorsement asserts that a binary, identified by its SHA-256 digest,
//! is approved for use during a validity window. The evidence is the set of
//! provenances an earlier verification step agreed on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::{CLAIM_V1, ClaimEvidence, ClaimPredicate, ClaimValidity, ENDORSEMENT_V2};
use crate::statement::{DigestSet, STATEMENT_TYPE, Statement, Subject};

/// Evidence role attached to every provenance in an endorsement.
pub const PROVENANCE_ROLE: &str = "Provenance";

/// A provenance file and the SHA-256 digest of its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceData {
    /// Where the provenance can be fetched.
    pub uri: String,
    /// SHA-256 of the provenance file.
    pub sha256_digest: String,
}

/// Provenances already verified to agree on one binary name and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedProvenanceSet {
    /// Name of the endorsed binary.
    pub binary_name: String,
    /// SHA-256 of the endorsed binary.
    pub binary_digest: String,
    /// The provenances backing the endorsement.
    pub provenances: Vec<ProvenanceData>,
}

/// An endorsement statement before it is reduced to its untyped form.
pub type EndorsementStatement = Statement<ClaimPredicate>;

/// Generate an endorsement issued now.
#[must_use]
pub fn generate_endorsement(
    validity: ClaimValidity,
    provenances: &VerifiedProvenanceSet,
) -> EndorsementStatement {
    generate_endorsement_at(Utc::now(), validity, provenances)
}

/// Generate an endorsement issued at `issued_on`.
///
/// Generation never checks the validity window; run the result through
/// [`crate::claims::validate_claim`] before persisting it.
#[must_use]
pub fn generate_endorsement_at(
    issued_on: DateTime<Utc>,
    validity: ClaimValidity,
    provenances: &VerifiedProvenanceSet,
) -> EndorsementStatement {
    let evidence = provenances
        .provenances
        .iter()
        .map(|p| ClaimEvidence {
            role: Some(PROVENANCE_ROLE.to_owned()),
            uri: p.uri.clone(),
            digest: DigestSet::from([("sha256".to_owned(), p.sha256_digest.clone())]),
        })
        .collect();

    Statement {
        statement_type: STATEMENT_TYPE.to_owned(),
        predicate_type: CLAIM_V1.to_owned(),
        subject: vec![Subject::sha256(
            provenances.binary_name.clone(),
            provenances.binary_digest.clone(),
        )],
        predicate: ClaimPredicate {
            claim_type: ENDORSEMENT_V2.to_owned(),
            claim_spec: None,
            issued_on,
            validity,
            evidence,
        },
    }
}
