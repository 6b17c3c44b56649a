//! Generic claim predicates and their validation.
//!
//! A claim binds a typed assertion (`claimType` + `claimSpec`) to the
//! statement's subject for a bounded validity window, backed by evidence.
//! Validation is split in two stages: [`validate_claim`] checks invariants
//! shared by every claim type, [`validate_claim_type`] pins the claim type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClaimError, StructuralError, TemporalError};
use crate::fuzz::FuzzClaimSpec;
use crate::statement::{DigestSet, Statement};

/// Predicate type of a V1 claim.
pub const CLAIM_V1: &str = "https://github.com/project-oak/transparent-release/claim/v1";

/// Claim type of an endorsement.
pub const ENDORSEMENT_V2: &str = "https://github.com/project-oak/transparent-release/endorsement/v2";

/// Claim type of a fuzzing claim.
pub const FUZZ_CLAIM_V1: &str = "https://github.com/project-oak/transparent-release/fuzz_claim/v1";

/// The claim payload of a statement whose predicate type is [`CLAIM_V1`].
///
/// `S` is the `claimSpec` type; it stays an untyped JSON value until
/// [`ClaimPredicate::decode_spec`] selects one from `claimType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPredicate<S = serde_json::Value> {
    /// URI identifying the meaning of `claimSpec` and `evidence`.
    pub claim_type: String,
    /// Claim-type specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_spec: Option<S>,
    /// When the claim was issued.
    pub issued_on: DateTime<Utc>,
    /// The window during which the claim applies.
    pub validity: ClaimValidity,
    /// Artifacts supporting the truth of the claim.
    #[serde(default)]
    pub evidence: Vec<ClaimEvidence>,
}

/// Validity time range of an issued claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimValidity {
    /// From when the claim is effective.
    pub not_before: DateTime<Utc>,
    /// From when the claim no longer applies.
    pub not_after: DateTime<Utc>,
}

impl ClaimValidity {
    /// A window starting `not_before_days` and ending `not_after_days` after `now`.
    #[must_use]
    pub fn from_offsets(now: DateTime<Utc>, not_before_days: i64, not_after_days: i64) -> Self {
        Self {
            not_before: now + Duration::days(not_before_days),
            not_after: now + Duration::days(not_after_days),
        }
    }
}

/// Metadata about an artifact that serves as evidence for a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvidence {
    /// Role of this evidence within the claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Absolute URI of the evidence.
    pub uri: String,
    /// Digests of the evidence content.
    pub digest: DigestSet,
}

/// A `claimSpec` decoded according to its `claimType`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimSpec {
    /// Endorsements carry no spec.
    Endorsement,
    /// Per-target and per-project fuzzing statistics.
    Fuzz(FuzzClaimSpec),
}

impl ClaimPredicate {
    /// Decode `claimSpec` into the type registered for `claimType`.
    ///
    /// A fuzz claim's spec is checked for per-target/per-project consistency.
    pub fn decode_spec(&self) -> Result<ClaimSpec, ClaimError> {
        match self.claim_type.as_str() {
            ENDORSEMENT_V2 => Ok(ClaimSpec::Endorsement),
            FUZZ_CLAIM_V1 => {
                let value = self.claim_spec.clone().ok_or_else(|| {
                    StructuralError::WrongPredicateShape("fuzz claim has no claimSpec".to_owned())
                })?;
                let spec: FuzzClaimSpec =
                    serde_json::from_value(value).map_err(|source| ClaimError::Decode {
                        context: "claimSpec",
                        source,
                    })?;
                spec.validate()?;
                Ok(ClaimSpec::Fuzz(spec))
            }
            other => Err(ClaimError::UnrecognizedClaimType(other.to_owned())),
        }
    }
}

impl<S> ClaimPredicate<S> {
    /// Check that `at` lies inside `[notBefore, notAfter]`.
    pub fn check_applicable_at(&self, at: DateTime<Utc>) -> Result<(), TemporalError> {
        if at < self.validity.not_before {
            return Err(TemporalError::NotYetValid {
                at,
                not_before: self.validity.not_before,
            });
        }
        if at > self.validity.not_after {
            return Err(TemporalError::Expired {
                at,
                not_after: self.validity.not_after,
            });
        }
        Ok(())
    }
}

/// Check the invariants shared by every claim and return its predicate.
///
/// Checks run in order and stop at the first failure: predicate type,
/// predicate shape, evidence URIs, `notBefore >= issuedOn`, and
/// `notAfter > notBefore`.
pub fn validate_claim(statement: &Statement) -> Result<ClaimPredicate, ClaimError> {
    if statement.predicate_type != CLAIM_V1 {
        return Err(StructuralError::WrongPredicateType {
            expected: CLAIM_V1.to_owned(),
            actual: statement.predicate_type.clone(),
        }
        .into());
    }

    let predicate: ClaimPredicate = serde_json::from_value(statement.predicate.clone())
        .map_err(|e| StructuralError::WrongPredicateShape(e.to_string()))?;

    for evidence in &predicate.evidence {
        check_evidence_uri(&evidence.uri)?;
    }

    let ClaimValidity {
        not_before,
        not_after,
    } = predicate.validity;
    if not_before < predicate.issued_on {
        return Err(TemporalError::NotBeforePrecedesIssuance {
            not_before,
            issued_on: predicate.issued_on,
        }
        .into());
    }
    if not_after <= not_before {
        return Err(TemporalError::EmptyValidityWindow {
            not_before,
            not_after,
        }
        .into());
    }

    Ok(predicate)
}

/// Check that the predicate's `claimType` is `expected`.
pub fn validate_claim_type<S>(
    predicate: &ClaimPredicate<S>,
    expected: &str,
) -> Result<(), StructuralError> {
    if predicate.claim_type == expected {
        Ok(())
    } else {
        Err(StructuralError::WrongClaimType {
            expected: expected.to_owned(),
            actual: predicate.claim_type.clone(),
        })
    }
}

fn check_evidence_uri(uri: &str) -> Result<(), StructuralError> {
    let invalid = |reason: String| StructuralError::InvalidEvidenceUri {
        uri: uri.to_owned(),
        reason,
    };
    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    if parsed.scheme().is_empty() {
        return Err(invalid("missing scheme".to_owned()));
    }
    Ok(())
}
