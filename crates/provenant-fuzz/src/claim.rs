//! Fuzz claim statement generation.

use chrono::{DateTime, Utc};
use provenant_intoto::ClaimError;
use provenant_intoto::claims::{CLAIM_V1, ClaimPredicate, ClaimValidity, FUZZ_CLAIM_V1};
use provenant_intoto::fuzz::FuzzClaimSpec;
use provenant_intoto::statement::{DigestSet, STATEMENT_TYPE, Statement, Subject};

use crate::aggregate::FuzzAggregation;
use crate::config::FuzzParameters;
use crate::error::FuzzError;

/// A fuzz claim statement with a typed spec.
pub type FuzzClaimStatement = Statement<ClaimPredicate<FuzzClaimSpec>>;

/// Generate a fuzz claim issued now.
pub fn generate_fuzz_claim(
    validity: ClaimValidity,
    params: &FuzzParameters,
    aggregation: &FuzzAggregation,
) -> Result<FuzzClaimStatement, FuzzError> {
    generate_fuzz_claim_at(Utc::now(), validity, params, aggregation)
}

/// Generate a fuzz claim issued at `issued_on`.
///
/// The subject is the project repository at the fuzzed revision. The
/// statistics are checked for per-target/per-project consistency before
/// embedding.
pub fn generate_fuzz_claim_at(
    issued_on: DateTime<Utc>,
    validity: ClaimValidity,
    params: &FuzzParameters,
    aggregation: &FuzzAggregation,
) -> Result<FuzzClaimStatement, FuzzError> {
    aggregation.spec.validate().map_err(ClaimError::from)?;

    Ok(Statement {
        statement_type: STATEMENT_TYPE.to_owned(),
        predicate_type: CLAIM_V1.to_owned(),
        subject: vec![Subject {
            name: format!("git+{}", params.project_git_repo),
            digest: DigestSet::from([("sha1".to_owned(), aggregation.revision.clone())]),
        }],
        predicate: ClaimPredicate {
            claim_type: FUZZ_CLAIM_V1.to_owned(),
            claim_spec: Some(aggregation.spec.clone()),
            issued_on,
            validity,
            evidence: aggregation.evidence.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use provenant_intoto::claims::{ClaimSpec, validate_claim, validate_claim_type};
    use provenant_intoto::error::ConsistencyError;

    use super::*;
    use crate::aggregate::FuzzAggregator;
    use crate::aggregate::fixtures::{self, REVISION};
    use crate::blob::LocalBlobStore;

    fn aggregation() -> (FuzzParameters, FuzzAggregation) {
        let dir = tempfile::tempdir().expect("tempdir");
        fixtures::populate(dir.path());
        let store = LocalBlobStore::new(dir.path());
        let params = fixtures::params();
        let aggregation = FuzzAggregator::new(&store, &params)
            .aggregate()
            .expect("aggregate");
        (params, aggregation)
    }

    #[test]
    fn fuzz_claim_validates() {
        let (params, aggregation) = aggregation();
        let now = Utc::now();
        let statement = generate_fuzz_claim_at(
            now,
            ClaimValidity::from_offsets(now, 0, 30),
            &params,
            &aggregation,
        )
        .expect("generate");

        assert_eq!(statement.subject.len(), 1);
        assert_eq!(
            statement.subject[0].name,
            "git+https://github.com/project-oak/oak"
        );
        assert_eq!(statement.subject[0].digest["sha1"], REVISION);

        let raw = statement.to_raw().expect("to raw");
        let predicate = validate_claim(&raw).expect("valid claim");
        validate_claim_type(&predicate, FUZZ_CLAIM_V1).expect("fuzz claim type");
        match predicate.decode_spec().expect("decode spec") {
            ClaimSpec::Fuzz(spec) => assert_eq!(spec, aggregation.spec),
            ClaimSpec::Endorsement => panic!("expected fuzz spec"),
        }
    }

    #[test]
    fn inconsistent_spec_is_refused() {
        let (params, mut aggregation) = aggregation();
        aggregation.spec.per_project.number_fuzz_tests = 9;
        let now = Utc::now();
        let err = generate_fuzz_claim_at(
            now,
            ClaimValidity {
                not_before: now,
                not_after: now + Duration::days(1),
            },
            &params,
            &aggregation,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FuzzError::Claim(ClaimError::Consistency(ConsistencyError {
                field: "numberFuzzTests",
                ..
            }))
        ));
    }
}
