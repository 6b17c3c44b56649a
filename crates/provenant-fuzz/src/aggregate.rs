//! Per-target and per-project fuzzing statistics.
//!
//! Targets are processed one at a time. Each target's coverage, effort and
//! crash flag are fetched into its own record; the records are combined
//! only at the roll-up, which is then checked for consistency.

use provenant_intoto::ClaimError;
use provenant_intoto::claims::ClaimEvidence;
use provenant_intoto::fuzz::{FuzzClaimSpec, FuzzSpecPerTarget, FuzzStats};
use provenant_intoto::statement::DigestSet;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::blob::{BlobStore, Bucket, read_blob};
use crate::config::{FuzzParameters, FuzzTarget};
use crate::coverage::{fetch_coverage, parse_coverage};
use crate::error::FuzzError;
use crate::logs::{detect_crash, fuzz_effort};
use crate::paths::{
    COVERAGE_BUCKET, LogLocation, gs_uri, logs_bucket, project_coverage_path,
    target_coverage_path,
};
use crate::revision::fetch_revision;

/// Evidence role of the project coverage summary.
pub const COVERAGE_SUMMARY_ROLE: &str = "Project coverage summary";

/// Evidence role of the fuzzer log bucket.
pub const FUZZER_LOGS_ROLE: &str = "Fuzzer logs";

/// The outcome of aggregating one project's fuzzing day.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzAggregation {
    /// The fuzzed source revision.
    pub revision: String,
    /// Consistent per-target and per-project statistics.
    pub spec: FuzzClaimSpec,
    /// Where the statistics came from.
    pub evidence: Vec<ClaimEvidence>,
}

/// Aggregates fuzzing statistics from a blob store.
pub struct FuzzAggregator<'a> {
    store: &'a dyn BlobStore,
    params: &'a FuzzParameters,
}

impl<'a> FuzzAggregator<'a> {
    /// Create an aggregator reading from `store`.
    #[must_use]
    pub const fn new(store: &'a dyn BlobStore, params: &'a FuzzParameters) -> Self {
        Self { store, params }
    }

    /// Fetch every target's statistics, roll them up and check the result.
    ///
    /// The first failing target aborts the aggregation; its error is
    /// wrapped in [`FuzzError::Target`].
    pub fn aggregate(&self) -> Result<FuzzAggregation, FuzzError> {
        let params = self.params;
        let coverage = self.store.bucket(COVERAGE_BUCKET)?;
        let logs_bucket_name = logs_bucket(&params.project_name);
        let logs = self.store.bucket(&logs_bucket_name)?;

        let revision = fetch_revision(coverage.as_ref(), &params.project_name, params.date)?;
        info!(project = %params.project_name, %revision, "aggregating fuzz claim");

        let per_target = params
            .targets
            .iter()
            .map(|target| {
                self.target_stats(coverage.as_ref(), logs.as_ref(), target, &revision)
                    .map_err(|e| e.for_target(&target.name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let summary_path = project_coverage_path(&params.project_name, params.date);
        let summary = read_blob(coverage.as_ref(), &summary_path)?;
        let project_coverage = parse_coverage(&summary, &summary_path)?;

        let spec = FuzzClaimSpec::roll_up(
            per_target,
            project_coverage.lines.display(),
            project_coverage.branches.display(),
        )
        .map_err(ClaimError::from)?;
        spec.validate().map_err(ClaimError::from)?;
        info!(
            project = %params.project_name,
            targets = spec.per_target.len(),
            fuzz_time_seconds = spec.per_project.fuzz_time_seconds,
            detected_crashes = spec.per_project.detected_crashes,
            "fuzz statistics rolled up"
        );

        let evidence = vec![
            ClaimEvidence {
                role: Some(COVERAGE_SUMMARY_ROLE.to_owned()),
                uri: gs_uri(COVERAGE_BUCKET, &summary_path),
                digest: DigestSet::from([(
                    "sha256".to_owned(),
                    hex::encode(Sha256::digest(&summary)),
                )]),
            },
            ClaimEvidence {
                role: Some(FUZZER_LOGS_ROLE.to_owned()),
                uri: format!("gs://{logs_bucket_name}"),
                digest: DigestSet::new(),
            },
        ];

        Ok(FuzzAggregation {
            revision,
            spec,
            evidence,
        })
    }

    fn target_stats(
        &self,
        coverage: &dyn Bucket,
        logs: &dyn Bucket,
        target: &FuzzTarget,
        revision: &str,
    ) -> Result<FuzzSpecPerTarget, FuzzError> {
        let params = self.params;
        let target_coverage = fetch_coverage(
            coverage,
            &target_coverage_path(&params.project_name, params.date, &target.name),
        )?;

        let prefix = LogLocation {
            fuzz_engine: &params.fuzz_engine,
            project: &params.project_name,
            target: &target.name,
            sanitizer: &params.sanitizer,
            date: params.date,
        }
        .prefix();
        let effort = fuzz_effort(logs, &prefix, &target.name, revision)?;
        let detected_crashes = detect_crash(logs, &prefix, revision, &params.crash_markers)?;

        info!(
            target = %target.name,
            logs = effort.matching_logs,
            fuzz_time_seconds = effort.fuzz_time_seconds,
            number_fuzz_tests = effort.number_fuzz_tests,
            detected_crashes,
            "fuzz target processed"
        );
        Ok(FuzzSpecPerTarget {
            name: target.name.clone(),
            path: target.path.clone(),
            stats: FuzzStats {
                line_coverage: target_coverage.lines.display(),
                branch_coverage: target_coverage.branches.display(),
                detected_crashes,
                fuzz_time_seconds: effort.fuzz_time_seconds,
                number_fuzz_tests: effort.number_fuzz_tests,
            },
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{self, REVISION};
    use super::*;
    use crate::blob::LocalBlobStore;

    fn aggregate_fixture() -> Result<FuzzAggregation, FuzzError> {
        let dir = tempfile::tempdir().expect("tempdir");
        fixtures::populate(dir.path());
        let store = LocalBlobStore::new(dir.path());
        let params = fixtures::params();
        FuzzAggregator::new(&store, &params).aggregate()
    }

    #[test]
    fn aggregates_targets_and_rolls_up() {
        let result = aggregate_fixture().expect("aggregate");
        assert_eq!(result.revision, REVISION);

        let spec = &result.spec;
        assert_eq!(spec.per_target.len(), 2);
        assert_eq!(spec.per_target[0].name, "apply_policy");
        assert!((spec.per_target[0].stats.fuzz_time_seconds - 10.0).abs() < f64::EPSILON);
        assert_eq!(spec.per_target[0].stats.number_fuzz_tests, 5);
        assert!(!spec.per_target[0].stats.detected_crashes);
        assert_eq!(spec.per_target[0].stats.line_coverage, "25.00% (100/400)");
        assert!(spec.per_target[1].stats.detected_crashes);

        assert!((spec.per_project.fuzz_time_seconds - 17.0).abs() < f64::EPSILON);
        assert_eq!(spec.per_project.number_fuzz_tests, 8);
        assert!(spec.per_project.detected_crashes);
        assert_eq!(spec.per_project.line_coverage, "33.30% (333/1000)");
        assert_eq!(spec.per_project.branch_coverage, "20.50% (41/200)");
        spec.validate().expect("rolled-up spec is consistent");
    }

    #[test]
    fn evidence_names_coverage_summary_and_logs() {
        let result = aggregate_fixture().expect("aggregate");
        assert_eq!(result.evidence.len(), 2);
        assert_eq!(
            result.evidence[0].uri,
            "gs://oss-fuzz-coverage/oak/reports/20230115/linux/summary.json"
        );
        assert_eq!(result.evidence[0].digest["sha256"].len(), 64);
        assert_eq!(
            result.evidence[1].uri,
            "gs://oak-logs.clusterfuzz-external.appspot.com"
        );
        assert_eq!(result.evidence[1].role.as_deref(), Some(FUZZER_LOGS_ROLE));
    }

    #[test]
    fn first_failing_target_aborts() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixtures::populate(dir.path());
        std::fs::remove_dir_all(dir.path().join(
            "oak-logs.clusterfuzz-external.appspot.com/libFuzzer_oak_wasm_invoke",
        ))
        .expect("remove logs");
        let store = LocalBlobStore::new(dir.path());
        let params = fixtures::params();

        let err = FuzzAggregator::new(&store, &params).aggregate().unwrap_err();
        match err {
            FuzzError::Target { target, source } => {
                assert_eq!(target, "wasm_invoke");
                assert!(matches!(*source, FuzzError::NoMatchingLog { .. }));
            }
            other => panic!("expected target error, got {other}"),
        }
    }

    #[test]
    fn missing_target_coverage_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        fixtures::populate(dir.path());
        std::fs::remove_file(
            dir.path()
                .join("oss-fuzz-coverage/oak/fuzzer_stats/20230115/apply_policy.json"),
        )
        .expect("remove coverage");
        let store = LocalBlobStore::new(dir.path());
        let params = fixtures::params();

        let err = FuzzAggregator::new(&store, &params).aggregate().unwrap_err();
        assert!(
            matches!(&err, FuzzError::Target { source, .. } if matches!(**source, FuzzError::NotFound { .. })),
            "{err}"
        );
    }
}
