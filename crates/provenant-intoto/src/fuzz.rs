//! Fuzzing claim specs: per-target statistics and their per-project roll-up.

use serde::{Deserialize, Serialize};

use crate::error::ConsistencyError;

/// Fuzzing statistics for one target or a whole project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzStats {
    /// Line coverage formatted as `"P.PP% (covered/count)"`.
    pub line_coverage: String,
    /// Branch coverage formatted as `"P.PP% (covered/count)"`.
    pub branch_coverage: String,
    /// Whether any crash was observed.
    pub detected_crashes: bool,
    /// Total fuzzing time in seconds.
    pub fuzz_time_seconds: f64,
    /// Number of executed fuzz tests.
    pub number_fuzz_tests: u64,
}

/// Statistics for one fuzz target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzSpecPerTarget {
    /// Fuzz target name.
    pub name: String,
    /// Source path of the fuzz target.
    pub path: String,
    /// Statistics for this target.
    #[serde(rename = "fuzzStats")]
    pub stats: FuzzStats,
}

/// The `claimSpec` of a fuzz claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzClaimSpec {
    /// Per-target statistics.
    pub per_target: Vec<FuzzSpecPerTarget>,
    /// Per-project roll-up.
    pub per_project: FuzzStats,
}

/// Effort totals derived from a set of per-target records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffortTotals {
    /// Sum of per-target fuzzing time.
    pub fuzz_time_seconds: f64,
    /// Sum of per-target executed tests.
    pub number_fuzz_tests: u64,
    /// Whether any target detected a crash.
    pub detected_crashes: bool,
}

impl EffortTotals {
    /// Sum times and test counts, and OR crash flags, across `per_target`.
    ///
    /// Returns `None` when the test counts overflow `u64`.
    pub fn of(per_target: &[FuzzSpecPerTarget]) -> Option<Self> {
        per_target.iter().try_fold(
            Self {
                fuzz_time_seconds: 0.0,
                number_fuzz_tests: 0,
                detected_crashes: false,
            },
            |acc, target| {
                Some(Self {
                    fuzz_time_seconds: acc.fuzz_time_seconds + target.stats.fuzz_time_seconds,
                    number_fuzz_tests: acc
                        .number_fuzz_tests
                        .checked_add(target.stats.number_fuzz_tests)?,
                    detected_crashes: acc.detected_crashes || target.stats.detected_crashes,
                })
            },
        )
    }

    fn checked(
        per_target: &[FuzzSpecPerTarget],
        per_project: impl FnOnce() -> String,
    ) -> Result<Self, ConsistencyError> {
        Self::of(per_target).ok_or_else(|| ConsistencyError {
            field: "numberFuzzTests",
            per_target_total: format!("more than {}", u64::MAX),
            per_project: per_project(),
        })
    }
}

impl FuzzClaimSpec {
    /// Build a spec whose per-project effort is the roll-up of `per_target`.
    ///
    /// Coverage is project-wide and comes from the project's own report,
    /// so it is passed in rather than derived. Fails when the per-target
    /// test counts do not fit in a `u64`.
    pub fn roll_up(
        per_target: Vec<FuzzSpecPerTarget>,
        line_coverage: String,
        branch_coverage: String,
    ) -> Result<Self, ConsistencyError> {
        let totals = EffortTotals::checked(&per_target, || "not yet rolled up".to_owned())?;
        Ok(Self {
            per_project: FuzzStats {
                line_coverage,
                branch_coverage,
                detected_crashes: totals.detected_crashes,
                fuzz_time_seconds: totals.fuzz_time_seconds,
                number_fuzz_tests: totals.number_fuzz_tests,
            },
            per_target,
        })
    }

    /// Check that `perProject` is exactly the sum/union of `perTarget`.
    ///
    /// Floating-point time is compared with exact equality.
    #[expect(
        clippy::float_cmp,
        reason = "roll-up and check sum in the same order, so exact equality holds"
    )]
    pub fn validate(&self) -> Result<(), ConsistencyError> {
        let project = &self.per_project;
        let totals = EffortTotals::checked(&self.per_target, || {
            project.number_fuzz_tests.to_string()
        })?;

        if totals.fuzz_time_seconds != project.fuzz_time_seconds {
            return Err(ConsistencyError {
                field: "fuzzTimeSeconds",
                per_target_total: totals.fuzz_time_seconds.to_string(),
                per_project: project.fuzz_time_seconds.to_string(),
            });
        }
        if totals.number_fuzz_tests != project.number_fuzz_tests {
            return Err(ConsistencyError {
                field: "numberFuzzTests",
                per_target_total: totals.number_fuzz_tests.to_string(),
                per_project: project.number_fuzz_tests.to_string(),
            });
        }
        if totals.detected_crashes != project.detected_crashes {
            return Err(ConsistencyError {
                field: "detectedCrashes",
                per_target_total: totals.detected_crashes.to_string(),
                per_project: project.detected_crashes.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(time: f64, tests: u64, crashes: bool) -> FuzzStats {
        FuzzStats {
            line_coverage: "10.00% (1/10)".to_owned(),
            branch_coverage: "5.00% (1/20)".to_owned(),
            detected_crashes: crashes,
            fuzz_time_seconds: time,
            number_fuzz_tests: tests,
        }
    }

    fn target(name: &str, time: f64, tests: u64, crashes: bool) -> FuzzSpecPerTarget {
        FuzzSpecPerTarget {
            name: name.to_owned(),
            path: format!("fuzz/fuzz_targets/{name}.rs"),
            stats: stats(time, tests, crashes),
        }
    }

    fn two_targets() -> FuzzClaimSpec {
        FuzzClaimSpec {
            per_target: vec![target("a", 10.0, 5, false), target("b", 7.0, 3, true)],
            per_project: stats(17.0, 8, true),
        }
    }

    #[test]
    fn consistent_spec_validates() {
        two_targets().validate().expect("consistent");
    }

    #[test]
    fn test_count_mismatch_cites_both_values() {
        let mut spec = two_targets();
        spec.per_project.number_fuzz_tests = 9;
        let err = spec.validate().unwrap_err();
        assert_eq!(err.field, "numberFuzzTests");
        assert_eq!(err.per_target_total, "8");
        assert_eq!(err.per_project, "9");
        let message = err.to_string();
        assert!(message.contains('8') && message.contains('9'), "{message}");
    }

    #[test]
    fn crash_union_mismatch() {
        let mut spec = two_targets();
        spec.per_project.detected_crashes = false;
        assert_eq!(spec.validate().unwrap_err().field, "detectedCrashes");
    }

    #[test]
    fn roll_up_is_consistent() {
        let spec = FuzzClaimSpec::roll_up(
            vec![target("a", 10.5, 5, false), target("b", 0.25, 3, false)],
            "1.00% (1/100)".to_owned(),
            "2.00% (2/100)".to_owned(),
        )
        .expect("roll up");
        assert_eq!(spec.per_project.number_fuzz_tests, 8);
        assert!(!spec.per_project.detected_crashes);
        assert_eq!(spec.per_project.line_coverage, "1.00% (1/100)");
        spec.validate().expect("roll-up is consistent");
    }

    #[test]
    fn overflowing_test_counts_are_inconsistent() {
        let spec = FuzzClaimSpec {
            per_target: vec![
                target("a", 1.0, u64::MAX, false),
                target("b", 1.0, 1, false),
            ],
            per_project: stats(2.0, 0, false),
        };
        let err = spec.validate().unwrap_err();
        assert_eq!(err.field, "numberFuzzTests");
        assert_eq!(err.per_project, "0");
        assert!(err.per_target_total.starts_with("more than"));
    }

    #[test]
    fn roll_up_refuses_overflowing_test_counts() {
        let err = FuzzClaimSpec::roll_up(
            vec![target("a", 1.0, u64::MAX, false), target("b", 1.0, 1, false)],
            String::new(),
            String::new(),
        )
        .unwrap_err();
        assert_eq!(err.field, "numberFuzzTests");
    }

    #[test]
    fn wire_field_names() {
        let value = serde_json::to_value(two_targets()).unwrap();
        assert!(value["perProject"]["fuzzTimeSeconds"].is_number());
        assert!(value["perTarget"][0]["fuzzStats"]["numberFuzzTests"].is_number());
        assert_eq!(value["perTarget"][1]["fuzzStats"]["detectedCrashes"], true);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_targets() -> impl Strategy<Value = Vec<FuzzSpecPerTarget>> {
            prop::collection::vec((0u32..100_000, 0u64..1_000_000, any::<bool>()), 0..8).prop_map(
                |entries| {
                    entries
                        .into_iter()
                        .enumerate()
                        .map(|(i, (time, tests, crashes))| {
                            target(&format!("t{i}"), f64::from(time) / 8.0, tests, crashes)
                        })
                        .collect()
                },
            )
        }

        proptest! {
            /// Any roll-up validates against its own per-target records.
            #[test]
            fn roll_up_always_validates(targets in arb_targets()) {
                let spec = FuzzClaimSpec::roll_up(targets, String::new(), String::new())
                    .expect("roll up");
                prop_assert!(spec.validate().is_ok());
            }

            /// Perturbing the per-project time always fails validation.
            #[test]
            fn perturbed_time_is_inconsistent(targets in arb_targets(), delta in 1u32..1000) {
                let mut spec = FuzzClaimSpec::roll_up(targets, String::new(), String::new())
                    .expect("roll up");
                spec.per_project.fuzz_time_seconds += f64::from(delta);
                let err = spec.validate().unwrap_err();
                prop_assert_eq!(err.field, "fuzzTimeSeconds");
            }
        }
    }
}
