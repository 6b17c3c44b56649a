//! OSS-Fuzz and ClusterFuzz blob path conventions.
//!
//! Coverage artifacts live in one shared bucket and use `YYYYMMDD` dates.
//! Fuzzer logs live in a per-project bucket and use `YYYY-MM-DD` dates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FuzzError;

/// Bucket holding coverage reports and source revision maps.
pub const COVERAGE_BUCKET: &str = "oss-fuzz-coverage";

/// Suffix of fuzzer log objects.
pub const LOG_SUFFIX: &str = ".log";

/// A fuzzing day, written `YYYYMMDD` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FuzzDate(NaiveDate);

impl FuzzDate {
    /// Wrap a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYYMMDD` date.
    pub fn parse_compact(text: &str) -> Result<Self, FuzzError> {
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FuzzError::InvalidDate(text.to_owned()));
        }
        NaiveDate::parse_from_str(text, "%Y%m%d")
            .map(Self)
            .map_err(|_| FuzzError::InvalidDate(text.to_owned()))
    }

    /// The date as `YYYYMMDD`.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// The date as `YYYY-MM-DD`.
    #[must_use]
    pub fn dashed(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for FuzzDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

impl FromStr for FuzzDate {
    type Err = FuzzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_compact(s)
    }
}

impl Serialize for FuzzDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.compact())
    }
}

impl<'de> Deserialize<'de> for FuzzDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_compact(&text).map_err(serde::de::Error::custom)
    }
}

/// Project-wide coverage summary: `{project}/reports/{YYYYMMDD}/linux/summary.json`.
#[must_use]
pub fn project_coverage_path(project: &str, date: FuzzDate) -> String {
    format!("{project}/reports/{}/linux/summary.json", date.compact())
}

/// Per-target coverage summary: `{project}/fuzzer_stats/{YYYYMMDD}/{target}.json`.
#[must_use]
pub fn target_coverage_path(project: &str, date: FuzzDate, target: &str) -> String {
    format!("{project}/fuzzer_stats/{}/{target}.json", date.compact())
}

/// Source revision map: `{project}/srcmap/{YYYYMMDD}.json`.
#[must_use]
pub fn srcmap_path(project: &str, date: FuzzDate) -> String {
    format!("{project}/srcmap/{}.json", date.compact())
}

/// Key of the project's own checkout inside a source revision map.
#[must_use]
pub fn srcmap_key(project: &str) -> String {
    format!("/src/{project}")
}

/// ClusterFuzz log bucket for a project.
#[must_use]
pub fn logs_bucket(project: &str) -> String {
    format!("{project}-logs.clusterfuzz-external.appspot.com")
}

/// Identifies one target's fuzzer logs for one day.
#[derive(Debug, Clone, Copy)]
pub struct LogLocation<'a> {
    /// Fuzzing engine, e.g. `libFuzzer`.
    pub fuzz_engine: &'a str,
    /// OSS-Fuzz project name.
    pub project: &'a str,
    /// Fuzz target name.
    pub target: &'a str,
    /// Sanitizer, e.g. `asan`.
    pub sanitizer: &'a str,
    /// Fuzzing day.
    pub date: FuzzDate,
}

impl LogLocation<'_> {
    /// Object prefix of the logs:
    /// `{engine}_{project}_{target}/{lower(engine)}_{sanitizer}_{project}/{YYYY-MM-DD}`.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!(
            "{engine}_{project}_{target}/{lower}_{sanitizer}_{project}/{day}",
            engine = self.fuzz_engine,
            project = self.project,
            target = self.target,
            lower = self.fuzz_engine.to_lowercase(),
            sanitizer = self.sanitizer,
            day = self.date.dashed(),
        )
    }
}

/// A `gs://` URI for an object.
#[must_use]
pub fn gs_uri(bucket: &str, object: &str) -> String {
    format!("gs://{bucket}/{object}")
}
