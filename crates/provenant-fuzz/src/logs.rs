//! Fuzzing effort and crash extraction from ClusterFuzz logs.
//!
//! Logs of several source revisions share a bucket prefix, so a log only
//! counts for a target when its content mentions the revision hash.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::blob::{Bucket, read_blob};
use crate::error::FuzzError;
use crate::paths::LOG_SUFFIX;

/// Marker preceding the fuzzing time in seconds.
pub const FUZZ_TIME_MARKER: &str = "Time ran:";

/// Marker preceding the number of executed fuzz tests.
pub const EXECUTED_UNITS_MARKER: &str = "stat::number_of_executed_units:";

fn fuzz_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Time ran:[ \t]*(\S+)").expect("fuzz time regex must compile"))
}

fn executed_units_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"stat::number_of_executed_units:[ \t]*(\S+)")
            .expect("executed units regex must compile")
    })
}

/// Fuzzing effort of one target, summed over its matching logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzEffort {
    /// Total fuzzing time in seconds.
    pub fuzz_time_seconds: f64,
    /// Total executed fuzz tests.
    pub number_fuzz_tests: u64,
    /// How many logs matched the revision.
    pub matching_logs: usize,
}

/// A fuzzer log that mentions the revision, as text.
struct MatchingLog {
    name: String,
    content: String,
}

/// Iterate the `.log` objects under `prefix` whose content contains `revision`.
fn matching_logs<'a>(
    bucket: &'a dyn Bucket,
    prefix: &str,
    revision: &'a str,
) -> Result<impl Iterator<Item = Result<MatchingLog, FuzzError>> + 'a, FuzzError> {
    let names = bucket.list(prefix)?;
    Ok(names
        .into_iter()
        .filter(|name| name.ends_with(LOG_SUFFIX))
        .filter_map(move |name| {
            let content = match read_blob(bucket, &name) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => return Some(Err(e)),
            };
            if content.contains(revision) {
                Some(Ok(MatchingLog { name, content }))
            } else {
                debug!(log = %name, revision, "skipping log for another revision");
                None
            }
        }))
}

fn first_token<'c>(re: &Regex, content: &'c str) -> Option<&'c str> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_field<T: std::str::FromStr>(
    log: &MatchingLog,
    re: &Regex,
    field: &'static str,
) -> Result<T, FuzzError> {
    let token = first_token(re, &log.content).ok_or_else(|| FuzzError::MissingLogField {
        name: log.name.clone(),
        field,
    })?;
    token.parse().map_err(|_| malformed(log, field, token))
}

fn malformed(log: &MatchingLog, field: &'static str, value: impl ToString) -> FuzzError {
    FuzzError::MalformedLogField {
        name: log.name.clone(),
        field,
        value: value.to_string(),
    }
}

/// Sum the fuzzing time and executed tests of every log under `prefix`
/// that mentions `revision`.
///
/// Fails with [`FuzzError::NoMatchingLog`] when no log mentions the
/// revision, so zero effort is never reported for missing data.
pub fn fuzz_effort(
    bucket: &dyn Bucket,
    prefix: &str,
    target: &str,
    revision: &str,
) -> Result<FuzzEffort, FuzzError> {
    let mut effort = FuzzEffort {
        fuzz_time_seconds: 0.0,
        number_fuzz_tests: 0,
        matching_logs: 0,
    };
    for log in matching_logs(bucket, prefix, revision)? {
        let log = log?;
        let time: f64 = parse_field(&log, fuzz_time_re(), FUZZ_TIME_MARKER)?;
        if !time.is_finite() || time < 0.0 {
            return Err(malformed(&log, FUZZ_TIME_MARKER, time));
        }
        let units: u64 = parse_field(&log, executed_units_re(), EXECUTED_UNITS_MARKER)?;
        debug!(log = %log.name, time, units, "counted fuzzer log");
        effort.fuzz_time_seconds += time;
        effort.number_fuzz_tests = effort
            .number_fuzz_tests
            .checked_add(units)
            .ok_or_else(|| malformed(&log, EXECUTED_UNITS_MARKER, units))?;
        effort.matching_logs += 1;
    }
    if effort.matching_logs == 0 {
        return Err(FuzzError::NoMatchingLog {
            target: target.to_owned(),
            revision: revision.to_owned(),
        });
    }
    Ok(effort)
}

/// Whether any log under `prefix` mentioning `revision` contains a crash
/// marker. Stops at the first crashing log in listing order.
pub fn detect_crash<S: AsRef<str>>(
    bucket: &dyn Bucket,
    prefix: &str,
    revision: &str,
    crash_markers: &[S],
) -> Result<bool, FuzzError> {
    for log in matching_logs(bucket, prefix, revision)? {
        let log = log?;
        if let Some(marker) = crash_markers
            .iter()
            .map(AsRef::as_ref)
            .find(|m| log.content.contains(m))
        {
            debug!(log = %log.name, marker, "crash detected");
            return Ok(true);
        }
    }
    Ok(false)
}
