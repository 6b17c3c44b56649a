//! Coverage extraction from llvm-cov JSON summaries.

use serde::Deserialize;

use crate::blob::{Bucket, read_blob};
use crate::error::FuzzError;

/// One coverage counter from an llvm-cov summary.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CoverageCounter {
    /// Total instrumented items.
    pub count: u64,
    /// Items reached.
    pub covered: u64,
    /// Covered share in percent.
    pub percent: f64,
}

impl CoverageCounter {
    /// Render as `"P.PP% (covered/count)"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2}% ({}/{})", self.percent, self.covered, self.count)
    }
}

/// Line and branch coverage of a project or target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    /// Line coverage.
    pub lines: CoverageCounter,
    /// Branch coverage.
    pub branches: CoverageCounter,
}

#[derive(Deserialize)]
struct Summary {
    data: Vec<SummaryData>,
}

#[derive(Deserialize)]
struct SummaryData {
    totals: Option<Totals>,
}

#[derive(Deserialize)]
struct Totals {
    branches: CoverageCounter,
    lines: CoverageCounter,
}

/// Parse the totals of an llvm-cov summary. `name` identifies it in errors.
pub fn parse_coverage(bytes: &[u8], name: &str) -> Result<Coverage, FuzzError> {
    let summary: Summary = serde_json::from_slice(bytes).map_err(|source| FuzzError::Decode {
        name: name.to_owned(),
        source,
    })?;
    let totals = summary
        .data
        .into_iter()
        .find_map(|d| d.totals)
        .ok_or_else(|| FuzzError::MissingCoverageTotals {
            name: name.to_owned(),
        })?;
    Ok(Coverage {
        lines: totals.lines,
        branches: totals.branches,
    })
}

/// Fetch and parse the coverage summary at `object`.
pub fn fetch_coverage(bucket: &dyn Bucket, object: &str) -> Result<Coverage, FuzzError> {
    let bytes = read_blob(bucket, object)?;
    parse_coverage(&bytes, object)
}
