//! Error types for fuzz claim aggregation.

use provenant_intoto::ClaimError;

/// Errors from the fuzz claim aggregator.
#[derive(Debug, thiserror::Error)]
pub enum FuzzError {
    /// Failed to read or list a blob.
    #[error("blob store error for `{bucket}/{name}`: {source}")]
    Blob {
        /// Bucket name.
        bucket: String,
        /// Object name or prefix.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No blob exists at an expected path.
    #[error("no blob found at `{bucket}/{name}`")]
    NotFound {
        /// Bucket name.
        bucket: String,
        /// Object name.
        name: String,
    },

    /// An object name is absolute or steps outside its bucket.
    #[error("invalid object name `{name}` in bucket `{bucket}`")]
    InvalidObjectName {
        /// Bucket name.
        bucket: String,
        /// The rejected object name.
        name: String,
    },

    /// A blob is not valid JSON of the expected shape.
    #[error("failed to decode `{name}`: {source}")]
    Decode {
        /// Object name.
        name: String,
        /// The underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A coverage report has no totals entry.
    #[error("coverage report `{name}` has no totals")]
    MissingCoverageTotals {
        /// Object name.
        name: String,
    },

    /// No log file for the target mentions the revision.
    #[error("no log for target `{target}` mentions revision {revision}")]
    NoMatchingLog {
        /// Fuzz target name.
        target: String,
        /// Source revision hash.
        revision: String,
    },

    /// A matching log file lacks a statistic.
    #[error("log `{name}` has no `{field}` entry")]
    MissingLogField {
        /// Log object name.
        name: String,
        /// The missing marker.
        field: &'static str,
    },

    /// A log statistic is not a number.
    #[error("log `{name}` has a malformed `{field}` value `{value}`")]
    MalformedLogField {
        /// Log object name.
        name: String,
        /// The marker whose value is malformed.
        field: &'static str,
        /// The raw value.
        value: String,
    },

    /// A per-target step failed; the whole aggregation is abandoned.
    #[error("fuzz target `{target}`: {source}")]
    Target {
        /// Fuzz target name.
        target: String,
        /// The first error for this target.
        #[source]
        source: Box<FuzzError>,
    },

    /// Invalid fuzz parameters.
    #[error("invalid fuzz parameters `{path}`: {reason}")]
    Config {
        /// Path to the parameters file.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// A date is not in `YYYYMMDD` form.
    #[error("invalid date `{0}`: expected YYYYMMDD")]
    InvalidDate(String),

    /// Claim construction or validation failed.
    #[error(transparent)]
    Claim(#[from] ClaimError),
}

impl FuzzError {
    /// Annotate an error with the fuzz target it occurred for.
    #[must_use]
    pub fn for_target(self, target: &str) -> Self {
        Self::Target {
            target: target.to_owned(),
            source: Box::new(self),
        }
    }
}
