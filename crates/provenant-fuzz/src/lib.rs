//! Fuzzing claim aggregation.
//!
//! `provenant-fuzz` turns one day of OSS-Fuzz coverage reports and
//! ClusterFuzz logs into a fuzz claim about a project revision:
//! 1. **Revision**: look up the fuzzed commit in the day's source map
//! 2. **Per target**: coverage summary, fuzzing effort and crash detection
//!    from logs that mention the revision
//! 3. **Roll-up**: sum effort and OR crashes into the per-project record,
//!    then check the two agree
//!
//! Blobs are read through the [`blob::BlobStore`] capability.

pub mod aggregate;
pub mod blob;
pub mod claim;
pub mod config;
pub mod coverage;
pub mod error;
pub mod logs;
pub mod paths;
pub mod revision;

// Re-export primary types for convenience.
pub use aggregate::{FuzzAggregation, FuzzAggregator};
pub use blob::{BlobStore, LocalBlobStore};
pub use claim::{generate_fuzz_claim, generate_fuzz_claim_at};
pub use config::FuzzParameters;
pub use error::FuzzError;
