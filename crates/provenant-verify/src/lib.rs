//! Verification of provenances and inspection of claims.
//!
//! `provenant-verify` turns a set of provenance files into a verified
//! provenance set ready for endorsement, and renders claim statements
//! for humans.
//!
//! Verification has three steps per provenance:
//! 1. **Schema**: JSON Schema check with every violation reported
//! 2. **IR**: subject and build-type specific extraction
//! 3. **Agreement**: same binary name and digest across the set, plus
//!    any pinned reference values

pub mod digest;
pub mod error;
pub mod inspect;
pub mod verify;

// Re-export primary types for convenience.
pub use error::VerificationError;
pub use verify::{ProvenanceInput, ProvenanceVerifier, ReferenceValues};
