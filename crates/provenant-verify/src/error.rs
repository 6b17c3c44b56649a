//! Error types for the verification subsystem.

use provenant_intoto::ClaimError;

/// Errors from provenance verification and claim inspection.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// A provenance or claim failed to parse or validate.
    #[error("{path}: {source}")]
    Claim {
        /// The file being processed.
        path: String,
        /// The underlying claim error.
        #[source]
        source: ClaimError,
    },

    /// Two provenances disagree on the binary they describe.
    #[error("provenance `{path}` has {field} `{actual}`, but earlier provenances have `{expected}`")]
    ProvenanceMismatch {
        /// The provenance that disagrees.
        path: String,
        /// Which field differs.
        field: &'static str,
        /// Value shared by earlier provenances.
        expected: String,
        /// Value in this provenance.
        actual: String,
    },

    /// A provenance does not match a caller-supplied reference value.
    #[error("{field} mismatch: reference value is `{expected}`, provenance has `{actual}`")]
    ReferenceMismatch {
        /// Which reference value was checked.
        field: &'static str,
        /// The reference value.
        expected: String,
        /// The value from the provenance.
        actual: String,
    },

    /// No provenances were supplied.
    #[error("at least one provenance is required")]
    NoProvenances,

    /// A provenance path cannot be expressed as a `file://` URI.
    #[error("cannot build a file URI for `{0}`")]
    InvalidPath(String),

    /// I/O error during verification.
    #[error("verification I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
