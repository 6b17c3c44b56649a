//! Error types for statement parsing, claim validation, and provenance IR.

use std::fmt;

use chrono::{DateTime, Utc};

/// Errors from the in-toto statement and claim subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    /// Malformed JSON at the envelope or predicate level.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// Which layer was being decoded (e.g. `"statement"`, `"buildConfig"`).
        context: &'static str,
        /// The underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a statement or predicate.
    #[error("failed to serialize {context}: {source}")]
    Encode {
        /// What was being serialized.
        context: &'static str,
        /// The underlying encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The schema text itself is not a usable JSON Schema.
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),

    /// The document violates the provenance schema. Carries every violation.
    #[error("schema validation failed: {}", .errors.join("; "))]
    SchemaValidation {
        /// All violations reported by the schema validator.
        errors: Vec<String>,
    },

    /// Wrong subject count, missing digest, or wrong predicate/claim type.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// `issuedOn`/`notBefore`/`notAfter` ordering violation.
    #[error(transparent)]
    Temporal(#[from] TemporalError),

    /// Per-target and per-project fuzzing statistics disagree.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// The `predicateType` URI has no known payload type.
    #[error("unrecognized predicate type `{0}`")]
    UnrecognizedPredicateType(String),

    /// The `claimType` URI has no known claim spec type.
    #[error("unrecognized claim type `{0}`")]
    UnrecognizedClaimType(String),

    /// The provenance `buildType` has no extractor.
    #[error("unsupported build type `{0}`")]
    UnsupportedBuildType(String),

    /// A provenance IR accessor was called before the field was populated.
    #[error("{0} is not set on the provenance IR")]
    FieldNotSet(IrField),

    /// No material URI carries an `@sha256:` image digest.
    #[error("no material references a builder image digest (`@sha256:`)")]
    BuilderImageNotFound,

    /// A required element is absent from the document.
    #[error("{0} not found")]
    NotFound(String),

    /// I/O error while reading or writing a statement.
    #[error("statement I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Structural problems with a statement or its predicate.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    /// `predicateType` is not the one the caller expects.
    #[error("wrong predicate type: expected `{expected}`, got `{actual}`")]
    WrongPredicateType {
        /// Expected predicate type URI.
        expected: String,
        /// Actual predicate type URI.
        actual: String,
    },

    /// The predicate does not have the shape of the expected payload type.
    #[error("predicate does not match the expected shape: {0}")]
    WrongPredicateShape(String),

    /// An evidence URI is not an absolute URI.
    #[error("invalid evidence URI `{uri}`: {reason}")]
    InvalidEvidenceUri {
        /// The offending URI.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Wrong subject count or missing `sha256` digest.
    #[error("malformed subject: {0}")]
    MalformedSubject(String),

    /// `claimType` is not the one the caller expects.
    #[error("wrong claim type: expected `{expected}`, got `{actual}`")]
    WrongClaimType {
        /// Expected claim type URI.
        expected: String,
        /// Actual claim type URI.
        actual: String,
    },
}

/// Ordering violations between claim timestamps.
#[derive(Debug, thiserror::Error)]
pub enum TemporalError {
    /// `notBefore` lies before `issuedOn`.
    #[error("notBefore ({not_before}) precedes issuedOn ({issued_on})")]
    NotBeforePrecedesIssuance {
        /// The claim's `validity.notBefore`.
        not_before: DateTime<Utc>,
        /// The claim's `issuedOn`.
        issued_on: DateTime<Utc>,
    },

    /// `notAfter` is not strictly after `notBefore`.
    #[error("notAfter ({not_after}) is not after notBefore ({not_before})")]
    EmptyValidityWindow {
        /// The claim's `validity.notBefore`.
        not_before: DateTime<Utc>,
        /// The claim's `validity.notAfter`.
        not_after: DateTime<Utc>,
    },

    /// The claim is not yet in force at the given instant.
    #[error("claim is not valid before {not_before} (checked at {at})")]
    NotYetValid {
        /// The instant that was checked.
        at: DateTime<Utc>,
        /// The claim's `validity.notBefore`.
        not_before: DateTime<Utc>,
    },

    /// The claim has expired at the given instant.
    #[error("claim expired at {not_after} (checked at {at})")]
    Expired {
        /// The instant that was checked.
        at: DateTime<Utc>,
        /// The claim's `validity.notAfter`.
        not_after: DateTime<Utc>,
    },
}

/// A per-project fuzzing statistic is not the sum/union of its per-target values.
#[derive(Debug, thiserror::Error)]
#[error("perProject.{field} is {per_project} but the per-target total is {per_target_total}")]
pub struct ConsistencyError {
    /// The `FuzzStats` field name that disagrees.
    pub field: &'static str,
    /// Value computed from the per-target records.
    pub per_target_total: String,
    /// Value recorded in the per-project record.
    pub per_project: String,
}

/// Optional provenance IR fields, for [`ClaimError::FieldNotSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrField {
    /// The provenance `buildType`.
    BuildType,
    /// The build command.
    BuildCmd,
    /// The builder image SHA-256 digest.
    BuilderImageSha256Digest,
    /// Source-control repository URIs.
    RepoUris,
}

impl fmt::Display for IrField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BuildType => "buildType",
            Self::BuildCmd => "buildCmd",
            Self::BuilderImageSha256Digest => "builderImageSHA256Digest",
            Self::RepoUris => "repoURIs",
        })
    }
}
