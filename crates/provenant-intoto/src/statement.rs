//! in-toto v0.1 attestation statement envelope and codec.
//!
//! The envelope is decoded in two phases: first generically, leaving the
//! predicate as an untyped JSON value, then into a concrete predicate type
//! selected by `predicateType`.
//!
//! See: <https://github.com/in-toto/attestation/blob/main/spec/v0.1.0/statement.md>

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::claims::{CLAIM_V1, ClaimPredicate};
use crate::error::{ClaimError, StructuralError};
use crate::provenance::{SLSA_PROVENANCE_V02, SlsaPredicate};

/// The in-toto statement type URI. Constant for every predicate type.
pub const STATEMENT_TYPE: &str = "https://in-toto.io/Statement/v0.1";

/// A map from algorithm name (e.g. `sha256`, `sha1`) to lowercase hex digest.
pub type DigestSet = BTreeMap<String, String>;

/// An artifact identified by its name and a set of digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Artifact name.
    pub name: String,
    /// Content digests.
    pub digest: DigestSet,
}

impl Subject {
    /// Create a subject with a single `sha256` digest.
    pub fn sha256(name: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            digest: DigestSet::from([("sha256".to_owned(), digest.into())]),
        }
    }

    /// The non-empty `sha256` digest, if present.
    pub fn sha256_digest(&self) -> Option<&str> {
        self.digest
            .get("sha256")
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }
}

/// A statement binding a predicate to one or more subjects.
///
/// `P` defaults to an untyped JSON value; that is the phase-one decode result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement<P = serde_json::Value> {
    /// Always [`STATEMENT_TYPE`] for statements this crate produces.
    #[serde(rename = "_type")]
    pub statement_type: String,
    /// URI selecting how `predicate` is interpreted.
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
    /// The artifacts the statement is about.
    pub subject: Vec<Subject>,
    /// The predicate payload.
    pub predicate: P,
}

/// A predicate decoded according to its `predicateType`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A SLSA v0.2 build provenance record.
    SlsaProvenance(Box<SlsaPredicate>),
    /// A generic claim (endorsement, fuzz claim, ...).
    Claim(ClaimPredicate),
}

/// Decode raw bytes into a statement whose predicate is still untyped.
pub fn parse_statement(bytes: &[u8]) -> Result<Statement, ClaimError> {
    serde_json::from_slice(bytes).map_err(|source| ClaimError::Decode {
        context: "statement",
        source,
    })
}

/// Read and decode a statement from a file.
pub fn read_statement(path: &Path) -> Result<Statement, ClaimError> {
    let bytes = std::fs::read(path)?;
    parse_statement(&bytes)
}

impl Statement {
    /// Phase-two decode: re-encode the untyped predicate into `T`.
    pub fn decode_predicate_as<T: DeserializeOwned>(&self) -> Result<T, ClaimError> {
        serde_json::from_value(self.predicate.clone()).map_err(|source| ClaimError::Decode {
            context: "predicate",
            source,
        })
    }

    /// Decode the predicate into the payload type registered for `predicateType`.
    pub fn decode_predicate(&self) -> Result<Predicate, ClaimError> {
        match self.predicate_type.as_str() {
            SLSA_PROVENANCE_V02 => Ok(Predicate::SlsaProvenance(Box::new(
                self.decode_predicate_as()?,
            ))),
            CLAIM_V1 => Ok(Predicate::Claim(self.decode_predicate_as()?)),
            other => Err(ClaimError::UnrecognizedPredicateType(other.to_owned())),
        }
    }
}

impl<P> Statement<P> {
    /// The single subject of this statement, which must carry a `sha256` digest.
    pub fn sole_subject(&self) -> Result<&Subject, StructuralError> {
        let [subject] = self.subject.as_slice() else {
            return Err(StructuralError::MalformedSubject(format!(
                "expected exactly one subject, found {}",
                self.subject.len()
            )));
        };
        if subject.sha256_digest().is_none() {
            return Err(StructuralError::MalformedSubject(format!(
                "subject `{}` has no sha256 digest",
                subject.name
            )));
        }
        Ok(subject)
    }
}

impl<P: Serialize> Statement<P> {
    /// Convert a typed statement back into its untyped form.
    pub fn to_raw(&self) -> Result<Statement, ClaimError> {
        let predicate =
            serde_json::to_value(&self.predicate).map_err(|source| ClaimError::Encode {
                context: "predicate",
                source,
            })?;
        Ok(Statement {
            statement_type: self.statement_type.clone(),
            predicate_type: self.predicate_type.clone(),
            subject: self.subject.clone(),
            predicate,
        })
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String, ClaimError> {
        let mut json = serde_json::to_string_pretty(self).map_err(|source| ClaimError::Encode {
            context: "statement",
            source,
        })?;
        json.push('\n');
        Ok(json)
    }

    /// Write the statement to `path` as pretty-printed JSON (mode `0644` on Unix).
    pub fn write_to(&self, path: &Path) -> Result<(), ClaimError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))?;
        }
        Ok(())
    }
}
