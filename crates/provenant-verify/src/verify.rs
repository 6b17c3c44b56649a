//! Verification of a set of provenances describing one binary.
//!
//! Every provenance is schema-checked and parsed into a provenance IR.
//! The set passes only if all IRs name the same binary with the same
//! digest and match any reference values the caller pins.

use std::path::Path;

use provenant_intoto::endorsement::{ProvenanceData, VerifiedProvenanceSet};
use provenant_intoto::provenance::{ProvenanceIr, parse_provenance_file};
use provenant_intoto::schema::ProvenanceSchema;
use tracing::{debug, info};
use url::Url;

use crate::digest;
use crate::error::VerificationError;

/// Reference values every provenance must match. Absent values are not checked.
#[derive(Debug, Clone, Default)]
pub struct ReferenceValues {
    /// Expected SHA-256 of the binary.
    pub binary_sha256_digest: Option<String>,
    /// Expected SHA-256 of the builder image.
    pub builder_image_sha256_digest: Option<String>,
}

/// A provenance document and the URI it was loaded from.
#[derive(Debug, Clone)]
pub struct ProvenanceInput {
    /// Absolute URI of the provenance.
    pub uri: String,
    /// Raw provenance bytes.
    pub bytes: Vec<u8>,
}

impl ProvenanceInput {
    /// Load a provenance from disk, addressing it by its `file://` URI.
    pub fn from_file(path: &Path) -> Result<Self, VerificationError> {
        let absolute = std::fs::canonicalize(path)?;
        let uri = Url::from_file_path(&absolute)
            .map_err(|()| VerificationError::InvalidPath(path.display().to_string()))?;
        Ok(Self {
            uri: uri.to_string(),
            bytes: std::fs::read(&absolute)?,
        })
    }
}

/// Verifies provenances against a schema and reference values.
pub struct ProvenanceVerifier<'a> {
    schema: &'a ProvenanceSchema,
    references: ReferenceValues,
}

impl<'a> ProvenanceVerifier<'a> {
    /// Create a verifier using a caller-compiled schema.
    pub const fn new(schema: &'a ProvenanceSchema, references: ReferenceValues) -> Self {
        Self { schema, references }
    }

    /// Verify provenance files on disk.
    pub fn verify_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<VerifiedProvenanceSet, VerificationError> {
        let inputs = paths
            .iter()
            .map(|p| ProvenanceInput::from_file(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.verify(&inputs)
    }

    /// Verify that `inputs` all describe the same binary.
    pub fn verify(
        &self,
        inputs: &[ProvenanceInput],
    ) -> Result<VerifiedProvenanceSet, VerificationError> {
        let mut binary: Option<(String, String)> = None;
        let mut provenances = Vec::with_capacity(inputs.len());

        for input in inputs {
            let ir = parse_provenance_file(&input.bytes, self.schema).map_err(|source| {
                VerificationError::Claim {
                    path: input.uri.clone(),
                    source,
                }
            })?;
            self.check_references(&input.uri, &ir)?;

            match &binary {
                None => {
                    binary = Some((
                        ir.binary_name().to_owned(),
                        ir.binary_sha256_digest().to_owned(),
                    ));
                }
                Some((name, digest)) => {
                    check_agrees(&input.uri, "binary name", name, ir.binary_name())?;
                    check_agrees(&input.uri, "binary digest", digest, ir.binary_sha256_digest())?;
                }
            }

            debug!(uri = %input.uri, binary = %ir.binary_name(), "provenance verified");
            provenances.push(ProvenanceData {
                uri: input.uri.clone(),
                sha256_digest: digest::sha256_bytes(&input.bytes),
            });
        }

        let (binary_name, binary_digest) = binary.ok_or(VerificationError::NoProvenances)?;
        info!(
            binary = %binary_name,
            count = provenances.len(),
            "provenance set verified"
        );
        Ok(VerifiedProvenanceSet {
            binary_name,
            binary_digest,
            provenances,
        })
    }

    fn check_references(&self, uri: &str, ir: &ProvenanceIr) -> Result<(), VerificationError> {
        if let Some(expected) = &self.references.binary_sha256_digest {
            check_reference("binary sha256 digest", expected, ir.binary_sha256_digest())?;
        }
        if let Some(expected) = &self.references.builder_image_sha256_digest {
            let actual = ir
                .builder_image_sha256_digest()
                .map_err(|source| VerificationError::Claim {
                    path: uri.to_owned(),
                    source,
                })?;
            check_reference("builder image sha256 digest", expected, actual)?;
        }
        Ok(())
    }
}

fn check_agrees(
    path: &str,
    field: &'static str,
    expected: &str,
    actual: &str,
) -> Result<(), VerificationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(VerificationError::ProvenanceMismatch {
            path: path.to_owned(),
            field,
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        })
    }
}

fn check_reference(
    field: &'static str,
    expected: &str,
    actual: &str,
) -> Result<(), VerificationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(VerificationError::ReferenceMismatch {
            field,
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        })
    }
}
