//! SLSA v0.2 provenance predicates and the provenance intermediate representation.
//!
//! A [`ProvenanceIr`] owns one provenance statement plus the fields a
//! build-type specific extractor derived from it. Each derived field is
//! optional until the extractor sets it, and reading an unset field is an
//! error rather than a default.
//!
//! See: <https://slsa.dev/provenance/v0.2>

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClaimError, IrField, StructuralError};
use crate::schema::ProvenanceSchema;
use crate::statement::{DigestSet, Predicate, Statement, parse_statement};

/// Predicate type of SLSA v0.2 provenance.
pub const SLSA_PROVENANCE_V02: &str = "https://slsa.dev/provenance/v0.2";

/// Build type of provenances produced by the transparent-release builder.
pub const AMBER_BUILD_TYPE: &str =
    "https://github.com/project-oak/transparent-release/schema/amber-slsa-buildtype/v1/provenance.json";

/// Marker identifying a material that pins a container image by digest.
pub const IMAGE_DIGEST_MARKER: &str = "@sha256:";

/// SLSA v0.2 provenance predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlsaPredicate {
    /// Identifies the build system.
    pub builder: Builder,
    /// URI selecting the schema of `buildConfig`.
    pub build_type: String,
    /// What triggered the build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation: Option<serde_json::Value>,
    /// Build-type specific build steps; decoded by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_config: Option<serde_json::Value>,
    /// Timing and completeness metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Inputs to the build.
    #[serde(default)]
    pub materials: Vec<Material>,
}

/// Identifies the build system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builder {
    /// Builder identifier URI.
    pub id: String,
}

/// An input to the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// URI identifying the material.
    pub uri: String,
    /// Content digests.
    #[serde(default)]
    pub digest: DigestSet,
}

/// `buildConfig` of [`AMBER_BUILD_TYPE`] provenances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmberBuildConfig {
    /// The build command, one argument per element.
    pub command: Vec<String>,
    /// Path of the built binary, relative to the repository root.
    pub output_path: String,
}

/// Provenance statement with extractor-populated optional fields.
#[derive(Debug, Clone)]
pub struct ProvenanceIr {
    statement: Statement<SlsaPredicate>,
    build_type: Option<String>,
    build_cmd: Option<Vec<String>>,
    builder_image_sha256_digest: Option<String>,
    repo_uris: Option<BTreeSet<String>>,
}

impl ProvenanceIr {
    /// The underlying provenance statement.
    pub const fn statement(&self) -> &Statement<SlsaPredicate> {
        &self.statement
    }

    /// Name of the built binary (the statement's sole subject).
    pub fn binary_name(&self) -> &str {
        &self.statement.subject[0].name
    }

    /// SHA-256 digest of the built binary.
    pub fn binary_sha256_digest(&self) -> &str {
        self.statement.subject[0]
            .digest
            .get("sha256")
            .map_or("", String::as_str)
    }

    /// The provenance `buildType`.
    pub fn build_type(&self) -> Result<&str, ClaimError> {
        self.build_type
            .as_deref()
            .ok_or(ClaimError::FieldNotSet(IrField::BuildType))
    }

    /// The build command.
    pub fn build_cmd(&self) -> Result<&[String], ClaimError> {
        self.build_cmd
            .as_deref()
            .ok_or(ClaimError::FieldNotSet(IrField::BuildCmd))
    }

    /// Digest of the builder container image.
    pub fn builder_image_sha256_digest(&self) -> Result<&str, ClaimError> {
        self.builder_image_sha256_digest
            .as_deref()
            .ok_or(ClaimError::FieldNotSet(IrField::BuilderImageSha256Digest))
    }

    /// Source-control repository URIs referenced by the materials.
    pub fn repo_uris(&self) -> Result<&BTreeSet<String>, ClaimError> {
        self.repo_uris
            .as_ref()
            .ok_or(ClaimError::FieldNotSet(IrField::RepoUris))
    }
}

/// Accumulates the optional fields of a [`ProvenanceIr`].
#[derive(Debug, Clone)]
pub struct ProvenanceIrBuilder {
    ir: ProvenanceIr,
}

impl ProvenanceIrBuilder {
    /// Start an IR over `statement`, which must have one subject with a `sha256` digest.
    pub fn new(statement: Statement<SlsaPredicate>) -> Result<Self, StructuralError> {
        statement.sole_subject()?;
        Ok(Self {
            ir: ProvenanceIr {
                statement,
                build_type: None,
                build_cmd: None,
                builder_image_sha256_digest: None,
                repo_uris: None,
            },
        })
    }

    /// Set the build type.
    #[must_use]
    pub fn with_build_type(mut self, build_type: impl Into<String>) -> Self {
        self.ir.build_type = Some(build_type.into());
        self
    }

    /// Set the build command.
    #[must_use]
    pub fn with_build_cmd(mut self, build_cmd: Vec<String>) -> Self {
        self.ir.build_cmd = Some(build_cmd);
        self
    }

    /// Set the builder image digest.
    #[must_use]
    pub fn with_builder_image_sha256_digest(mut self, digest: impl Into<String>) -> Self {
        self.ir.builder_image_sha256_digest = Some(digest.into());
        self
    }

    /// Set the repository URIs.
    #[must_use]
    pub fn with_repo_uris(mut self, repo_uris: BTreeSet<String>) -> Self {
        self.ir.repo_uris = Some(repo_uris);
        self
    }

    /// Populate every field the amber build type defines.
    pub fn with_amber_provenance_data(self) -> Result<Self, ClaimError> {
        let predicate = &self.ir.statement.predicate;

        let raw_config = predicate
            .build_config
            .clone()
            .ok_or_else(|| ClaimError::NotFound("buildConfig".to_owned()))?;
        let config: AmberBuildConfig =
            serde_json::from_value(raw_config).map_err(|source| ClaimError::Decode {
                context: "buildConfig",
                source,
            })?;

        let image_digest = builder_image_digest(&predicate.materials)
            .ok_or(ClaimError::BuilderImageNotFound)?
            .to_owned();
        let repo_uris = repo_uris(&predicate.materials);
        let build_type = predicate.build_type.clone();

        Ok(self
            .with_build_type(build_type)
            .with_build_cmd(config.command)
            .with_builder_image_sha256_digest(image_digest)
            .with_repo_uris(repo_uris))
    }

    /// Finish the IR.
    pub fn build(self) -> ProvenanceIr {
        self.ir
    }
}

/// Parse and validate a provenance file into a populated IR.
///
/// The document is validated against `schema` first; every schema
/// violation is reported. The build type then selects the extractor.
pub fn parse_provenance_file(
    bytes: &[u8],
    schema: &ProvenanceSchema,
) -> Result<ProvenanceIr, ClaimError> {
    let document: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|source| ClaimError::Decode {
            context: "provenance",
            source,
        })?;
    schema.validate(&document)?;

    let raw = parse_statement(bytes)?;
    let Predicate::SlsaProvenance(predicate) = raw.decode_predicate()? else {
        return Err(StructuralError::WrongPredicateType {
            expected: SLSA_PROVENANCE_V02.to_owned(),
            actual: raw.predicate_type,
        }
        .into());
    };
    let statement = Statement {
        statement_type: raw.statement_type,
        predicate_type: raw.predicate_type,
        subject: raw.subject,
        predicate: *predicate,
    };

    let builder = ProvenanceIrBuilder::new(statement)?;
    let build_type = builder.ir.statement.predicate.build_type.clone();
    let builder = match build_type.as_str() {
        AMBER_BUILD_TYPE => builder.with_amber_provenance_data()?,
        other => return Err(ClaimError::UnsupportedBuildType(other.to_owned())),
    };
    let ir = builder.build();

    debug!(
        binary = %ir.binary_name(),
        digest = %ir.binary_sha256_digest(),
        "parsed provenance"
    );
    Ok(ir)
}

/// Digest of the first material whose URI pins an image with `@sha256:`.
fn builder_image_digest(materials: &[Material]) -> Option<&str> {
    materials.iter().find_map(|m| {
        m.uri
            .split_once(IMAGE_DIGEST_MARKER)
            .map(|(_, digest)| digest)
    })
}

/// URIs of materials that look like source-control locations.
fn repo_uris(materials: &[Material]) -> BTreeSet<String> {
    materials
        .iter()
        .filter(|m| is_source_control_uri(&m.uri))
        .map(|m| m.uri.clone())
        .collect()
}

fn is_source_control_uri(uri: &str) -> bool {
    uri.starts_with("git+")
        || uri.contains("github.com/")
        || uri.contains("gitlab.com/")
        || uri.ends_with(".git")
}
