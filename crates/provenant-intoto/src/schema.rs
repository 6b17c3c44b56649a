//! JSON Schema validation for provenance documents.
//!
//! The schema is compiled once by the caller and passed by reference to
//! [`crate::provenance::parse_provenance_file`]; nothing here holds global state.

use crate::error::ClaimError;

/// Schema for [`crate::provenance::AMBER_BUILD_TYPE`] provenances.
pub const AMBER_PROVENANCE_SCHEMA: &str = include_str!("../schema/amber-provenance.json");

/// A compiled provenance JSON Schema.
#[derive(Debug)]
pub struct ProvenanceSchema {
    validator: jsonschema::Validator,
}

impl ProvenanceSchema {
    /// Compile a schema from its JSON text.
    pub fn new(schema_text: &str) -> Result<Self, ClaimError> {
        let schema: serde_json::Value = serde_json::from_str(schema_text)
            .map_err(|e| ClaimError::InvalidSchema(e.to_string()))?;
        let validator = jsonschema::options()
            .build(&schema)
            .map_err(|e| ClaimError::InvalidSchema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Compile the bundled amber provenance schema.
    pub fn amber() -> Result<Self, ClaimError> {
        Self::new(AMBER_PROVENANCE_SCHEMA)
    }

    /// Validate `document`, collecting every violation.
    pub fn validate(&self, document: &serde_json::Value) -> Result<(), ClaimError> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(document)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ClaimError::SchemaValidation { errors })
        }
    }
}
