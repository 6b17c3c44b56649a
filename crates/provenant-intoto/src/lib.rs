//! in-toto attestation statements and claims for software supply chains.
//!
//! `provenant-intoto` decodes in-toto v0.1 statements in two phases,
//! validates generic claims, extracts a provenance IR from SLSA v0.2
//! provenances, and generates endorsement statements.

pub mod claims;
pub mod endorsement;
pub mod error;
pub mod fuzz;
pub mod provenance;
pub mod schema;
pub mod statement;

pub use claims::{ClaimPredicate, ClaimValidity, validate_claim, validate_claim_type};
pub use error::ClaimError;
pub use provenance::{ProvenanceIr, parse_provenance_file};
pub use statement::{Statement, parse_statement};
