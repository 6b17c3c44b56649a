//! CLI subcommands.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use provenant_intoto::schema::ProvenanceSchema;

#[expect(
    unreachable_pub,
    reason = "binary crate — pub inside private module is fine"
)]
pub mod endorse;
#[expect(
    unreachable_pub,
    reason = "binary crate — pub inside private module is fine"
)]
pub mod fuzz_claim;
#[expect(
    unreachable_pub,
    reason = "binary crate — pub inside private module is fine"
)]
pub mod inspect;
#[expect(
    unreachable_pub,
    reason = "binary crate — pub inside private module is fine"
)]
pub mod validate;

/// Compile the provenance schema at `path`, or the embedded amber schema.
fn load_schema(path: Option<&Path>) -> Result<ProvenanceSchema> {
    let Some(path) = path else {
        return Ok(ProvenanceSchema::amber()?);
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read schema {}", path.display()))?;
    Ok(ProvenanceSchema::new(&text)?)
}
