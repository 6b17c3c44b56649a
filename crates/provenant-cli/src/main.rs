//! Provenant CLI — supply-chain attestations for release artifacts.
//!
//! Endorse binaries from verified provenances, validate and inspect claims,
//! and aggregate fuzzing results into fuzz claims.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

/// Provenant — produce, parse, and validate supply-chain attestations.
///
/// Endorsements bind a binary digest to the provenances that describe its
/// build. Fuzz claims bind a source revision to a day of fuzzing results.
#[derive(Parser)]
#[command(name = "provenant", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON (for machine consumption).
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Verify provenances of a binary and write an endorsement statement.
    Endorse(commands::endorse::EndorseArgs),
    /// Validate a claim or provenance statement.
    Validate(commands::validate::ValidateArgs),
    /// Display a claim statement in human-readable format.
    Inspect(commands::inspect::InspectArgs),
    /// Aggregate a day of fuzzing results into a fuzz claim.
    FuzzClaim(commands::fuzz_claim::FuzzClaimArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Endorse(args) => commands::endorse::execute(&args),
        Commands::Validate(args) => commands::validate::execute(&args),
        Commands::Inspect(args) => commands::inspect::execute(&args),
        Commands::FuzzClaim(args) => commands::fuzz_claim::execute(&args),
    }
}
