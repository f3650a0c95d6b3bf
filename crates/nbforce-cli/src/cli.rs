use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "nbforce CLI - Evaluate nonbonded energies and forces of a TOML particle system.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the energy breakdown and, optionally, per-particle forces.
    Evaluate(EvaluateArgs),
    /// Validate a system file and print the derived method parameters.
    Check(CheckArgs),
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to the system description in TOML format.
    #[arg(value_name = "PATH")]
    pub system: PathBuf,

    /// Print the force on every particle after the energies.
    #[arg(long)]
    pub forces: bool,

    /// Skip direct-space terms (pairs, exceptions and dispersion correction).
    #[arg(long, conflicts_with = "no_reciprocal")]
    pub no_direct: bool,

    /// Skip the reciprocal-space term of Ewald and PME.
    #[arg(long)]
    pub no_reciprocal: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the system description in TOML format.
    #[arg(value_name = "PATH")]
    pub system: PathBuf,
}
