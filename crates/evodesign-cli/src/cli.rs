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
    author = "EvoDesign Developers",
    version,
    about = "EvoDesign CLI - Iterative protein redesign driven by a structure generator and a sequence redesign model.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a mutability mask into a generator constraint string.
    Encode(EncodeArgs),
    /// Map a generated sequence back onto a mask, restoring deletion placeholders.
    Reinsert(ReinsertArgs),
    /// Pick the best-scoring sequence from one or more redesign reports.
    Select(SelectArgs),
    /// Run one or more full design cycles.
    Design(DesignArgs),
}

/// Arguments for the `encode` subcommand.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Mutability mask: amino-acid letters are kept, 'X' or '*' are free, '-' is deleted.
    #[arg(required = true, value_name = "MASK")]
    pub mask: String,

    /// Length of the reference chain in the constraint header. Defaults to the mask length.
    #[arg(long, value_name = "INT")]
    pub reference_length: Option<usize>,

    /// Replicate the constraint body for an explicit symmetry group (e.g., 'c3', 'd2').
    #[arg(long, value_name = "GROUP")]
    pub symmetry: Option<String>,
}

/// Arguments for the `reinsert` subcommand.
#[derive(Args, Debug)]
pub struct ReinsertArgs {
    /// Mutability mask the sequence was generated from.
    #[arg(short, long, required = true, value_name = "MASK")]
    pub mask: String,

    /// Generated sequence, one residue per non-deleted mask position.
    #[arg(required = true, value_name = "SEQUENCE")]
    pub sequence: String,
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Redesign reports to choose from.
    #[arg(required = true, num_args = 1.., value_name = "PATH")]
    pub reports: Vec<PathBuf>,

    /// Treat the first record of each report as a candidate instead of the native sequence.
    #[arg(long)]
    pub include_native: bool,

    /// Write the selected record to this FASTA file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `design` subcommand.
#[derive(Args, Debug)]
pub struct DesignArgs {
    // --- Core Arguments ---
    /// Starting sequence. Must be as long as the mask.
    #[arg(short, long, required = true, value_name = "SEQUENCE")]
    pub sequence: String,

    /// Mutability mask: amino-acid letters are kept, 'X' or '*' are free, '-' is deleted.
    #[arg(short, long, required = true, value_name = "MASK")]
    pub mask: String,

    /// Reference structure handed to the generator and used for symmetry detection.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving generated structures and redesign reports.
    #[arg(short, long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Append one CSV row per finished cycle to this file.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    // --- Workflow Overrides ---
    /// Number of design cycles to run.
    #[arg(short = 'n', long, value_name = "INT")]
    pub cycles: Option<usize>,

    /// Length of the reference chain in the constraint header. Defaults to the mask length.
    #[arg(long, value_name = "INT")]
    pub reference_length: Option<usize>,

    /// Symmetry mode: 'none', 'auto', or a group label such as 'c3' or 'd2'.
    #[arg(long, value_name = "MODE")]
    pub symmetry: Option<String>,

    // --- Generator Overrides ---
    /// Number of structures generated per cycle.
    #[arg(long, value_name = "INT")]
    pub num_designs: Option<usize>,

    /// Number of diffusion steps per structure.
    #[arg(long, value_name = "INT")]
    pub diffusion_steps: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S generator.num-designs=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
