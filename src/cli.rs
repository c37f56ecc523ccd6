//! Command-line interface definitions for fds.
//!
//! # Example
//!
//! ```bash
//! # Which photos on the camera card are not in the archive yet?
//! fds /media/card/DCIM -t ~/Pictures/archive
//!
//! # Reuse hashes from a previous run and copy what is missing to the desktop
//! fds /media/card/DCIM -t ~/Pictures/archive -m -c
//!
//! # Also list the files that were found
//! fds ./inbox -t /backup --verbose-found
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find which source files already exist, by content, under the targets.
///
/// Every source file is hashed and compared with the hashes of the target
/// files that share its type. Sources without a match are reported as
/// missing and can be copied to a staging folder.
#[derive(Debug, Parser)]
#[command(name = "fds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source files or directories
    #[arg(value_name = "SOURCE", required = true, num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// Target files or directories to search in
    #[arg(short, long, value_name = "TARGET", num_args = 1..)]
    pub targets: Vec<PathBuf>,

    /// Copy missing files to the staging directory
    #[arg(short, long)]
    pub copy: bool,

    /// Reuse cached hashes from the cache file
    ///
    /// An existing cache file is only read, never updated, while this flag
    /// is set. Delete the file to rebuild it.
    #[arg(short, long)]
    pub memory: bool,

    /// Also print source files that were found
    ///
    /// The short form is `--vf`. A single-dash `-vf` is read as `-v -f`
    /// and rejected.
    #[arg(long = "verbose-found", visible_alias = "vf")]
    pub verbose_found: bool,

    /// Hash cache file [default: hashes.json]
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Staging directory for --copy [default: ~/Desktop/Missing Files]
    #[arg(long, value_name = "PATH")]
    pub staging_dir: Option<PathBuf>,

    /// Number of threads used for hashing [default: 4]
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Follow symbolic links to directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Output format for the found/missing listings
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file [default: platform config dir]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Plain text progress lines instead of progress bars
    #[arg(long)]
    pub plain: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress everything except errors and the listings
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for the listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable numbered listings
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
