//! Command line interface definition using clap

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reqlint",
    about = "Linter and consistency checker for pip requirements manifests",
    version,
    long_about = "Parses requirements.txt-style manifests, checks each file for \
                  duplicates, contradictions and unpinned declarations, and compares \
                  manifests against each other for version drift."
)]
pub struct CliArgs {
    /// Project directory to scan for manifests
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Lint specific manifest files instead of scanning (repeatable)
    #[arg(short, long, action = clap::ArgAction::Append)]
    pub file: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Do not warn about declarations without an exact pin
    #[arg(long)]
    pub allow_unpinned: bool,

    /// Exclude specific packages (repeatable)
    #[arg(short, long, action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Only check specific packages (repeatable)
    #[arg(short, long, action = clap::ArgAction::Append)]
    pub only: Vec<String>,

    /// Verify pinned versions against PyPI
    #[arg(long)]
    pub check_registry: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Render cross-manifest divergence as a diff
    #[arg(long, conflicts_with = "json")]
    pub diff: bool,

    /// Show detailed output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CliArgs {
    /// True when explicit manifest files were given; scanning is skipped.
    pub fn has_explicit_files(&self) -> bool {
        !self.file.is_empty()
    }
}
