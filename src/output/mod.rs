//! Output formatting
//!
//! Three renderings of a lint run: human-readable text (default),
//! machine-readable JSON, and a unified-diff view of cross-manifest
//! divergence.

pub mod diff;
pub mod json;
pub mod text;

use crate::orchestrator::OrchestratorResult;

pub use diff::DiffFormatter;
pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Diff,
}

/// How much of the run to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    Normal,
    /// Includes skipped-line notes and clean files
    Verbose,
}

/// Resolved output configuration
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
}

impl OutputConfig {
    /// Resolves CLI flags into a format and verbosity. JSON takes
    /// precedence over diff, quiet over verbose.
    pub fn from_cli(json: bool, diff: bool, verbose: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else if diff {
            OutputFormat::Diff
        } else {
            OutputFormat::Text
        };
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Self { format, verbosity }
    }

    /// Progress display only makes sense for interactive text output
    pub fn progress_enabled(&self) -> bool {
        self.format == OutputFormat::Text && self.verbosity != Verbosity::Quiet
    }
}

/// Renders a completed lint run
pub trait OutputFormatter {
    fn format(&self, result: &OrchestratorResult) -> String;
}

/// Creates the formatter for the chosen output format.
pub fn create_formatter(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::new(config.verbosity)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Diff => Box::new(DiffFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cli_defaults() {
        let config = OutputConfig::from_cli(false, false, false, false);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_json_wins_over_diff() {
        let config = OutputConfig::from_cli(true, true, false, false);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let config = OutputConfig::from_cli(false, false, true, true);
        assert_eq!(config.verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_progress_disabled_for_json_and_quiet() {
        assert!(OutputConfig::from_cli(false, false, false, false).progress_enabled());
        assert!(!OutputConfig::from_cli(true, false, false, false).progress_enabled());
        assert!(!OutputConfig::from_cli(false, false, false, true).progress_enabled());
    }
}
