//! Package filtering and rule configuration for lint runs

use crate::domain::canonicalize_name;

/// Controls which packages are linted and how strictly
#[derive(Debug, Clone, Default)]
pub struct LintFilter {
    /// Packages to exclude (canonical names)
    exclude: Vec<String>,
    /// If non-empty, only these packages are checked (canonical names)
    only: Vec<String>,
    /// Escalate warnings to errors
    strict: bool,
    /// Suppress the unpinned-declaration rule
    allow_unpinned: bool,
}

impl LintFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude.iter().map(|n| canonicalize_name(n)).collect();
        self
    }

    /// Sets packages to exclusively include
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only.iter().map(|n| canonicalize_name(n)).collect();
        self
    }

    /// Enables strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Allows unpinned declarations without a warning
    pub fn with_allow_unpinned(mut self, allow_unpinned: bool) -> Self {
        self.allow_unpinned = allow_unpinned;
        self
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn allow_unpinned(&self) -> bool {
        self.allow_unpinned
    }

    /// Decides whether a package participates in linting.
    ///
    /// `--only` takes precedence over `--exclude` when both are given.
    pub fn should_process_package(&self, name: &str) -> bool {
        let canonical = canonicalize_name(name);
        if !self.only.is_empty() {
            return self.only.contains(&canonical);
        }
        !self.exclude.contains(&canonical)
    }
}
