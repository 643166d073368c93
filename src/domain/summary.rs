//! Lint result aggregation
//!
//! Provides structures for tracking findings at file and overall levels.

use super::{Finding, Requirement, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parse and lint results for a single manifest file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestReport {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Declarations parsed from the file, in source order
    pub requirements: Vec<Requirement>,
    /// Findings attached to this file
    pub findings: Vec<Finding>,
    /// Non-declaration lines that were skipped (pip options, URLs)
    pub skipped_lines: usize,
}

impl ManifestReport {
    /// Creates a new, empty report for a manifest
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            requirements: Vec::new(),
            findings: Vec::new(),
            skipped_lines: 0,
        }
    }

    /// Adds a finding
    pub fn add_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Number of error-severity findings
    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    /// Number of warning-severity findings
    pub fn warning_count(&self) -> usize {
        self.findings.iter().filter(|f| !f.is_error()).count()
    }

    /// Returns true when no findings were recorded
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings of a given severity
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Look up a declaration by canonical package name
    pub fn find_requirement(&self, canonical_name: &str) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|r| r.canonical_name() == canonical_name)
    }
}

/// Overall result of a lint run across all manifests
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LintSummary {
    /// Per-manifest reports, in detection order
    pub reports: Vec<ManifestReport>,
    /// Findings from cross-manifest comparison
    pub cross_findings: Vec<Finding>,
}

impl LintSummary {
    /// Creates a new, empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a manifest report
    pub fn add_report(&mut self, report: ManifestReport) {
        self.reports.push(report);
    }

    /// Adds cross-manifest findings
    pub fn add_cross_findings(&mut self, findings: Vec<Finding>) {
        self.cross_findings.extend(findings);
    }

    /// Number of manifests checked
    pub fn manifests_checked(&self) -> usize {
        self.reports.len()
    }

    /// Total declarations parsed across all manifests
    pub fn total_requirements(&self) -> usize {
        self.reports.iter().map(|r| r.requirements.len()).sum()
    }

    /// All findings: per-file first, then cross-manifest
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.reports
            .iter()
            .flat_map(|r| r.findings.iter())
            .chain(self.cross_findings.iter())
    }

    /// Total error-severity findings
    pub fn error_count(&self) -> usize {
        self.all_findings().filter(|f| f.is_error()).count()
    }

    /// Total warning-severity findings
    pub fn warning_count(&self) -> usize {
        self.all_findings().filter(|f| !f.is_error()).count()
    }

    /// Returns true when no finding anywhere reached error severity
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    /// Cross-manifest findings attached to the given manifest
    pub fn cross_findings_for(&self, path: &std::path::Path) -> impl Iterator<Item = &Finding> {
        let path = path.to_path_buf();
        self.cross_findings.iter().filter(move |f| f.path == path)
    }
}
