//! Diff-style rendering of cross-manifest divergence
//!
//! Renders version drift and missing counterparts as unified-diff
//! hunks, one per package:
//!
//! ```text
//! --- a/requirements.txt
//! +++ b/requirements_dev.txt
//! @@ openai @@
//! -openai==1.35.3
//! +openai==0.28.0
//! ```
//!
//! Only cross-manifest findings appear here; per-file findings have no
//! diff representation. Clean runs produce empty output, like diff.

use std::path::{Path, PathBuf};

use crate::domain::{FindingKind, LintSummary};
use crate::orchestrator::OrchestratorResult;

use super::OutputFormatter;

pub struct DiffFormatter;

impl DiffFormatter {
    pub fn new() -> Self {
        Self
    }

    fn declared_line(summary: &LintSummary, path: &Path, package: &str) -> String {
        summary
            .reports
            .iter()
            .find(|r| r.path == path)
            .and_then(|r| r.find_requirement(package))
            .map(|req| format!("{}{}", req.name, req.specifiers))
            .unwrap_or_else(|| package.to_string())
    }
}

impl Default for DiffFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for DiffFormatter {
    fn format(&self, result: &OrchestratorResult) -> String {
        let summary = &result.summary;
        let mut out = String::new();
        let mut last_pair: Option<(PathBuf, PathBuf)> = None;

        for finding in &summary.cross_findings {
            let Some(package) = finding.package.as_deref() else {
                continue;
            };

            let (other_path, removed, added) = match &finding.kind {
                FindingKind::VersionDrift {
                    constraint,
                    other_path,
                    other_constraint,
                } => (
                    other_path.clone(),
                    format!("{}{}", package, constraint),
                    format!("{}{}", package, other_constraint),
                ),
                FindingKind::MissingCounterpart { other_path } => (
                    other_path.clone(),
                    Self::declared_line(summary, &finding.path, package),
                    "(absent)".to_string(),
                ),
                _ => continue,
            };

            let pair = (finding.path.clone(), other_path);
            if last_pair.as_ref() != Some(&pair) {
                out.push_str(&format!("--- a/{}\n", pair.0.display()));
                out.push_str(&format!("+++ b/{}\n", pair.1.display()));
                last_pair = Some(pair);
            }

            out.push_str(&format!("@@ {} @@\n", package));
            out.push_str(&format!("-{}\n", removed));
            out.push_str(&format!("+{}\n", added));
        }

        out
    }
}
