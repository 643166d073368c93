//! Human-readable text output using colored

use colored::Colorize;

use crate::domain::{Finding, Severity};
use crate::orchestrator::OrchestratorResult;

use super::{OutputFormatter, Verbosity};

pub struct TextFormatter {
    verbosity: Verbosity,
}

impl TextFormatter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn severity_label(severity: Severity) -> String {
        match severity {
            Severity::Error => "error".red().bold().to_string(),
            Severity::Warning => "warning".yellow().to_string(),
        }
    }

    fn format_finding(finding: &Finding) -> String {
        let mut line = String::from("  ");
        if let Some(number) = finding.line {
            line.push_str(&format!("{} ", format!("line {}:", number).dimmed()));
        }
        line.push_str(&Self::severity_label(finding.severity));
        line.push_str(": ");
        if let Some(package) = &finding.package {
            line.push_str(&format!("{}: ", package.cyan()));
        }
        line.push_str(&finding.kind.to_string());
        line
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult) -> String {
        let summary = &result.summary;
        let mut out = String::new();

        for report in &summary.reports {
            let mut findings: Vec<&Finding> = report
                .findings
                .iter()
                .chain(summary.cross_findings_for(&report.path))
                .filter(|f| self.verbosity != Verbosity::Quiet || f.is_error())
                .collect();
            findings.sort_by_key(|f| f.line);

            if findings.is_empty() {
                if self.verbosity == Verbosity::Verbose {
                    out.push_str(&format!(
                        "{}: {} ({} requirements)\n",
                        report.path.display(),
                        "ok".green(),
                        report.requirements.len()
                    ));
                }
                continue;
            }

            out.push_str(&format!("{}\n", report.path.display().to_string().bold()));
            for finding in findings {
                out.push_str(&Self::format_finding(finding));
                out.push('\n');
            }
            if self.verbosity == Verbosity::Verbose && report.skipped_lines > 0 {
                out.push_str(&format!(
                    "  {}\n",
                    format!("({} non-requirement lines skipped)", report.skipped_lines).dimmed()
                ));
            }
            out.push('\n');
        }

        if !result.errors.is_empty() && self.verbosity != Verbosity::Quiet {
            out.push_str(&format!("{}\n", "execution errors".red().bold()));
            for error in &result.errors {
                out.push_str(&format!("  {}\n", error));
            }
            out.push('\n');
        }

        if self.verbosity != Verbosity::Quiet {
            let errors = summary.error_count();
            let warnings = summary.warning_count();
            if errors == 0 && warnings == 0 {
                out.push_str(&format!(
                    "checked {} manifests ({} requirements): {}\n",
                    summary.manifests_checked(),
                    summary.total_requirements(),
                    "no problems found".green()
                ));
            } else {
                let error_part = format!("{} errors", errors);
                let warning_part = format!("{} warnings", warnings);
                out.push_str(&format!(
                    "checked {} manifests ({} requirements): {}, {}\n",
                    summary.manifests_checked(),
                    summary.total_requirements(),
                    if errors > 0 {
                        error_part.red().bold().to_string()
                    } else {
                        error_part
                    },
                    if warnings > 0 {
                        warning_part.yellow().to_string()
                    } else {
                        warning_part
                    },
                ));
            }
        }

        out
    }
}
