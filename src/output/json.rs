//! JSON output for machine consumption

use serde::Serialize;

use crate::domain::{Finding, ManifestReport};
use crate::orchestrator::OrchestratorResult;

use super::OutputFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    manifests: &'a [ManifestReport],
    cross_findings: &'a [Finding],
    errors: Vec<String>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    manifests_checked: usize,
    total_requirements: usize,
    error_count: usize,
    warning_count: usize,
    clean: bool,
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult) -> String {
        let summary = &result.summary;
        let output = JsonOutput {
            manifests: &summary.reports,
            cross_findings: &summary.cross_findings,
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
            summary: JsonSummary {
                manifests_checked: summary.manifests_checked(),
                total_requirements: summary.total_requirements(),
                error_count: summary.error_count(),
                warning_count: summary.warning_count(),
                clean: summary.is_clean(),
            },
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
