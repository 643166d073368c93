//! Per-file lint rules
//!
//! Rules that inspect a single manifest in isolation:
//! - duplicate-package: the same package declared more than once
//! - contradictory-bounds: a specifier set no version can satisfy
//! - unpinned: a declaration without an exact pin

use std::collections::HashMap;

use crate::domain::{Finding, FindingKind, ManifestReport, Requirement, Severity};

use super::filter::LintFilter;

/// Runs all per-file rules, appending findings to the report.
pub fn check_file(report: &mut ManifestReport, filter: &LintFilter) {
    let mut findings = Vec::new();

    check_duplicates(report, filter, &mut findings);

    for requirement in &report.requirements {
        if !filter.should_process_package(&requirement.name) {
            continue;
        }
        check_contradiction(&report.path, requirement, &mut findings);
        if !filter.allow_unpinned() {
            check_unpinned(&report.path, requirement, filter, &mut findings);
        }
    }

    for finding in findings {
        report.add_finding(finding);
    }
}

/// Same package declared twice. Declarations that differ only in their
/// environment marker target disjoint environments and are allowed.
fn check_duplicates(report: &ManifestReport, filter: &LintFilter, findings: &mut Vec<Finding>) {
    let mut seen: HashMap<(String, Option<String>), usize> = HashMap::new();

    for requirement in &report.requirements {
        if !filter.should_process_package(&requirement.name) {
            continue;
        }
        let key = (requirement.canonical_name(), requirement.marker.clone());
        match seen.get(&key) {
            Some(&first_line) => {
                findings.push(
                    Finding::new(
                        Severity::Error,
                        &report.path,
                        FindingKind::DuplicatePackage { first_line },
                    )
                    .with_line(requirement.line)
                    .with_package(requirement.canonical_name()),
                );
            }
            None => {
                seen.insert(key, requirement.line);
            }
        }
    }
}

fn check_contradiction(
    path: &std::path::Path,
    requirement: &Requirement,
    findings: &mut Vec<Finding>,
) {
    if let Some((lower, upper)) = requirement.specifiers.contradiction() {
        findings.push(
            Finding::new(
                Severity::Error,
                path,
                FindingKind::ContradictoryBounds { lower, upper },
            )
            .with_line(requirement.line)
            .with_package(requirement.canonical_name()),
        );
    }
}

fn check_unpinned(
    path: &std::path::Path,
    requirement: &Requirement,
    filter: &LintFilter,
    findings: &mut Vec<Finding>,
) {
    if requirement.is_pinned() {
        return;
    }
    let severity = if filter.strict() {
        Severity::Error
    } else {
        Severity::Warning
    };
    findings.push(
        Finding::new(
            severity,
            path,
            FindingKind::Unpinned {
                constraint: requirement.specifiers.to_string(),
            },
        )
        .with_line(requirement.line)
        .with_package(requirement.canonical_name()),
    );
}
