//! Cross-manifest consistency checks
//!
//! Compares every pair of parsed manifests:
//! - version-drift: the same package constrained differently in two files
//! - missing-counterpart: a package present in one file but not the other
//!
//! Manifests are treated as symmetric peers. No file is the source of
//! truth, so drift is reported against the first file of each pair and
//! names the other.

use crate::domain::{Finding, FindingKind, ManifestReport, Requirement, Severity};

use super::filter::LintFilter;

/// Compares all manifest pairs and returns the cross-file findings.
pub fn compare_manifests(reports: &[ManifestReport], filter: &LintFilter) -> Vec<Finding> {
    let mut findings = Vec::new();

    for i in 0..reports.len() {
        for j in (i + 1)..reports.len() {
            compare_pair(&reports[i], &reports[j], filter, &mut findings);
        }
    }

    findings
}

fn compare_pair(
    a: &ManifestReport,
    b: &ManifestReport,
    filter: &LintFilter,
    findings: &mut Vec<Finding>,
) {
    for requirement in &a.requirements {
        if !filter.should_process_package(&requirement.name) {
            continue;
        }
        let canonical = requirement.canonical_name();
        match b.find_requirement(&canonical) {
            Some(other) => {
                if !constraints_agree(requirement, other) {
                    findings.push(
                        Finding::new(
                            Severity::Error,
                            &a.path,
                            FindingKind::VersionDrift {
                                constraint: requirement.specifiers.to_string(),
                                other_path: b.path.clone(),
                                other_constraint: other.specifiers.to_string(),
                            },
                        )
                        .with_line(requirement.line)
                        .with_package(canonical),
                    );
                }
            }
            None => {
                findings.push(missing_counterpart(a, requirement, b, filter));
            }
        }
    }

    // Packages only declared in the second file
    for requirement in &b.requirements {
        if !filter.should_process_package(&requirement.name) {
            continue;
        }
        if a.find_requirement(&requirement.canonical_name()).is_none() {
            findings.push(missing_counterpart(b, requirement, a, filter));
        }
    }
}

/// Constraint equality is canonical: clause order and whitespace do not
/// count as drift.
fn constraints_agree(a: &Requirement, b: &Requirement) -> bool {
    a.specifiers.canonical() == b.specifiers.canonical()
}

fn missing_counterpart(
    declaring: &ManifestReport,
    requirement: &Requirement,
    other: &ManifestReport,
    filter: &LintFilter,
) -> Finding {
    let severity = if filter.strict() {
        Severity::Error
    } else {
        Severity::Warning
    };
    Finding::new(
        severity,
        &declaring.path,
        FindingKind::MissingCounterpart {
            other_path: other.path.clone(),
        },
    )
    .with_line(requirement.line)
    .with_package(requirement.canonical_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SpecifierSet;

    fn report(path: &str, lines: &[(&str, &str)]) -> ManifestReport {
        let mut report = ManifestReport::new(path);
        for (idx, (name, spec)) in lines.iter().enumerate() {
            let specifiers = SpecifierSet::parse(spec).unwrap();
            report
                .requirements
                .push(Requirement::new(*name, specifiers, idx + 1));
        }
        report
    }

    #[test]
    fn test_identical_manifests_are_consistent() {
        let a = report("requirements.txt", &[("openai", "==1.35.3")]);
        let b = report("requirements_dev.txt", &[("openai", "==1.35.3")]);
        let findings = compare_manifests(&[a, b], &LintFilter::new());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_version_drift_flagged() {
        let a = report("requirements.txt", &[("openai", "==1.35.3")]);
        let b = report("requirements_dev.txt", &[("openai", "==0.28.0")]);
        let findings = compare_manifests(&[a, b], &LintFilter::new());
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.code(), "version-drift");
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.package.as_deref(), Some("openai"));
        let msg = format!("{}", finding);
        assert!(msg.contains("==1.35.3"));
        assert!(msg.contains("==0.28.0"));
    }

    #[test]
    fn test_missing_counterpart_flagged_both_directions() {
        let a = report(
            "requirements.txt",
            &[("openai", "==1.35.3"), ("supabase", "==1.0.3")],
        );
        let b = report(
            "requirements_dev.txt",
            &[("openai", "==1.35.3"), ("pytest", "==7.4.0")],
        );
        let findings = compare_manifests(&[a, b], &LintFilter::new());
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.code() == "missing-counterpart"));
        assert!(findings.iter().all(|f| f.severity == Severity::Warning));
        let packages: Vec<_> = findings
            .iter()
            .filter_map(|f| f.package.as_deref())
            .collect();
        assert!(packages.contains(&"supabase"));
        assert!(packages.contains(&"pytest"));
    }

    #[test]
    fn test_missing_counterpart_is_error_in_strict_mode() {
        let a = report("requirements.txt", &[("supabase", "==1.0.3")]);
        let b = report("requirements_dev.txt", &[]);
        let findings = compare_manifests(&[a, b], &LintFilter::new().with_strict(true));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_clause_order_is_not_drift() {
        let a = report("requirements.txt", &[("urllib3", ">=1.26,<2.0")]);
        let b = report("constraints.txt", &[("urllib3", "<2.0, >=1.26")]);
        let findings = compare_manifests(&[a, b], &LintFilter::new());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_name_spelling_is_not_drift() {
        let a = report("requirements.txt", &[("typing_extensions", ">=4.0")]);
        let b = report("requirements_dev.txt", &[("typing-extensions", ">=4.0")]);
        let findings = compare_manifests(&[a, b], &LintFilter::new());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_three_manifests_compared_pairwise() {
        let a = report("requirements.txt", &[("openai", "==1.35.3")]);
        let b = report("requirements_dev.txt", &[("openai", "==0.28.0")]);
        let c = report("constraints.txt", &[("openai", "==1.35.3")]);
        let findings = compare_manifests(&[a, b, c], &LintFilter::new());
        // a-b drift and b-c drift, a-c agree
        let drift_count = findings
            .iter()
            .filter(|f| f.code() == "version-drift")
            .count();
        assert_eq!(drift_count, 2);
    }

    #[test]
    fn test_filter_applies_to_cross_checks() {
        let a = report("requirements.txt", &[("openai", "==1.35.3")]);
        let b = report("requirements_dev.txt", &[("openai", "==0.28.0")]);
        let filter = LintFilter::new().with_exclude(vec!["openai".to_string()]);
        let findings = compare_manifests(&[a, b], &filter);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_drift_with_different_constraint_kinds() {
        let a = report("requirements.txt", &[("httpx", "==0.23.3")]);
        let b = report("requirements_dev.txt", &[("httpx", ">=0.23")]);
        let findings = compare_manifests(&[a, b], &LintFilter::new());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code(), "version-drift");
    }

    #[test]
    fn test_single_manifest_has_no_cross_findings() {
        let a = report("requirements.txt", &[("openai", "==1.35.3")]);
        let findings = compare_manifests(&[a], &LintFilter::new());
        assert!(findings.is_empty());
    }
}
