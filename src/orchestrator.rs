//! Lint run orchestration
//!
//! Drives a run end to end: parse each manifest, apply per-file rules,
//! compare manifests pairwise, then optionally verify packages against
//! the registry. Registry lookups run concurrently under a semaphore
//! and are cached per canonical name, so a package pinned in several
//! manifests is fetched once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::domain::LintSummary;
use crate::lint::{check_file, compare_manifests, LintFilter};
use crate::manifest::{parse_manifest, ManifestInfo};
use crate::progress::Progress;
use crate::registry::{PackageInfo, RegistryChecker};

const DEFAULT_CONCURRENCY: usize = 8;

/// An execution error that did not stop the run
#[derive(Debug)]
pub struct OrchestratorError {
    /// What was being processed (a path or package name)
    pub context: String,
    /// The underlying error message
    pub message: String,
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

/// Result of a full lint run
#[derive(Debug)]
pub struct OrchestratorResult {
    pub summary: LintSummary,
    /// Errors that prevented part of the run (unreadable files,
    /// network failures). Findings in the summary are unaffected.
    pub errors: Vec<OrchestratorError>,
}

pub struct Orchestrator {
    filter: LintFilter,
    checker: Option<Arc<RegistryChecker>>,
    progress_enabled: bool,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(filter: LintFilter) -> Self {
        Self {
            filter,
            checker: None,
            progress_enabled: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Enables registry verification
    pub fn with_registry_checker(mut self, checker: RegistryChecker) -> Self {
        self.checker = Some(Arc::new(checker));
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress_enabled = enabled;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs the lint over the given manifests.
    pub async fn run(&self, manifests: &[ManifestInfo]) -> OrchestratorResult {
        let mut summary = LintSummary::new();
        let mut errors = Vec::new();

        for manifest in manifests {
            match parse_manifest(&manifest.path) {
                Ok(mut report) => {
                    check_file(&mut report, &self.filter);
                    summary.add_report(report);
                }
                Err(e) => {
                    errors.push(OrchestratorError {
                        context: manifest.path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let cross = compare_manifests(&summary.reports, &self.filter);
        summary.add_cross_findings(cross);

        if let Some(checker) = &self.checker {
            self.run_registry_checks(checker, &mut summary, &mut errors)
                .await;
        }

        OrchestratorResult { summary, errors }
    }

    async fn run_registry_checks(
        &self,
        checker: &Arc<RegistryChecker>,
        summary: &mut LintSummary,
        errors: &mut Vec<OrchestratorError>,
    ) {
        let names: Vec<String> = {
            let mut seen = HashSet::new();
            summary
                .reports
                .iter()
                .flat_map(|r| r.requirements.iter())
                .filter(|req| self.filter.should_process_package(&req.name))
                .map(|req| req.canonical_name())
                .filter(|name| seen.insert(name.clone()))
                .collect()
        };

        if names.is_empty() {
            return;
        }

        let progress = Progress::new(self.progress_enabled);
        progress.start(names.len() as u64, "checking packages on PyPI");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for name in names {
            let checker = Arc::clone(checker);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // Closing the semaphore is the only acquire failure and
                // never happens here
                let _permit = semaphore.acquire().await;
                let result = checker.fetch(&name).await;
                (name, result)
            });
        }

        let mut cache: HashMap<String, Option<PackageInfo>> = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            progress.inc();
            match joined {
                Ok((name, Ok(info))) => {
                    cache.insert(name, info);
                }
                Ok((name, Err(e))) => {
                    errors.push(OrchestratorError {
                        context: name,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    errors.push(OrchestratorError {
                        context: "registry check".to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        progress.finish_and_clear();

        for report in &mut summary.reports {
            let mut findings = Vec::new();
            for requirement in &report.requirements {
                if !self.filter.should_process_package(&requirement.name) {
                    continue;
                }
                let canonical = requirement.canonical_name();
                // Packages whose fetch failed are skipped, not flagged
                if let Some(info) = cache.get(&canonical) {
                    findings.extend(checker.evaluate(&report.path, requirement, info.as_ref()));
                }
            }
            for finding in findings {
                report.add_finding(finding);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::registry::{PackageInfo, Registry, ReleaseInfo};
    use async_trait::async_trait;
    use std::fs;
    use tempfile::tempdir;

    struct MockRegistry {
        packages: HashMap<String, PackageInfo>,
    }

    #[async_trait]
    impl Registry for MockRegistry {
        fn name(&self) -> &str {
            "PyPI"
        }

        async fn fetch_package(&self, package: &str) -> Result<PackageInfo, RegistryError> {
            self.packages
                .get(package)
                .cloned()
                .ok_or_else(|| RegistryError::package_not_found(package, "PyPI"))
        }
    }

    fn package_info(name: &str, latest: &str, versions: &[&str]) -> PackageInfo {
        PackageInfo {
            name: name.to_string(),
            latest_version: latest.to_string(),
            releases: versions
                .iter()
                .map(|v| {
                    (
                        v.to_string(),
                        ReleaseInfo {
                            released_at: None,
                            yanked: false,
                        },
                    )
                })
                .collect(),
        }
    }

    fn manifest(dir: &std::path::Path, name: &str, content: &str) -> ManifestInfo {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        ManifestInfo::new(path)
    }

    #[tokio::test]
    async fn test_run_reports_drift() {
        let dir = tempdir().unwrap();
        let manifests = vec![
            manifest(dir.path(), "requirements.txt", "openai==1.35.3\n"),
            manifest(dir.path(), "requirements_dev.txt", "openai==0.28.0\n"),
        ];

        let orchestrator = Orchestrator::new(LintFilter::new());
        let result = orchestrator.run(&manifests).await;

        assert!(result.errors.is_empty());
        assert_eq!(result.summary.manifests_checked(), 2);
        let codes: Vec<_> = result.summary.all_findings().map(|f| f.code()).collect();
        assert!(codes.contains(&"version-drift"));
    }

    #[tokio::test]
    async fn test_run_clean_manifests() {
        let dir = tempdir().unwrap();
        let manifests = vec![
            manifest(dir.path(), "requirements.txt", "openai==1.35.3\n"),
            manifest(dir.path(), "requirements_dev.txt", "openai==1.35.3\n"),
        ];

        let result = Orchestrator::new(LintFilter::new()).run(&manifests).await;
        assert!(result.summary.is_clean());
    }

    #[tokio::test]
    async fn test_unreadable_manifest_is_execution_error() {
        let dir = tempdir().unwrap();
        let good = manifest(dir.path(), "requirements.txt", "openai==1.35.3\n");
        let missing = ManifestInfo::new(dir.path().join("requirements_dev.txt"));

        let result = Orchestrator::new(LintFilter::new())
            .run(&[good, missing])
            .await;
        assert_eq!(result.summary.manifests_checked(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("not found"));
    }

    #[tokio::test]
    async fn test_registry_checks_attach_findings() {
        let dir = tempdir().unwrap();
        let manifests = vec![manifest(
            dir.path(),
            "requirements.txt",
            "openai==0.28.0\nno-such-package==1.0\n",
        )];

        let mut packages = HashMap::new();
        packages.insert(
            "openai".to_string(),
            package_info("openai", "1.35.3", &["0.28.0", "1.35.3"]),
        );
        let checker = RegistryChecker::new(Arc::new(MockRegistry { packages }));

        let result = Orchestrator::new(LintFilter::new())
            .with_registry_checker(checker)
            .run(&manifests)
            .await;

        let codes: Vec<_> = result.summary.all_findings().map(|f| f.code()).collect();
        assert!(codes.contains(&"outdated-pin"));
        assert!(codes.contains(&"unknown-package"));
    }

    #[tokio::test]
    async fn test_registry_fetch_once_per_package() {
        // The same pin in two files must not duplicate findings beyond
        // one per declaration
        let dir = tempdir().unwrap();
        let manifests = vec![
            manifest(dir.path(), "requirements.txt", "openai==0.28.0\n"),
            manifest(dir.path(), "requirements_dev.txt", "openai==0.28.0\n"),
        ];

        let mut packages = HashMap::new();
        packages.insert(
            "openai".to_string(),
            package_info("openai", "1.35.3", &["0.28.0", "1.35.3"]),
        );
        let checker = RegistryChecker::new(Arc::new(MockRegistry { packages }));

        let result = Orchestrator::new(LintFilter::new())
            .with_registry_checker(checker)
            .run(&manifests)
            .await;

        let outdated = result
            .summary
            .all_findings()
            .filter(|f| f.code() == "outdated-pin")
            .count();
        assert_eq!(outdated, 2);
    }
}
