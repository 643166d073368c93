//! Registry-backed lint checks
//!
//! Verifies declarations against live registry metadata:
//! - unknown-package: the package does not exist on the registry
//! - unpublished-pin: the pinned version was never published (or all of
//!   its files were yanked)
//! - outdated-pin: the pinned version is older than the registry latest

use std::path::Path;
use std::sync::Arc;

use crate::domain::{Finding, FindingKind, Requirement, Severity, Version};
use crate::error::RegistryError;

use super::{PackageInfo, Registry};

pub struct RegistryChecker {
    registry: Arc<dyn Registry>,
}

impl RegistryChecker {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    pub fn registry_name(&self) -> &str {
        self.registry.name()
    }

    /// Fetches registry metadata for a package. A 404 is not an error
    /// here; the caller receives None and reports unknown-package.
    pub async fn fetch(&self, package: &str) -> Result<Option<PackageInfo>, RegistryError> {
        match self.registry.fetch_package(package).await {
            Ok(info) => Ok(Some(info)),
            Err(RegistryError::PackageNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Evaluates one declaration against already-fetched metadata.
    pub fn evaluate(
        &self,
        path: &Path,
        requirement: &Requirement,
        info: Option<&PackageInfo>,
    ) -> Vec<Finding> {
        let Some(info) = info else {
            return vec![Finding::new(
                Severity::Error,
                path,
                FindingKind::UnknownPackage {
                    registry: self.registry.name().to_string(),
                },
            )
            .with_line(requirement.line)
            .with_package(requirement.canonical_name())];
        };

        let Some(pinned) = requirement.pinned_version() else {
            // Only exact pins can be verified against release metadata
            return Vec::new();
        };

        let mut findings = Vec::new();

        if !is_published(info, pinned) {
            findings.push(
                Finding::new(
                    Severity::Error,
                    path,
                    FindingKind::UnpublishedPin {
                        pinned: pinned.to_string(),
                    },
                )
                .with_line(requirement.line)
                .with_package(requirement.canonical_name()),
            );
            return findings;
        }

        if let (Some(pinned_version), Some(latest_version)) =
            (Version::parse(pinned), Version::parse(&info.latest_version))
        {
            if pinned_version < latest_version {
                findings.push(
                    Finding::new(
                        Severity::Warning,
                        path,
                        FindingKind::OutdatedPin {
                            pinned: pinned.to_string(),
                            latest: info.latest_version.clone(),
                            released_at: info.latest_released_at(),
                        },
                    )
                    .with_line(requirement.line)
                    .with_package(requirement.canonical_name()),
                );
            }
        }

        findings
    }
}

/// A pin counts as published when a non-yanked release matches it.
/// Comparison is by parsed version where possible so `1.0` matches a
/// `1.0.0` release key.
fn is_published(info: &PackageInfo, pinned: &str) -> bool {
    if let Some(release) = info.releases.get(pinned) {
        if !release.yanked {
            return true;
        }
    }
    let Some(pinned_version) = Version::parse(pinned) else {
        return false;
    };
    info.releases.iter().any(|(version, release)| {
        !release.yanked && Version::parse(version).is_some_and(|v| v == pinned_version)
    })
}
