//! Package registry integration
//!
//! Optional verification of pinned versions against the live registry.
//! The `Registry` trait abstracts the registry API so checks can be
//! tested against a mock.

pub mod check;
pub mod client;
pub mod pypi;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RegistryError;

pub use check::RegistryChecker;
pub use client::HttpClient;
pub use pypi::PyPiRegistry;

/// A single published release of a package
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseInfo {
    /// Upload time of the release, when the registry reports one
    pub released_at: Option<DateTime<Utc>>,
    /// Whether the release was yanked
    pub yanked: bool,
}

/// Registry metadata for one package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInfo {
    /// Package name as the registry reports it
    pub name: String,
    /// The registry's current latest version
    pub latest_version: String,
    /// All published releases keyed by version string
    pub releases: HashMap<String, ReleaseInfo>,
}

impl PackageInfo {
    /// Release date of the latest version, if known
    pub fn latest_released_at(&self) -> Option<DateTime<Utc>> {
        self.releases
            .get(&self.latest_version)
            .and_then(|r| r.released_at)
    }
}

/// Package registry adapter
#[async_trait]
pub trait Registry: Send + Sync {
    /// Registry name for display ("PyPI")
    fn name(&self) -> &str;

    /// Fetches metadata for a package by its canonical name.
    async fn fetch_package(&self, package: &str) -> Result<PackageInfo, RegistryError>;
}
