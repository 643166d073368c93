//! PyPI registry adapter
//!
//! Uses the pypi.org JSON API: `GET /pypi/{package}/json`. The
//! canonical package name works directly in the URL because PyPI
//! normalizes lookups.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::RegistryError;

use super::{HttpClient, PackageInfo, Registry, ReleaseInfo};

const PYPI_API_BASE: &str = "https://pypi.org/pypi";
const REGISTRY_NAME: &str = "PyPI";

pub struct PyPiRegistry {
    client: HttpClient,
    base_url: String,
}

impl PyPiRegistry {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: PYPI_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL, for tests against a local server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_response(&self, package: &str, body: &Value) -> Result<PackageInfo, RegistryError> {
        let info = body
            .get("info")
            .ok_or_else(|| self.invalid(package, "missing 'info' object"))?;

        let name = info
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(package)
            .to_string();

        let latest_version = info
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid(package, "missing 'info.version'"))?
            .to_string();

        let mut releases = HashMap::new();
        if let Some(release_map) = body.get("releases").and_then(Value::as_object) {
            for (version, files) in release_map {
                releases.insert(version.clone(), parse_release(files));
            }
        }

        Ok(PackageInfo {
            name,
            latest_version,
            releases,
        })
    }

    fn invalid(&self, package: &str, message: &str) -> RegistryError {
        RegistryError::InvalidResponse {
            package: package.to_string(),
            registry: REGISTRY_NAME.to_string(),
            message: message.to_string(),
        }
    }
}

/// Release date is the earliest upload time across the release's files.
/// A release is yanked only when every file is yanked.
fn parse_release(files: &Value) -> ReleaseInfo {
    let files = match files.as_array() {
        Some(files) if !files.is_empty() => files,
        // Releases with no files exist on PyPI (deleted uploads)
        _ => {
            return ReleaseInfo {
                released_at: None,
                yanked: false,
            }
        }
    };

    let released_at = files
        .iter()
        .filter_map(|f| f.get("upload_time_iso_8601").and_then(Value::as_str))
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .min();

    let yanked = files
        .iter()
        .all(|f| f.get("yanked").and_then(Value::as_bool).unwrap_or(false));

    ReleaseInfo {
        released_at,
        yanked,
    }
}

#[async_trait]
impl Registry for PyPiRegistry {
    fn name(&self) -> &str {
        REGISTRY_NAME
    }

    async fn fetch_package(&self, package: &str) -> Result<PackageInfo, RegistryError> {
        let url = format!("{}/{}/json", self.base_url, package);
        let body = self.client.get_json(&url, package, REGISTRY_NAME).await?;
        self.parse_response(package, &body)
    }
}
