//! Manifest file detection
//!
//! Finds pip requirements manifests in a project directory. Detection
//! covers the common layouts: `requirements.txt` and its suffixed
//! variants (`requirements_dev.txt`, `requirements-test.txt`), dotted
//! prefixes (`prod.requirements.txt`), `constraints.txt`, and files
//! under a `requirements/` subdirectory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IoError;

/// A detected manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Path to the manifest file
    pub path: PathBuf,
    /// File name, for display
    pub name: String,
}

impl ManifestInfo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Detects requirements manifests in the given directory.
///
/// Results are sorted by path so runs are deterministic.
pub fn detect_manifests(dir: &Path) -> Result<Vec<ManifestInfo>, IoError> {
    if !dir.is_dir() {
        return Err(IoError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut manifests = Vec::new();
    collect_from_dir(dir, &mut manifests)?;

    // requirements/ subdirectory convention (requirements/base.txt etc.)
    let subdir = dir.join("requirements");
    if subdir.is_dir() {
        for entry in read_dir(&subdir)? {
            let path = entry.path();
            if path.is_file() && has_txt_extension(&path) {
                manifests.push(ManifestInfo::new(path));
            }
        }
    }

    manifests.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(manifests)
}

fn collect_from_dir(dir: &Path, manifests: &mut Vec<ManifestInfo>) -> Result<(), IoError> {
    for entry in read_dir(dir)? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if is_manifest_name(name) {
                manifests.push(ManifestInfo::new(path));
            }
        }
    }
    Ok(())
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>, IoError> {
    let entries = fs::read_dir(dir).map_err(|source| IoError::Generic {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut result = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IoError::Generic {
            path: dir.to_path_buf(),
            source,
        })?;
        result.push(entry);
    }
    Ok(result)
}

/// Matches requirements*.txt, *.requirements.txt and constraints.txt
fn is_manifest_name(name: &str) -> bool {
    if name == "constraints.txt" {
        return true;
    }
    // Dotted prefix convention (prod.requirements.txt)
    if name.ends_with(".requirements.txt") && name.len() > ".requirements.txt".len() {
        return true;
    }
    if let Some(stem) = name.strip_suffix(".txt") {
        if let Some(rest) = stem.strip_prefix("requirements") {
            // Bare name, or a suffix introduced by a separator
            return rest.is_empty() || rest.starts_with('-') || rest.starts_with('_');
        }
    }
    false
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("txt")
}
