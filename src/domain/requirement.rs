//! Dependency declaration structures

use super::SpecifierSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static NAME_SEPARATORS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalize a package name per PEP 503: lowercase, with runs of `-`,
/// `_` and `.` collapsed to a single `-`. `Python-DateUtil` and
/// `python_dateutil` name the same package.
pub fn canonicalize_name(name: &str) -> String {
    NAME_SEPARATORS_RE
        .replace_all(&name.to_ascii_lowercase(), "-")
        .into_owned()
}

/// A single dependency declaration from a requirements manifest:
/// package identifier, version constraint and optional annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name as written in the manifest
    pub name: String,
    /// Requested extras (`requests[socks]`)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extras: Vec<String>,
    /// Version constraint
    pub specifiers: SpecifierSet,
    /// Environment marker, kept verbatim and not evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Trailing comment from the manifest line, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 1-based line number in the source file
    pub line: usize,
}

impl Requirement {
    /// Creates a new requirement
    pub fn new(name: impl Into<String>, specifiers: SpecifierSet, line: usize) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            specifiers,
            marker: None,
            comment: None,
            line,
        }
    }

    /// Attach extras (builder pattern)
    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }

    /// Attach an environment marker (builder pattern)
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Attach a trailing comment (builder pattern)
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The PEP 503 canonical name, used for all cross-declaration
    /// comparisons
    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }

    /// Returns true if this declaration pins an exact version
    pub fn is_pinned(&self) -> bool {
        self.specifiers.is_pin()
    }

    /// The pinned version string, if any
    pub fn pinned_version(&self) -> Option<&str> {
        self.specifiers.pinned_version()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if !self.specifiers.is_unconstrained() {
            write!(f, "{}", self.specifiers)?;
        }
        if let Some(marker) = &self.marker {
            write!(f, " ; {}", marker)?;
        }
        Ok(())
    }
}
