//! Lint finding types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Advisory; does not affect the exit code
    Warning,
    /// Must be fixed; drives a non-zero exit code
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What a finding is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "kebab-case")]
pub enum FindingKind {
    /// A declaration line that does not parse under the specifier grammar
    InvalidRequirement {
        /// Parser message
        message: String,
    },
    /// The same package declared twice in one file
    DuplicatePackage {
        /// Line of the first declaration
        first_line: usize,
    },
    /// Bounds within one declaration that no version satisfies
    ContradictoryBounds {
        /// The conflicting lower clause
        lower: String,
        /// The conflicting upper clause
        upper: String,
    },
    /// Dependency without an exact pin
    Unpinned {
        /// The constraint as written (empty when unconstrained)
        constraint: String,
    },
    /// Same package constrained differently in a sibling manifest
    VersionDrift {
        /// Constraint in this manifest
        constraint: String,
        /// The sibling manifest
        other_path: PathBuf,
        /// Constraint in the sibling manifest
        other_constraint: String,
    },
    /// Package declared here but absent from a sibling manifest
    MissingCounterpart {
        /// The sibling manifest lacking the declaration
        other_path: PathBuf,
    },
    /// Package name does not resolve on the registry
    UnknownPackage {
        /// Registry that was queried
        registry: String,
    },
    /// Exact pin names a version the registry has never published
    UnpublishedPin {
        /// The pinned version
        pinned: String,
    },
    /// Exact pin is older than the latest stable release
    OutdatedPin {
        /// The pinned version
        pinned: String,
        /// Latest stable version on the registry
        latest: String,
        /// When the latest version was released
        #[serde(skip_serializing_if = "Option::is_none")]
        released_at: Option<DateTime<Utc>>,
    },
}

impl FindingKind {
    /// Short machine-readable code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::InvalidRequirement { .. } => "invalid-requirement",
            FindingKind::DuplicatePackage { .. } => "duplicate-package",
            FindingKind::ContradictoryBounds { .. } => "contradictory-bounds",
            FindingKind::Unpinned { .. } => "unpinned",
            FindingKind::VersionDrift { .. } => "version-drift",
            FindingKind::MissingCounterpart { .. } => "missing-counterpart",
            FindingKind::UnknownPackage { .. } => "unknown-package",
            FindingKind::UnpublishedPin { .. } => "unpublished-pin",
            FindingKind::OutdatedPin { .. } => "outdated-pin",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::InvalidRequirement { message } => {
                write!(f, "invalid requirement: {}", message)
            }
            FindingKind::DuplicatePackage { first_line } => {
                write!(f, "already declared on line {}", first_line)
            }
            FindingKind::ContradictoryBounds { lower, upper } => {
                write!(f, "no version can satisfy both {} and {}", lower, upper)
            }
            FindingKind::Unpinned { constraint } => {
                if constraint.is_empty() {
                    write!(f, "no version constraint")
                } else {
                    write!(f, "not pinned to an exact version ({})", constraint)
                }
            }
            FindingKind::VersionDrift {
                constraint,
                other_path,
                other_constraint,
            } => write!(
                f,
                "constraint {} disagrees with {} in {}",
                constraint,
                other_constraint,
                other_path.display()
            ),
            FindingKind::MissingCounterpart { other_path } => {
                write!(f, "not declared in {}", other_path.display())
            }
            FindingKind::UnknownPackage { registry } => {
                write!(f, "not found on {}", registry)
            }
            FindingKind::UnpublishedPin { pinned } => {
                write!(f, "pinned version {} was never published", pinned)
            }
            FindingKind::OutdatedPin {
                pinned,
                latest,
                released_at,
            } => {
                write!(f, "pinned to {} but {} is available", pinned, latest)?;
                if let Some(date) = released_at {
                    write!(f, " (released {})", date.format("%Y-%m-%d"))?;
                }
                Ok(())
            }
        }
    }
}

/// A single lint diagnostic, bound to a manifest and usually a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Severity of the finding
    pub severity: Severity,
    /// Manifest the finding belongs to
    pub path: PathBuf,
    /// 1-based source line, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Package the finding is about, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// What the finding is about
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl Finding {
    /// Creates a new finding
    pub fn new(severity: Severity, path: impl Into<PathBuf>, kind: FindingKind) -> Self {
        Self {
            severity,
            path: path.into(),
            line: None,
            package: None,
            kind,
        }
    }

    /// Creates an error-severity finding
    pub fn error(path: impl Into<PathBuf>, kind: FindingKind) -> Self {
        Self::new(Severity::Error, path, kind)
    }

    /// Creates a warning-severity finding
    pub fn warning(path: impl Into<PathBuf>, kind: FindingKind) -> Self {
        Self::new(Severity::Warning, path, kind)
    }

    /// Attach a source line (builder pattern)
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a package name (builder pattern)
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Returns true for error-severity findings
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Short machine-readable code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}: ", self.severity)?;
        if let Some(package) = &self.package {
            write!(f, "{}: ", package)?;
        }
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_finding_builder() {
        let finding = Finding::error(
            "requirements.txt",
            FindingKind::DuplicatePackage { first_line: 3 },
        )
        .with_line(9)
        .with_package("openai");

        assert!(finding.is_error());
        assert_eq!(finding.line, Some(9));
        assert_eq!(finding.package.as_deref(), Some("openai"));
        assert_eq!(finding.code(), "duplicate-package");
    }

    #[test]
    fn test_finding_display() {
        let finding = Finding::error(
            "requirements.txt",
            FindingKind::VersionDrift {
                constraint: "==1.35.3".to_string(),
                other_path: PathBuf::from("requirements_dev.txt"),
                other_constraint: "==0.28.0".to_string(),
            },
        )
        .with_line(4)
        .with_package("openai");

        let text = finding.to_string();
        assert_eq!(
            text,
            "requirements.txt:4: error: openai: constraint ==1.35.3 disagrees \
             with ==0.28.0 in requirements_dev.txt"
        );
    }

    #[test]
    fn test_finding_display_without_line() {
        let finding = Finding::warning(
            "requirements.txt",
            FindingKind::Unpinned {
                constraint: String::new(),
            },
        )
        .with_package("streamlit");
        assert_eq!(
            finding.to_string(),
            "requirements.txt: warning: streamlit: no version constraint"
        );
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(
            FindingKind::InvalidRequirement {
                message: "x".into()
            }
            .code(),
            "invalid-requirement"
        );
        assert_eq!(
            FindingKind::MissingCounterpart {
                other_path: PathBuf::from("b.txt")
            }
            .code(),
            "missing-counterpart"
        );
        assert_eq!(
            FindingKind::UnknownPackage {
                registry: "PyPI".into()
            }
            .code(),
            "unknown-package"
        );
    }

    #[test]
    fn test_outdated_pin_display_with_date() {
        use chrono::TimeZone;
        let kind = FindingKind::OutdatedPin {
            pinned: "0.28.0".to_string(),
            latest: "1.35.3".to_string(),
            released_at: Some(Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap()),
        };
        assert_eq!(
            kind.to_string(),
            "pinned to 0.28.0 but 1.35.3 is available (released 2024-06-20)"
        );
    }

    #[test]
    fn test_serde_finding() {
        let finding = Finding::error(
            "requirements.txt",
            FindingKind::UnpublishedPin {
                pinned: "9.9.9".to_string(),
            },
        )
        .with_package("httpx");

        let json = serde_json::to_string(&finding).unwrap();
        assert!(json.contains("\"code\":\"unpublished-pin\""));
        let parsed: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, finding);
    }
}
