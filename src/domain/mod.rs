//! Core domain models for reqlint
//!
//! This module contains the fundamental types used throughout the application:
//! - PEP 440 version numbers with total ordering
//! - Version specifiers and specifier sets
//! - Dependency declaration structures
//! - Lint findings with severity
//! - Per-file and overall result aggregation

mod finding;
mod requirement;
mod specifier;
mod summary;
mod version;

pub use finding::{Finding, FindingKind, Severity};
pub use requirement::{canonicalize_name, Requirement};
pub use specifier::{ConstraintKind, Operator, Specifier, SpecifierParseError, SpecifierSet};
pub use summary::{LintSummary, ManifestReport};
pub use version::{PreKind, Version};
