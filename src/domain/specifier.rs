//! Version specifier parsing for requirements declarations
//!
//! Handles the constraint grammar used by pip:
//! - Exact pin: `==1.35.3` (and wildcard form `==1.*`)
//! - Exclusion: `!=1.2.0`
//! - Bounds: `>=2.8.2`, `>1.0`, `<=3.0`, `<2.0`
//! - Compatible release: `~=1.4.2`
//! - Ranges: `>=1.0,<2.0`
//! - Unconstrained: no specifier at all

use crate::domain::Version;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static SPECIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(===|==|!=|~=|>=|<=|>|<)\s*([A-Za-z0-9._!*+-]+)$").unwrap());

/// Error produced when a specifier string does not parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version specifier '{spec}': {message}")]
pub struct SpecifierParseError {
    /// The offending specifier text
    pub spec: String,
    /// What was wrong with it
    pub message: String,
}

impl SpecifierParseError {
    fn new(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            message: message.into(),
        }
    }
}

/// Comparison operator of a single specifier clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Exact pin (`==`)
    Exact,
    /// Exclusion (`!=`)
    NotEqual,
    /// Lower bound, inclusive (`>=`)
    GreaterOrEqual,
    /// Lower bound, exclusive (`>`)
    Greater,
    /// Upper bound, inclusive (`<=`)
    LessOrEqual,
    /// Upper bound, exclusive (`<`)
    Less,
    /// Compatible release (`~=`)
    Compatible,
}

impl Operator {
    /// The operator as it appears in a manifest
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Exact => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterOrEqual => ">=",
            Operator::Greater => ">",
            Operator::LessOrEqual => "<=",
            Operator::Less => "<",
            Operator::Compatible => "~=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single comparison clause, e.g. `>=2.8.2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    /// Comparison operator
    pub op: Operator,
    /// Version text as written (may be a wildcard like `1.*` for `==`)
    pub version: String,
}

impl Specifier {
    /// Create a new specifier clause
    pub fn new(op: Operator, version: impl Into<String>) -> Self {
        Self {
            op,
            version: version.into(),
        }
    }

    /// Parse a single clause like `>=2.8.2`
    pub fn parse(input: &str) -> Result<Self, SpecifierParseError> {
        let trimmed = input.trim();
        let caps = SPECIFIER_RE
            .captures(trimmed)
            .ok_or_else(|| SpecifierParseError::new(trimmed, "unrecognized operator or version"))?;

        let op = match &caps[1] {
            // `===` is pip's arbitrary-equality escape hatch; treat as a pin
            "==" | "===" => Operator::Exact,
            "!=" => Operator::NotEqual,
            ">=" => Operator::GreaterOrEqual,
            ">" => Operator::Greater,
            "<=" => Operator::LessOrEqual,
            "<" => Operator::Less,
            "~=" => Operator::Compatible,
            _ => unreachable!(),
        };

        let version = caps[2].to_string();
        if version.contains('*') {
            if op != Operator::Exact && op != Operator::NotEqual {
                return Err(SpecifierParseError::new(
                    trimmed,
                    "wildcard versions are only valid with == or !=",
                ));
            }
        } else if Version::parse(&version).is_none() {
            return Err(SpecifierParseError::new(
                trimmed,
                format!("'{}' is not a valid version", version),
            ));
        }

        Ok(Self { op, version })
    }

    /// Returns true if the clause has a wildcard version (`==1.*`)
    pub fn is_wildcard(&self) -> bool {
        self.version.contains('*')
    }

    /// Check whether a concrete version satisfies this clause
    pub fn matches(&self, candidate: &Version) -> bool {
        if self.is_wildcard() {
            let prefix = self.version.trim_end_matches('*').trim_end_matches('.');
            let matched = match Version::parse(prefix) {
                Some(p) => p
                    .release
                    .iter()
                    .enumerate()
                    .all(|(i, seg)| candidate.release.get(i).copied().unwrap_or(0) == *seg),
                None => false,
            };
            return match self.op {
                Operator::NotEqual => !matched,
                _ => matched,
            };
        }

        let Some(bound) = Version::parse(&self.version) else {
            return false;
        };
        match self.op {
            Operator::Exact => *candidate == bound,
            Operator::NotEqual => *candidate != bound,
            Operator::GreaterOrEqual => *candidate >= bound,
            Operator::Greater => *candidate > bound,
            Operator::LessOrEqual => *candidate <= bound,
            Operator::Less => *candidate < bound,
            Operator::Compatible => *candidate >= bound && *candidate < bound.compatible_upper(),
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// Broad category of a full constraint, matching the shapes seen in
/// requirements files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Exact pin (`==1.35.3`)
    Pin,
    /// Lower bound only (`>=2.8.2`)
    LowerBound,
    /// Upper bound only (`<2.0`)
    UpperBound,
    /// Both bounds (`>=1.0,<2.0`)
    Range,
    /// No version constraint at all
    Unconstrained,
    /// Anything else (exclusions, compatible release, mixed clauses)
    Other,
}

/// A comma-separated set of specifier clauses attached to one declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecifierSet {
    /// Individual clauses in source order
    pub specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// An empty, unconstrained set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a full constraint string like `>=1.0, <2.0`
    ///
    /// Surrounding parentheses (the legacy `pkg (>=1.0)` form) are
    /// stripped first. An empty string yields an unconstrained set.
    pub fn parse(input: &str) -> Result<Self, SpecifierParseError> {
        let mut trimmed = input.trim();
        if trimmed.starts_with('(') && trimmed.ends_with(')') {
            trimmed = trimmed[1..trimmed.len() - 1].trim();
        }
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }

        let specifiers = trimmed
            .split(',')
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    /// Returns true if no constraint was given
    pub fn is_unconstrained(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Returns true for an exact non-wildcard pin
    pub fn is_pin(&self) -> bool {
        matches!(
            self.specifiers.as_slice(),
            [s] if s.op == Operator::Exact && !s.is_wildcard()
        )
    }

    /// The pinned version, if this is an exact pin
    pub fn pinned_version(&self) -> Option<&str> {
        if self.is_pin() {
            Some(&self.specifiers[0].version)
        } else {
            None
        }
    }

    /// Classify the overall constraint shape
    pub fn kind(&self) -> ConstraintKind {
        if self.is_unconstrained() {
            return ConstraintKind::Unconstrained;
        }
        if self.is_pin() {
            return ConstraintKind::Pin;
        }

        let lower = self.specifiers.iter().any(|s| {
            matches!(s.op, Operator::GreaterOrEqual | Operator::Greater)
        });
        let upper = self
            .specifiers
            .iter()
            .any(|s| matches!(s.op, Operator::LessOrEqual | Operator::Less));
        let only_bounds = self.specifiers.iter().all(|s| {
            matches!(
                s.op,
                Operator::GreaterOrEqual | Operator::Greater | Operator::LessOrEqual | Operator::Less
            )
        });

        match (only_bounds, lower, upper) {
            (true, true, true) => ConstraintKind::Range,
            (true, true, false) => ConstraintKind::LowerBound,
            (true, false, true) => ConstraintKind::UpperBound,
            _ => ConstraintKind::Other,
        }
    }

    /// Check whether a concrete version satisfies every clause
    pub fn matches(&self, candidate: &Version) -> bool {
        self.specifiers.iter().all(|s| s.matches(candidate))
    }

    /// Detect clauses that no version can satisfy simultaneously
    ///
    /// Computes the strongest lower and upper bound (pins and `~=` count
    /// as both) and reports the conflicting pair when the lower bound
    /// exceeds the upper one.
    pub fn contradiction(&self) -> Option<(String, String)> {
        // (version, inclusive, source clause)
        let mut lower: Option<(Version, bool, &Specifier)> = None;
        let mut upper: Option<(Version, bool, &Specifier)> = None;

        for spec in &self.specifiers {
            if spec.is_wildcard() {
                continue;
            }
            let Some(version) = Version::parse(&spec.version) else {
                continue;
            };
            let bounds: Vec<(bool, Version, bool)> = match spec.op {
                Operator::GreaterOrEqual => vec![(true, version, true)],
                Operator::Greater => vec![(true, version, false)],
                Operator::LessOrEqual => vec![(false, version, true)],
                Operator::Less => vec![(false, version, false)],
                Operator::Exact => {
                    vec![(true, version.clone(), true), (false, version, true)]
                }
                Operator::Compatible => {
                    let up = version.compatible_upper();
                    vec![(true, version, true), (false, up, false)]
                }
                Operator::NotEqual => continue,
            };

            for (is_lower, version, inclusive) in bounds {
                if is_lower {
                    let replace = match &lower {
                        Some((current, _, _)) => version > *current,
                        None => true,
                    };
                    if replace {
                        lower = Some((version, inclusive, spec));
                    }
                } else {
                    let replace = match &upper {
                        Some((current, _, _)) => version < *current,
                        None => true,
                    };
                    if replace {
                        upper = Some((version, inclusive, spec));
                    }
                }
            }
        }

        let (lo, lo_inclusive, lo_spec) = lower?;
        let (hi, hi_inclusive, hi_spec) = upper?;
        let conflicting = lo > hi || (lo == hi && !(lo_inclusive && hi_inclusive));
        if conflicting && lo_spec != hi_spec {
            Some((lo_spec.to_string(), hi_spec.to_string()))
        } else {
            None
        }
    }

    /// Canonical form used for cross-file comparison: clauses sorted and
    /// stripped of whitespace, so `>=1.0, <2.0` and `<2.0,>=1.0` compare
    /// equal
    pub fn canonical(&self) -> String {
        let mut clauses: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        clauses.sort();
        clauses.join(",")
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", clauses.join(","))
    }
}
