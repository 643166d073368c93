//! Parser for pip requirements.txt manifests
//!
//! Handles the line-oriented requirements grammar: comments, backslash
//! continuations, extras, version specifiers, environment markers and
//! pip option lines. Malformed requirement lines are reported as
//! findings rather than aborting the whole file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{
    Finding, FindingKind, ManifestReport, Requirement, Severity, SpecifierSet,
};
use crate::error::ManifestError;

/// Matches a requirement line: name, optional extras, the rest
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        (?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)
        (?:\[(?P<extras>[^\]]*)\])?
        \s*
        (?P<rest>.*)$",
    )
    .unwrap()
});

/// Matches pip option lines such as `-r other.txt` or `--index-url ...`
static OPTION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{1,2}[A-Za-z]").unwrap());

/// Outcome of parsing a single manifest body
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub requirements: Vec<Requirement>,
    pub findings: Vec<Finding>,
    pub skipped_lines: usize,
}

/// Parser for requirements.txt-style manifests
pub struct RequirementsParser {
    path: PathBuf,
}

impl RequirementsParser {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses manifest content into requirements and findings.
    ///
    /// Line numbers refer to the physical line where a logical line
    /// starts, so continuation-joined requirements report the first line.
    pub fn parse_content(&self, content: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        for (start_line, logical) in logical_lines(content) {
            let trimmed = logical.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Full-line comments carry no requirement
            if trimmed.starts_with('#') {
                continue;
            }

            // pip options (-r, -c, -e, --index-url, ...) are outside the
            // linting scope but counted so verbose output can mention them
            if OPTION_LINE_RE.is_match(trimmed) {
                outcome.skipped_lines += 1;
                continue;
            }

            // Direct URL and local path requirements carry no comparable
            // version constraint
            if is_url_or_path(trimmed) {
                outcome.skipped_lines += 1;
                continue;
            }

            match self.parse_requirement_line(trimmed, start_line) {
                Ok(requirement) => outcome.requirements.push(requirement),
                Err(message) => {
                    outcome.findings.push(
                        Finding::new(
                            Severity::Error,
                            &self.path,
                            FindingKind::InvalidRequirement { message },
                        )
                        .with_line(start_line),
                    );
                }
            }
        }

        outcome
    }

    fn parse_requirement_line(&self, line: &str, line_number: usize) -> Result<Requirement, String> {
        // Split off an inline comment first; '#' inside markers is not
        // valid requirements syntax so a bare split is sufficient
        let (body, comment) = split_inline_comment(line);
        let body = body.trim();
        if body.is_empty() {
            return Err("requirement line contains only a comment".to_string());
        }

        // Environment marker comes after ';'
        let (body, marker) = match body.split_once(';') {
            Some((req, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err("empty environment marker after ';'".to_string());
                }
                (req.trim(), Some(marker.to_string()))
            }
            None => (body, None),
        };

        let captures = REQUIREMENT_RE
            .captures(body)
            .ok_or_else(|| format!("unrecognized requirement syntax: '{}'", body))?;

        let name = captures.name("name").map(|m| m.as_str().to_string());
        let Some(name) = name else {
            return Err(format!("missing package name: '{}'", body));
        };

        let extras: Vec<String> = captures
            .name("extras")
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rest = captures
            .name("rest")
            .map(|m| m.as_str().trim())
            .unwrap_or("");

        // An unmatched '[' means the name regex stopped early
        if rest.starts_with('[') {
            return Err(format!("unterminated extras list: '{}'", body));
        }

        let specifiers = if rest.is_empty() {
            SpecifierSet::empty()
        } else {
            SpecifierSet::parse(rest).map_err(|e| e.to_string())?
        };

        let mut requirement = Requirement::new(name, specifiers, line_number);
        if !extras.is_empty() {
            requirement = requirement.with_extras(extras);
        }
        if let Some(marker) = marker {
            requirement = requirement.with_marker(marker);
        }
        if let Some(comment) = comment {
            requirement = requirement.with_comment(comment);
        }
        Ok(requirement)
    }
}

/// Reads and parses a manifest file into a report.
pub fn parse_manifest(path: &Path) -> Result<ManifestReport, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::not_found(path));
    }
    let content =
        fs::read_to_string(path).map_err(|source| ManifestError::read_error(path, source))?;

    let parser = RequirementsParser::new(path);
    let outcome = parser.parse_content(&content);

    let mut report = ManifestReport::new(path);
    report.requirements = outcome.requirements;
    report.skipped_lines = outcome.skipped_lines;
    for finding in outcome.findings {
        report.add_finding(finding);
    }
    Ok(report)
}

/// Joins backslash-continued physical lines into logical lines,
/// keeping the physical line number of each logical line's start.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut result = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_number = idx + 1;
        let continued = raw.trim_end().ends_with('\\');
        let body = if continued {
            raw.trim_end().trim_end_matches('\\')
        } else {
            raw
        };

        match pending.take() {
            Some((start, mut acc)) => {
                acc.push(' ');
                acc.push_str(body.trim());
                if continued {
                    pending = Some((start, acc));
                } else {
                    result.push((start, acc));
                }
            }
            None => {
                if continued {
                    pending = Some((line_number, body.trim().to_string()));
                } else {
                    result.push((line_number, body.to_string()));
                }
            }
        }
    }

    // Trailing backslash on the last line
    if let Some(entry) = pending {
        result.push(entry);
    }
    result
}

/// Splits an inline comment off a requirement body.
///
/// pip only recognizes a comment when the '#' is at line start or
/// preceded by whitespace.
fn split_inline_comment(line: &str) -> (&str, Option<String>) {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            let comment = line[i + 1..].trim().to_string();
            let comment = if comment.is_empty() { None } else { Some(comment) };
            return (&line[..i], comment);
        }
    }
    (line, None)
}

fn is_url_or_path(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("git+")
        || lower.starts_with("file:")
        || line.starts_with("./")
        || line.starts_with("../")
        || line.starts_with('/')
        || line.contains(" @ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConstraintKind;

    fn parse(content: &str) -> ParseOutcome {
        RequirementsParser::new("requirements.txt").parse_content(content)
    }

    #[test]
    fn test_parse_pinned_requirement() {
        let outcome = parse("openai==1.35.3\n");
        assert_eq!(outcome.requirements.len(), 1);
        let req = &outcome.requirements[0];
        assert_eq!(req.name, "openai");
        assert!(req.is_pinned());
        assert_eq!(req.pinned_version(), Some("1.35.3"));
        assert_eq!(req.line, 1);
    }

    #[test]
    fn test_parse_unconstrained_requirement() {
        let outcome = parse("requests\n");
        assert_eq!(outcome.requirements.len(), 1);
        assert_eq!(
            outcome.requirements[0].specifiers.kind(),
            ConstraintKind::Unconstrained
        );
    }

    #[test]
    fn test_parse_range_requirement() {
        let outcome = parse("urllib3>=1.26,<2.0\n");
        let req = &outcome.requirements[0];
        assert_eq!(req.name, "urllib3");
        assert_eq!(req.specifiers.kind(), ConstraintKind::Range);
    }

    #[test]
    fn test_blank_lines_and_comments_ignored() {
        let outcome = parse("# header\n\nopenai==1.35.3\n   # indented comment\n");
        assert_eq!(outcome.requirements.len(), 1);
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.skipped_lines, 0);
    }

    #[test]
    fn test_inline_comment_captured() {
        let outcome = parse("urllib3<2.0  # boto3 is not ready for urllib3 v2\n");
        let req = &outcome.requirements[0];
        assert_eq!(
            req.comment.as_deref(),
            Some("boto3 is not ready for urllib3 v2")
        );
        assert_eq!(req.specifiers.to_string(), "<2.0");
    }

    #[test]
    fn test_hash_inside_version_is_not_comment() {
        // '#' not preceded by whitespace stays part of the line
        let outcome = parse("pkg==1.0#egg\n");
        assert_eq!(outcome.requirements.len(), 0);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_extras_parsed() {
        let outcome = parse("uvicorn[standard]==0.23.2\n");
        let req = &outcome.requirements[0];
        assert_eq!(req.name, "uvicorn");
        assert_eq!(req.extras, vec!["standard"]);
    }

    #[test]
    fn test_multiple_extras() {
        let outcome = parse("celery[redis, msgpack]>=5.3\n");
        let req = &outcome.requirements[0];
        assert_eq!(req.extras, vec!["redis", "msgpack"]);
    }

    #[test]
    fn test_environment_marker_preserved() {
        let outcome = parse("dataclasses==0.8 ; python_version < \"3.7\"\n");
        let req = &outcome.requirements[0];
        assert_eq!(req.name, "dataclasses");
        assert_eq!(req.marker.as_deref(), Some("python_version < \"3.7\""));
    }

    #[test]
    fn test_continuation_lines_joined() {
        let outcome = parse("openai \\\n    ==1.35.3\nhttpx==0.23.3\n");
        assert_eq!(outcome.requirements.len(), 2);
        assert_eq!(outcome.requirements[0].name, "openai");
        assert_eq!(outcome.requirements[0].pinned_version(), Some("1.35.3"));
        assert_eq!(outcome.requirements[0].line, 1);
        assert_eq!(outcome.requirements[1].line, 3);
    }

    #[test]
    fn test_option_lines_skipped() {
        let outcome = parse("-r base.txt\n--index-url https://pypi.internal/simple\n-e .\nopenai==1.35.3\n");
        assert_eq!(outcome.requirements.len(), 1);
        assert_eq!(outcome.skipped_lines, 3);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_url_requirements_skipped() {
        let outcome = parse(
            "git+https://github.com/psf/requests.git\nhttps://example.com/pkg-1.0.tar.gz\npkg @ https://example.com/pkg.whl\n",
        );
        assert_eq!(outcome.requirements.len(), 0);
        assert_eq!(outcome.skipped_lines, 3);
    }

    #[test]
    fn test_invalid_line_becomes_finding() {
        let outcome = parse("openai==1.35.3\n===???\n");
        assert_eq!(outcome.requirements.len(), 1);
        assert_eq!(outcome.findings.len(), 1);
        let finding = &outcome.findings[0];
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.line, Some(2));
        assert_eq!(finding.code(), "invalid-requirement");
    }

    #[test]
    fn test_invalid_specifier_becomes_finding() {
        let outcome = parse("openai==\n");
        assert_eq!(outcome.requirements.len(), 0);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_unterminated_extras_is_invalid() {
        let outcome = parse("uvicorn[standard==0.23.2\n");
        assert_eq!(outcome.requirements.len(), 0);
        assert_eq!(outcome.findings.len(), 1);
    }

    #[test]
    fn test_parenthesized_specifiers() {
        // Legacy PEP 508 form still seen in older manifests
        let outcome = parse("requests (>=2.8.1)\n");
        assert_eq!(outcome.requirements.len(), 1);
        assert_eq!(outcome.requirements[0].specifiers.to_string(), ">=2.8.1");
    }

    #[test]
    fn test_dotted_and_underscored_names() {
        let outcome = parse("zope.interface==5.4.0\ntyping_extensions>=4.0\n");
        assert_eq!(outcome.requirements.len(), 2);
        assert_eq!(outcome.requirements[0].canonical_name(), "zope-interface");
        assert_eq!(outcome.requirements[1].canonical_name(), "typing-extensions");
    }

    #[test]
    fn test_parse_manifest_missing_file() {
        let err = parse_manifest(Path::new("/no/such/requirements.txt")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_parse_manifest_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "openai==1.35.3\nsupabase==1.0.3\n-r extra.txt\n").unwrap();

        let report = parse_manifest(&path).unwrap();
        assert_eq!(report.requirements.len(), 2);
        assert_eq!(report.skipped_lines, 1);
        assert!(report.is_clean());
    }
}
