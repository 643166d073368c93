//! PEP 440 style version numbers
//!
//! Parses the subset of PEP 440 that appears in real requirements files:
//! - Release segments: `1`, `1.2`, `1.35.3`
//! - Optional epoch: `2!1.0`
//! - Pre-releases: `1.0a1`, `1.0b2`, `1.0rc1`
//! - Post and dev releases: `1.0.post1`, `1.0.dev3`
//!
//! Ordering follows PEP 440: dev < pre-release < final < post, with
//! release segments compared numerically and zero-padded.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[._-]?(?P<pre_kind>a|alpha|b|beta|rc|c|pre|preview)[._-]?(?P<pre_num>\d*))?
        (?:[._-]?post[._-]?(?P<post>\d*))?
        (?:[._-]?dev[._-]?(?P<dev>\d*))?
        $",
    )
    .unwrap()
});

/// Pre-release phase, in sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreKind {
    /// Alpha release (`a`, `alpha`)
    Alpha,
    /// Beta release (`b`, `beta`)
    Beta,
    /// Release candidate (`rc`, `c`, `pre`, `preview`)
    Rc,
}

/// A parsed PEP 440 version
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version epoch (almost always 0)
    pub epoch: u64,
    /// Dot-separated numeric release segments
    pub release: Vec<u64>,
    /// Pre-release marker, if any
    pub pre: Option<(PreKind, u64)>,
    /// Post-release number, if any
    pub post: Option<u64>,
    /// Dev-release number, if any
    pub dev: Option<u64>,
}

impl Version {
    /// Parse a version string, returning None on anything outside the grammar
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        // Leading 'v' shows up in the wild even though PEP 440 forbids it
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let lowered = trimmed.to_ascii_lowercase();
        let caps = VERSION_RE.captures(&lowered)?;

        let epoch = caps
            .name("epoch")
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(0))?;

        let release = caps
            .name("release")?
            .as_str()
            .split('.')
            .map(|s| s.parse().ok())
            .collect::<Option<Vec<u64>>>()?;

        let pre = caps.name("pre_kind").map(|kind| {
            let kind = match kind.as_str() {
                "a" | "alpha" => PreKind::Alpha,
                "b" | "beta" => PreKind::Beta,
                _ => PreKind::Rc,
            };
            let num = caps
                .name("pre_num")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            (kind, num)
        });

        let post = caps
            .name("post")
            .map(|m| m.as_str().parse().unwrap_or(0));
        let dev = caps.name("dev").map(|m| m.as_str().parse().unwrap_or(0));

        Some(Self {
            epoch,
            release,
            pre,
            post,
            dev,
        })
    }

    /// Returns the release segment at the given index, treating missing
    /// segments as zero (so `1.0` and `1.0.0` compare equal)
    fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Returns true for alpha/beta/rc/dev versions
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The exclusive upper bound implied by a compatible release clause
    /// (`~=`): the release with its last segment dropped and the new last
    /// segment incremented. `~=1.4.2` allows up to (not including) `1.5`.
    pub fn compatible_upper(&self) -> Self {
        let mut release = self.release.clone();
        if release.len() > 1 {
            release.pop();
        }
        if let Some(last) = release.last_mut() {
            *last += 1;
        }
        Self {
            epoch: self.epoch,
            release,
            pre: None,
            post: None,
            dev: None,
        }
    }

    /// Phase rank used for ordering: dev < pre < final < post
    fn phase_rank(&self) -> u8 {
        if self.pre.is_some() {
            1
        } else if self.dev.is_some() {
            0
        } else if self.post.is_some() {
            3
        } else {
            2
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.epoch != other.epoch {
            return self.epoch.cmp(&other.epoch);
        }

        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }

        match self.phase_rank().cmp(&other.phase_rank()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // Same phase: compare within it
        match (&self.pre, &other.pre) {
            (Some(a), Some(b)) if a != b => return a.cmp(b),
            _ => {}
        }
        match (self.post, other.post) {
            (Some(a), Some(b)) if a != b => return a.cmp(&b),
            _ => {}
        }
        // A dev tag sorts before the same version without one
        match (self.dev, other.dev) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with cmp: 1.0 and 1.0.0 are the same version
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((kind, num)) = &self.pre {
            let tag = match kind {
                PreKind::Alpha => "a",
                PreKind::Beta => "b",
                PreKind::Rc => "rc",
            };
            write!(f, "{}{}", tag, num)?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let version = v("1.35.3");
        assert_eq!(version.release, vec![1, 35, 3]);
        assert_eq!(version.epoch, 0);
        assert!(version.pre.is_none());
    }

    #[test]
    fn test_parse_two_segments() {
        let version = v("2.0");
        assert_eq!(version.release, vec![2, 0]);
    }

    #[test]
    fn test_parse_epoch() {
        let version = v("2!1.0");
        assert_eq!(version.epoch, 2);
        assert_eq!(version.release, vec![1, 0]);
    }

    #[test]
    fn test_parse_prerelease() {
        assert_eq!(v("1.0a1").pre, Some((PreKind::Alpha, 1)));
        assert_eq!(v("1.0b2").pre, Some((PreKind::Beta, 2)));
        assert_eq!(v("1.0rc1").pre, Some((PreKind::Rc, 1)));
        assert_eq!(v("1.0.rc1").pre, Some((PreKind::Rc, 1)));
    }

    #[test]
    fn test_parse_post_and_dev() {
        assert_eq!(v("1.0.post2").post, Some(2));
        assert_eq!(v("1.0.dev3").dev, Some(3));
    }

    #[test]
    fn test_parse_v_prefix() {
        assert_eq!(v("v1.2.3"), v("1.2.3"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(v("1.0RC1"), v("1.0rc1"));
        assert_eq!(v("2.0.Post1"), v("2.0.post1"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Version::parse("not-a-version").is_none());
        assert!(Version::parse("").is_none());
        assert!(Version::parse("1.*").is_none());
    }

    #[test]
    fn test_ordering_basic() {
        assert!(v("0.28.0") < v("1.35.3"));
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("2.0") > v("1.999.999"));
    }

    #[test]
    fn test_ordering_zero_padding() {
        assert_eq!(v("1.0").cmp(&v("1.0.0")), Ordering::Equal);
        assert!(v("1.0") < v("1.0.1"));
    }

    #[test]
    fn test_ordering_epoch_dominates() {
        assert!(v("1!0.1") > v("999.0"));
    }

    #[test]
    fn test_ordering_prerelease_before_final() {
        assert!(v("1.0a1") < v("1.0"));
        assert!(v("1.0b1") < v("1.0rc1"));
        assert!(v("1.0a2") < v("1.0b1"));
        assert!(v("1.0rc1") < v("1.0"));
    }

    #[test]
    fn test_ordering_dev_before_prerelease() {
        assert!(v("1.0.dev1") < v("1.0a1"));
        assert!(v("1.0.dev1") < v("1.0"));
    }

    #[test]
    fn test_ordering_post_after_final() {
        assert!(v("1.0.post1") > v("1.0"));
        assert!(v("1.0.post1") < v("1.0.1"));
    }

    #[test]
    fn test_is_prerelease() {
        assert!(v("1.0a1").is_prerelease());
        assert!(v("1.0.dev1").is_prerelease());
        assert!(!v("1.0").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
    }

    #[test]
    fn test_compatible_upper() {
        assert_eq!(v("1.4.2").compatible_upper(), v("1.5"));
        assert_eq!(v("2.2").compatible_upper(), v("3"));
        assert_eq!(v("2").compatible_upper(), v("3"));
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["1.35.3", "0.28.0", "2!1.0", "1.0a1", "1.0.post2", "1.0.dev3"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn test_sorting() {
        let mut versions = vec![v("1.10.0"), v("0.28.0"), v("1.35.3"), v("1.9.0")];
        versions.sort();
        let strings: Vec<String> = versions.iter().map(|x| x.to_string()).collect();
        assert_eq!(strings, vec!["0.28.0", "1.9.0", "1.10.0", "1.35.3"]);
    }

    #[test]
    fn test_from_str() {
        let version: Version = "1.2.3".parse().unwrap();
        assert_eq!(version, v("1.2.3"));
        assert!("garbage".parse::<Version>().is_err());
    }

    #[test]
    fn test_serde_version() {
        let version = v("1.35.3");
        let json = serde_json::to_string(&version).unwrap();
        let parsed: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, version);
    }
}
