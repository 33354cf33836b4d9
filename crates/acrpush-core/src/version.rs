//! Next-tag suggestions derived from a repository's existing tags.
//!
//! Only tags of the exact shape `MAJOR.MINOR.PATCH` (three runs of ASCII
//! digits) take part. Anything else, `v1.2.3`, `1.2`, `1.2.3-rc1`,
//! `latest`, is ignored rather than partially parsed.

use std::fmt;
use std::str::FromStr;

/// Label of the trailing option that opens the custom tag input.
pub const CUSTOM_TAG: &str = "Custom tag";

/// Offered when no existing tag is a semantic version.
pub const SEED_TAGS: [&str; 3] = ["0.0.1", "0.1.0", "1.0.0"];

/// A `MAJOR.MINOR.PATCH` triple, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a MAJOR.MINOR.PATCH version: {0:?}")]
pub struct ParseSemVerError(String);

impl FromStr for SemVer {
    type Err = ParseSemVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSemVerError(s.to_owned());
        let mut parts = s.split('.');
        let mut next = || -> Result<u64, ParseSemVerError> {
            let part = parts.next().ok_or_else(err)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            part.parse().map_err(|_| err())
        };

        let version = SemVer::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(version)
    }
}

/// Highest semantic version among `tags`, if any tag has that shape.
pub fn max_semantic_version<I, S>(tags: I) -> Option<SemVer>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| tag.as_ref().parse::<SemVer>().ok())
        .max()
}

/// Patch, minor and major bumps of `base`, in that order.
pub fn suggest_next_versions(base: SemVer) -> [String; 3] {
    let SemVer {
        major,
        minor,
        patch,
    } = base;
    [
        SemVer::new(major, minor, patch.saturating_add(1)).to_string(),
        SemVer::new(major, minor.saturating_add(1), 0).to_string(),
        SemVer::new(major.saturating_add(1), 0, 0).to_string(),
    ]
}

/// Options shown under a repository: three suggested tags, then [`CUSTOM_TAG`].
pub fn build_tag_options<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options: Vec<String> = match max_semantic_version(tags) {
        Some(max) => suggest_next_versions(max).into(),
        None => SEED_TAGS.iter().map(|s| (*s).to_owned()).collect(),
    };
    options.push(CUSTOM_TAG.to_owned());
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_three_numeric_parts() {
        assert_eq!("1.2.3".parse::<SemVer>().unwrap(), SemVer::new(1, 2, 3));
        assert_eq!("01.0.10".parse::<SemVer>().unwrap(), SemVer::new(1, 0, 10));
        for bad in ["1.2", "1.2.3.4", "v1.2.3", "1.2.3-rc1", "1..3", "", "a.b.c", "1.2.+3", " 1.2.3"] {
            assert!(bad.parse::<SemVer>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn max_uses_numeric_ordering() {
        let tags = ["1.2.3", "1.2.10", "bogus", "1.2.3.4"];
        assert_eq!(max_semantic_version(tags), Some(SemVer::new(1, 2, 10)));
        assert_eq!(
            build_tag_options(tags),
            vec!["1.2.11", "1.3.0", "2.0.0", CUSTOM_TAG]
        );
    }

    #[test]
    fn seeds_when_nothing_parses() {
        let tags = ["latest", "v2", "main-abc123"];
        assert_eq!(max_semantic_version(tags), None);
        assert_eq!(
            build_tag_options(tags),
            vec!["0.0.1", "0.1.0", "1.0.0", CUSTOM_TAG]
        );
        assert_eq!(
            build_tag_options(Vec::<String>::new()),
            vec!["0.0.1", "0.1.0", "1.0.0", CUSTOM_TAG]
        );
    }

    #[test]
    fn suggestions_reset_lower_components() {
        assert_eq!(
            suggest_next_versions(SemVer::new(3, 7, 9)),
            ["3.7.10", "3.8.0", "4.0.0"]
        );
    }
}
