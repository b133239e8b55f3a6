//! Version-aware tag ordering
//!
//! Tags are accepted when they look like a version number: an optional `v`,
//! one to five numeric segments, and an optional suffix (`-beta.1`, `rc1`,
//! `+build`). Ordering is numeric per segment, so `1.10.0` sorts above `1.2.0`.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^v?(?P<core>\d{1,10}(?:\.\d{1,10}){0,4})(?P<suffix>$|[-+_ abrdp].*)$")
        .expect("valid regex")
});

/// A tag name parsed into comparable parts
#[derive(Debug, Clone)]
pub struct TagVersion {
    segments: Vec<u64>,
    /// Pre-release suffix; `None` for releases and build-metadata-only suffixes
    pre: Option<String>,
}

impl TagVersion {
    /// Parse a tag name, returning `None` when it does not look like a version.
    ///
    /// Examples:
    /// - "v1.2.3" -> [1, 2, 3]
    /// - "2.0" -> [2, 0]
    /// - "1.0.0-beta.2" -> [1, 0, 0] with pre-release "beta.2"
    /// - "release-notes" -> None
    pub fn parse(tag: &str) -> Option<Self> {
        let captures = VERSION_RE.captures(tag.trim())?;

        let segments = captures["core"]
            .split('.')
            .map(str::parse::<u64>)
            .collect::<Result<Vec<u64>, _>>()
            .ok()?;

        let suffix = &captures["suffix"];
        let pre = if suffix.is_empty() || suffix.starts_with('+') {
            None
        } else {
            let trimmed = suffix.trim_start_matches(['-', '_', ' ']);
            let without_build = trimmed.split('+').next().unwrap_or_default();
            Some(without_build.to_string()).filter(|p| !p.is_empty())
        };

        Some(Self { segments, pre })
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

/// Order two pre-release identifiers.
///
/// Numeric identifiers sort below alphanumeric ones and compare by value;
/// alphanumeric identifiers compare case-insensitively.
fn compare_identifier(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());

    match (numeric(a), numeric(b)) {
        (true, true) => {
            let (a, b) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a
            .bytes()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
    }
}

/// Order two pre-release suffixes identifier by identifier; a shorter
/// suffix sorts first when it is a prefix of the longer one.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut a_ids = a.split('.');
    let mut b_ids = b.split('.');
    loop {
        match (a_ids.next(), b_ids.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_identifier(x, y) {
                Ordering::Equal => continue,
                ordering => return ordering,
            },
        }
    }
}

impl Ord for TagVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
    }
}

impl PartialOrd for TagVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TagVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TagVersion {}

/// Keep only version-like tags and sort them highest first.
///
/// Tags comparing equal keep their input order.
pub fn sort_tags_by_version<'a, I>(tags: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut versions: Vec<(&str, TagVersion)> = tags
        .into_iter()
        .filter_map(|tag| TagVersion::parse(tag).map(|version| (tag, version)))
        .collect();

    versions.sort_by(|(_, a), (_, b)| b.cmp(a));
    versions.into_iter().map(|(tag, _)| tag).collect()
}

/// Find the highest version-like tag
pub fn find_latest_tag<'a, I>(tags: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    sort_tags_by_version(tags).into_iter().next()
}
