//! "Stable tag" header extraction from a WordPress-style readme
//!
//! ```text
//! === My Plugin ===
//! Requires at least: 5.0
//! Stable tag: 1.4.2
//! ```

use std::sync::LazyLock;

use regex::Regex;

static STABLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t*#>-]*stable[ \t]+tag[ \t]*:\**[ \t]*(?P<tag>\S.*?)[ \t\r]*$")
        .expect("valid regex")
});

/// Return the value of the first `Stable tag:` header, if any.
///
/// Header names are matched case-insensitively and may be decorated with
/// Markdown emphasis or list markers.
pub fn parse_stable_tag(readme: &str) -> Option<String> {
    STABLE_TAG_RE
        .captures(readme)
        .map(|captures| captures["tag"].trim_matches('*').trim().to_string())
        .filter(|tag| !tag.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("=== Plugin ===\nStable tag: 1.4.2\nLicense: GPL", Some("1.4.2"))]
    #[case("stable TAG:trunk", Some("trunk"))]
    #[case("Contributors: me\n  Stable tag:   v2.0.0  \r\n", Some("v2.0.0"))]
    #[case("* **Stable tag:** 3.1", Some("3.1"))]
    #[case("Stable tag: 1.0\nStable tag: 2.0", Some("1.0"))]
    #[case("Tested up to: 6.5", None)]
    #[case("Stable tag:   \nNext line", None)]
    #[case("This is not a Stable tag: 9.9 header", None)]
    #[case("", None)]
    fn parse_stable_tag_returns_expected(#[case] readme: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_stable_tag(readme).as_deref(), expected);
    }
}
