//! Page title resolution.
//!
//! A title can come from four places, tried in order until one tier yields
//! a non-empty string:
//!
//! 1. explicit `<!-- TITLE:... -->` markers in the body
//! 2. explicit markers in the header
//! 3. heading text in the header
//! 4. heading text in the body
//!
//! Within a tier, every occurrence is captured and the captures are joined
//! back to back before trimming. Two markers `A` and `B` therefore resolve
//! to `AB`, not `A`. Long-standing behavior; pages rely on a single marker.

use regex::Regex;
use std::sync::LazyLock;

static RE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- TITLE:(.*) -->").unwrap());

static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h[^>]+>(.*?)</h[^>]+>").unwrap());

/// Resolve a page title from header and body HTML.
///
/// Returns an empty string when no tier matches; the caller renders a page
/// without a title rather than failing.
pub fn resolve_title(header: &str, body: &str) -> String {
    concat_captures(&RE_MARKER, body)
        .or_else(|| concat_captures(&RE_MARKER, header))
        .or_else(|| concat_captures(&RE_HEADING, header))
        .or_else(|| concat_captures(&RE_HEADING, body))
        .unwrap_or_default()
}

/// Join the first capture group of every match, then trim.
/// `None` when the joined result is empty.
fn concat_captures(re: &Regex, html: &str) -> Option<String> {
    let joined: String = re
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
