//! Text clean-up applied before matching and before markdown conversion.

use crate::patterns::{re_bare_list_marker, re_block_start, re_link};
use crate::platform::platform_for_url;
use std::borrow::Cow;

/// Rewrite `[url](url)` to a bare `url` for embeddable platforms.
pub(crate) fn collapse_redundant_labels(text: &str) -> Cow<'_, str> {
    re_link().replace_all(text, |caps: &regex::Captures<'_>| {
        let label = caps[1].trim();
        let url = caps[2].trim();
        if label == url && platform_for_url(url).is_some() {
            url.to_string()
        } else {
            caps[0].to_string()
        }
    })
}

/// Drop marker-only list lines and strip a leading `:` from each line.
///
/// Line endings of kept lines are preserved.
pub(crate) fn clean_lines(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if re_bare_list_marker().is_match(line.trim_end_matches(['\r', '\n'])) {
            continue;
        }
        match line.strip_prefix(':') {
            Some(rest) => cleaned.push_str(rest.trim_start_matches([' ', '\t'])),
            None => cleaned.push_str(line),
        }
    }
    cleaned
}

/// Escape a list, heading, quote, or rule marker opening the first line.
///
/// Used for text that continues a line, where the marker is literal.
pub(crate) fn escape_block_start(text: &str) -> String {
    let (first, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };
    let body = first.trim_start_matches([' ', '\t']);
    let mut line = body.to_string();
    if re_block_start().is_match(body) {
        let at = body
            .find(|c: char| !c.is_ascii_digit())
            .filter(|_| body.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(0);
        line.insert(at, '\\');
    }
    match rest {
        Some(rest) => format!("{line}\n{rest}"),
        None => line,
    }
}
