//! Compiled regular expressions used by the segmenter.
//!
//! Each accessor compiles its pattern at most once.

use crate::MediaKind;
use regex::Regex;
use std::sync::OnceLock;

/// Characters stripped from the end of a bare URL.
pub(crate) const TRAILING_PUNCTUATION: &[char] = &['.', ')', ',', '!', '?', ';', ':', '"', '\''];

/// `![alt](url "title")`
pub(crate) fn re_image() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#)
            .expect("re_image: pattern is valid and should always compile")
    })
}

/// `[label](url "title")`
pub(crate) fn re_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\[([^\]]+)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#)
            .expect("re_link: pattern is valid and should always compile")
    })
}

/// Line holding only a list marker.
pub(crate) fn re_bare_list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[-*+]\s*$")
            .expect("re_bare_list_marker: pattern is valid and should always compile")
    })
}

/// Line opening that markdown would read as a block marker.
pub(crate) fn re_block_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(?:[-+*]|#{1,6}|\d{1,9}[.)])(?:[ \t]|$)|>|[-*_](?:[ \t]*[-*_]){2,}[ \t]*$)")
            .expect("re_block_start: pattern is valid and should always compile")
    })
}

/// Bare `http(s)` URL in rendered text.
pub(crate) fn re_bare_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"]+"#)
            .expect("re_bare_url: pattern is valid and should always compile")
    })
}

/// Any HTML tag.
pub(crate) fn re_html_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<[^>]*>").expect("re_html_tag: pattern is valid and should always compile")
    })
}

/// Bare URL patterns per platform, in match precedence order.
pub(crate) fn bare_url_patterns() -> &'static [(MediaKind, Regex)] {
    static RE: OnceLock<Vec<(MediaKind, Regex)>> = OnceLock::new();
    RE.get_or_init(|| {
        let sources = [
            (
                MediaKind::Youtube,
                r"https?://(?:www\.|m\.|music\.)?(?:youtube\.com|youtu\.be)/[^\s<>]+",
            ),
            (
                MediaKind::Tiktok,
                r"https?://(?:www\.|m\.|vm\.|vt\.)?tiktok\.com/[^\s<>]+",
            ),
            (MediaKind::Spotify, r"https?://open\.spotify\.com/[^\s<>]+"),
            (
                MediaKind::Soundcloud,
                r"https?://(?:www\.|m\.)?soundcloud\.com/[^\s<>]+",
            ),
            (
                MediaKind::Dailymotion,
                r"https?://(?:www\.)?(?:dailymotion\.com/video|dai\.ly)/[^\s<>]+",
            ),
            (
                MediaKind::Dailymotion,
                r"https?://(?:www\.)?dailymotion\.com/playlist/[^\s<>]+",
            ),
            (
                MediaKind::GoogleMaps,
                r"https?://(?:(?:www\.)?google\.[a-z.]+/maps|maps\.google\.[a-z.]+|maps\.app\.goo\.gl|goo\.gl/maps)[^\s<>]*",
            ),
        ];
        sources
            .into_iter()
            .map(|(kind, source)| {
                let regex = Regex::new(source)
                    .expect("bare url pattern is valid and should always compile");
                (kind, regex)
            })
            .collect()
    })
}
