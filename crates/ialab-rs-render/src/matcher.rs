//! Link, image, and bare-URL matching over prose.

use crate::patterns::{TRAILING_PUNCTUATION, bare_url_patterns, re_image, re_link};
use crate::platform::{LinkTarget, classify_url};
use crate::{Image, MediaEmbed, Segment};

/// Accepted match with its byte span in the prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match {
    pub(crate) start: usize,
    pub(crate) end: usize,
    kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MatchKind {
    Image { url: String, alt_text: String },
    Link { url: String, label: String },
    BareUrl { url: String },
}

impl Match {
    /// Classify the match into its renderable segment.
    pub(crate) fn into_segment(self) -> Segment {
        match self.kind {
            MatchKind::Image { url, alt_text } => Segment::Image(Image { url, alt_text }),
            MatchKind::Link { url, label } => link_segment(url, label),
            MatchKind::BareUrl { url } => {
                let display_text = url.clone();
                link_segment(url, display_text)
            }
        }
    }

    fn overlaps(&self, other: &Match) -> bool {
        self.start < other.end && other.start < self.end
    }
}

fn link_segment(url: String, display_text: String) -> Segment {
    match classify_url(&url) {
        LinkTarget::Embed { kind, embed_url } => Segment::MediaEmbed(MediaEmbed {
            kind,
            url,
            embed_url,
            display_text,
        }),
        LinkTarget::Generic => Segment::GenericLink { url, display_text },
    }
}

/// Find non-overlapping matches sorted by start offset.
///
/// Candidates are gathered in precedence order (images, markdown links, then
/// bare URLs per platform) and accepted earliest start first, precedence
/// breaking ties. A candidate overlapping an accepted match is discarded
/// entirely.
pub(crate) fn find_matches(text: &str) -> Vec<Match> {
    let mut candidates: Vec<(usize, Match)> = Vec::new();

    for caps in re_image().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        candidates.push((
            0,
            Match {
                start: whole.start(),
                end: whole.end(),
                kind: MatchKind::Image {
                    url: caps[2].to_string(),
                    alt_text: caps[1].to_string(),
                },
            },
        ));
    }

    for caps in re_link().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        candidates.push((
            1,
            Match {
                start: whole.start(),
                end: whole.end(),
                kind: MatchKind::Link {
                    url: caps[2].to_string(),
                    label: caps[1].trim().to_string(),
                },
            },
        ));
    }

    for (rank, (_, pattern)) in bare_url_patterns().iter().enumerate() {
        for found in pattern.find_iter(text) {
            let url = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            if url.is_empty() {
                continue;
            }
            candidates.push((
                2 + rank,
                Match {
                    start: found.start(),
                    end: found.start() + url.len(),
                    kind: MatchKind::BareUrl {
                        url: url.to_string(),
                    },
                },
            ));
        }
    }

    candidates.sort_by_key(|(rank, found)| (found.start, *rank));
    let mut accepted: Vec<Match> = Vec::new();
    for (_, candidate) in candidates {
        if !accepted.iter().any(|existing| existing.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }
    accepted
}
