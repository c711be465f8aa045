//! Rich-content segmentation for assistant messages.
//!
//! [`segment`] turns raw assistant text (markdown plus bare URLs) into an
//! ordered list of [`Segment`]s: markdown text with its rendered HTML, fenced
//! code, images, rows of images, media embeds for known platforms, and
//! generic links. The pipeline is pure and deterministic.

mod code;
mod html;
mod matcher;
mod normalize;
mod patterns;
mod platform;
mod segment;

pub use platform::{LinkTarget, classify_url};
pub use segment::{Image, MediaEmbed, MediaKind, Segment};

use code::Block;
use log::debug;

/// Split assistant text into renderable segments.
///
/// Blank input yields no segments. Fenced code blocks are extracted first so
/// their contents never go through link or image matching.
pub fn segment(text: &str) -> Vec<Segment> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    for block in code::split_fenced(text) {
        match block {
            Block::Prose(prose) => segments.extend(segment_prose(prose)),
            Block::Code { language, code } => {
                if !code.trim().is_empty() {
                    segments.push(Segment::Code {
                        language: language.to_string(),
                        code: code.to_string(),
                    });
                }
            }
        }
    }
    let segments = group_images(segments);
    debug!("segmented message (len={}, segments={})", text.len(), segments.len());
    segments
}

/// Wrap user-authored text as a single escaped text segment.
///
/// User input is shown verbatim, so it skips markdown and link matching.
pub fn segment_plain(text: &str) -> Vec<Segment> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    vec![Segment::Text {
        value: text.to_string(),
        html: html::plain_to_html(text),
    }]
}

/// Segment a span of text that contains no fenced code.
///
/// Line clean-up runs over the whole block so it only ever sees real line
/// starts, never the tail of a line after a link.
fn segment_prose(prose: &str) -> Vec<Segment> {
    let lines = normalize::clean_lines(prose);
    let cleaned = normalize::collapse_redundant_labels(&lines);
    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in matcher::find_matches(&cleaned) {
        push_text(&mut segments, &cleaned[..found.start], cursor);
        cursor = found.end;
        segments.push(found.into_segment());
    }
    push_text(&mut segments, &cleaned, cursor);
    segments
}

/// Emit `text[start..]` as a text segment unless it would render as nothing.
///
/// A span that begins mid-line is inline content, so a leading list or
/// heading marker is escaped before markdown conversion.
fn push_text(segments: &mut Vec<Segment>, text: &str, start: usize) {
    let value = &text[start..];
    if value.trim().is_empty() {
        return;
    }
    let starts_line = start == 0 || text[..start].ends_with('\n');
    let html = if starts_line {
        html::markdown_to_html(value)
    } else {
        html::markdown_to_html(&normalize::escape_block_start(value))
    };
    if html::is_visibly_empty(&html) {
        return;
    }
    segments.push(Segment::Text {
        value: value.to_string(),
        html,
    });
}

/// Collapse runs of adjacent images into a single row.
fn group_images(segments: Vec<Segment>) -> Vec<Segment> {
    let mut grouped = Vec::with_capacity(segments.len());
    let mut run: Vec<Image> = Vec::new();
    for segment in segments {
        match segment {
            Segment::Image(image) => run.push(image),
            other => {
                flush_images(&mut grouped, &mut run);
                grouped.push(other);
            }
        }
    }
    flush_images(&mut grouped, &mut run);
    grouped
}

fn flush_images(grouped: &mut Vec<Segment>, run: &mut Vec<Image>) {
    match run.len() {
        0 => {}
        1 => grouped.extend(run.drain(..).map(Segment::Image)),
        _ => grouped.push(Segment::ImageRow {
            images: std::mem::take(run),
        }),
    }
}
