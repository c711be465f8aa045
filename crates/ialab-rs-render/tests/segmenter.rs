//! End-to-end segmentation of assistant messages.

use ialab_rs_render::{Image, MediaEmbed, MediaKind, Segment, segment};
use pretty_assertions::assert_eq;
use serde_json::json;

fn text_values(segments: &[Segment]) -> Vec<&str> {
    segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Text { value, .. } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

/// Plain text comes back as a single text segment equal to the input.
#[test]
fn plain_text_is_one_text_segment() {
    let input = "The capital of France is Paris.";
    let segments = segment(input);
    assert_eq!(segments.len(), 1);
    match &segments[0] {
        Segment::Text { value, html } => {
            assert_eq!(value, input);
            assert_eq!(html, "<p>The capital of France is Paris.</p>\n");
        }
        other => panic!("unexpected segment: {other:?}"),
    }
}

/// Blank input yields nothing.
#[test]
fn blank_input_yields_no_segments() {
    assert!(segment("").is_empty());
    assert!(segment(" \n\t ").is_empty());
}

/// Consecutive images separated by a newline collapse into one row.
#[test]
fn consecutive_images_form_a_row() {
    let segments = segment("![a](u1)\n![b](u2)");
    assert_eq!(
        segments,
        vec![Segment::ImageRow {
            images: vec![
                Image {
                    url: "u1".to_string(),
                    alt_text: "a".to_string()
                },
                Image {
                    url: "u2".to_string(),
                    alt_text: "b".to_string()
                },
            ]
        }]
    );
}

/// Images split by prose stay separate.
#[test]
fn images_split_by_prose_stay_single() {
    let segments = segment("![a](u1)\nand then\n![b](u2)");
    assert_eq!(segments.len(), 3);
    assert!(matches!(segments[0], Segment::Image(_)));
    assert!(matches!(segments[1], Segment::Text { .. }));
    assert!(matches!(segments[2], Segment::Image(_)));
}

/// A link labelled with its own URL behaves exactly like the bare URL.
#[test]
fn redundant_label_matches_bare_url() {
    let labelled = segment("[https://youtu.be/XYZ](https://youtu.be/XYZ)");
    let bare = segment("https://youtu.be/XYZ");
    let expected = vec![Segment::MediaEmbed(MediaEmbed {
        kind: MediaKind::Youtube,
        url: "https://youtu.be/XYZ".to_string(),
        embed_url: "https://www.youtube.com/embed/XYZ".to_string(),
        display_text: "https://youtu.be/XYZ".to_string(),
    })];
    assert_eq!(labelled, expected);
    assert_eq!(bare, expected);
}

/// A platform URL without a resource id degrades to a generic link.
#[test]
fn malformed_platform_url_is_generic_link() {
    let segments = segment("check https://www.tiktok.com/@someone/notavideo out");
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[1],
        Segment::GenericLink {
            url: "https://www.tiktok.com/@someone/notavideo".to_string(),
            display_text: "https://www.tiktok.com/@someone/notavideo".to_string(),
        }
    );
    assert_eq!(text_values(&segments), vec!["check ", " out"]);
}

/// Markdown links to platforms embed with their label as display text.
#[test]
fn labelled_platform_link_embeds() {
    let segments = segment("Listen: [my song](https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC)");
    assert_eq!(segments.len(), 2);
    match &segments[1] {
        Segment::MediaEmbed(embed) => {
            assert_eq!(embed.kind, MediaKind::Spotify);
            assert_eq!(embed.display_text, "my song");
            assert_eq!(
                embed.embed_url,
                "https://open.spotify.com/embed/track/4uLU6hMCjMI75M1A2tKUQC"
            );
        }
        other => panic!("unexpected segment: {other:?}"),
    }
}

/// Ordinary markdown links become generic links.
#[test]
fn ordinary_link_is_generic() {
    let segments = segment("Read [the docs](https://docs.rs).");
    assert_eq!(
        segments[1],
        Segment::GenericLink {
            url: "https://docs.rs".to_string(),
            display_text: "the docs".to_string(),
        }
    );
    assert_eq!(text_values(&segments), vec!["Read ", "."]);
}

/// Trailing punctuation after a bare URL stays in the surrounding text.
#[test]
fn bare_url_trailing_punctuation_is_stripped() {
    let segments = segment("Watch https://www.dailymotion.com/video/x7tgad0!");
    match &segments[1] {
        Segment::MediaEmbed(embed) => {
            assert_eq!(embed.url, "https://www.dailymotion.com/video/x7tgad0");
            assert_eq!(embed.kind, MediaKind::Dailymotion);
        }
        other => panic!("unexpected segment: {other:?}"),
    }
    assert_eq!(text_values(&segments), vec!["Watch ", "!"]);
}

/// Every supported platform is recognized in one message, in order.
#[test]
fn recognizes_every_platform_in_order() {
    let message = "\
https://youtu.be/abc123
https://www.tiktok.com/@chef/video/7234567890
https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3
https://soundcloud.com/artist/song
https://dai.ly/x8abc
https://www.google.com/maps/place/Madrid";
    let kinds: Vec<MediaKind> = segment(message)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::MediaEmbed(embed) => Some(embed.kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, MediaKind::ALL.to_vec());
}

/// Code fences are extracted before link matching touches their content.
#[test]
fn code_fence_content_is_not_matched() {
    let segments = segment("Example:\n```markdown\n![x](y) https://youtu.be/abc\n```\nEnd");
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[1],
        Segment::Code {
            language: "markdown".to_string(),
            code: "![x](y) https://youtu.be/abc".to_string(),
        }
    );
}

/// Fences without a language are tagged as plaintext.
#[test]
fn code_fence_defaults_to_plaintext() {
    let segments = segment("```\nls -la\n```");
    assert_eq!(
        segments,
        vec![Segment::Code {
            language: "plaintext".to_string(),
            code: "ls -la".to_string(),
        }]
    );
}

/// Marker-only list lines and leading colons do not reach the HTML.
#[test]
fn list_noise_and_leading_colon_are_cleaned() {
    let segments = segment(": Steps\n- one\n-\n- two");
    match &segments[0] {
        Segment::Text { html, .. } => {
            assert!(html.starts_with("<p>Steps</p>"), "{html}");
            assert_eq!(html.matches("<li>").count(), 2, "{html}");
        }
        other => panic!("unexpected segment: {other:?}"),
    }
}

/// Punctuation right after a link is ordinary text, not a line artifact.
#[test]
fn colon_after_link_is_kept() {
    let segments = segment("Check [this guide](https://example.com): it explains everything");
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[2],
        Segment::Text {
            value: ": it explains everything".to_string(),
            html: "<p>: it explains everything</p>\n".to_string(),
        }
    );
}

/// A dash between two links on one line is a separator, not a list item.
#[test]
fn dash_between_links_is_kept() {
    let segments = segment("[a](https://a.example) - [b](https://b.example)");
    assert_eq!(segments.len(), 3);
    assert_eq!(
        segments[1],
        Segment::Text {
            value: " - ".to_string(),
            html: "<p>-</p>\n".to_string(),
        }
    );
}

/// Bare URLs of other sites stay in the text but render as links.
#[test]
fn non_platform_bare_url_is_clickable() {
    let segments = segment("docs at https://doc.rust-lang.org/book/ today");
    assert_eq!(segments.len(), 1);
    match &segments[0] {
        Segment::Text { value, html } => {
            assert_eq!(value, "docs at https://doc.rust-lang.org/book/ today");
            assert_eq!(
                html,
                "<p>docs at <a href=\"https://doc.rust-lang.org/book/\">https://doc.rust-lang.org/book/</a> today</p>\n"
            );
        }
        other => panic!("unexpected segment: {other:?}"),
    }
}

/// Raw HTML from the model is shown as text.
#[test]
fn raw_html_is_not_passed_through() {
    let segments = segment("<script>alert(1)</script>\n\nhi <b onclick=x>there</b>");
    let html: String = segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Text { html, .. } => Some(html.as_str()),
            _ => None,
        })
        .collect();
    assert!(!html.contains("<script>"), "{html}");
    assert!(!html.contains("<b "), "{html}");
    assert!(html.contains("&lt;b onclick=x&gt;"), "{html}");
}

/// Text that renders to nothing is dropped.
#[test]
fn invisible_text_is_dropped() {
    let segments = segment("*\n![a](u1)\n-");
    assert_eq!(
        segments,
        vec![Segment::Image(Image {
            url: "u1".to_string(),
            alt_text: "a".to_string(),
        })]
    );
}

/// Segments serialize with a snake_case type tag.
#[test]
fn segments_serialize_with_type_tag() {
    let encoded = serde_json::to_value(segment("https://youtu.be/abc")).expect("encode");
    assert_eq!(
        encoded,
        json!([{
            "type": "media_embed",
            "kind": "youtube",
            "url": "https://youtu.be/abc",
            "embed_url": "https://www.youtube.com/embed/abc",
            "display_text": "https://youtu.be/abc",
        }])
    );
}
