//! Markdown-to-HTML conversion for text segments.

use crate::patterns::{TRAILING_PUNCTUATION, re_bare_url, re_html_tag};
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html};

/// Render markdown to HTML with tables, strikethrough, and task lists.
///
/// Raw HTML in the source is escaped and bare URLs become autolinks.
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);
    let events = linkify(merge_text(parser.map(escape_raw_html)));
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

/// Join adjacent text events so a URL is never split across two.
fn merge_text<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut merged: Vec<Event<'a>> = Vec::new();
    for event in events {
        if let Event::Text(next) = &event
            && let Some(Event::Text(prev)) = merged.last_mut()
        {
            let mut joined = String::from(&**prev);
            joined.push_str(next);
            *prev = CowStr::from(joined);
            continue;
        }
        merged.push(event);
    }
    merged
}

/// Wrap bare URLs in plain text with autolink tags.
///
/// Text inside links, images, and code blocks is left alone.
fn linkify(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut opaque = 0usize;
    for event in events {
        match event {
            Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_))) => {
                opaque += 1;
                out.push(Event::Start(tag));
            }
            Event::End(end @ (TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock)) => {
                opaque = opaque.saturating_sub(1);
                out.push(Event::End(end));
            }
            Event::Text(text) if opaque == 0 && re_bare_url().is_match(&text) => {
                push_linked_text(&mut out, &text);
            }
            other => out.push(other),
        }
    }
    out
}

fn push_linked_text(out: &mut Vec<Event<'_>>, text: &str) {
    let mut cursor = 0;
    for found in re_bare_url().find_iter(text) {
        let url = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if url.len() <= "https://".len() {
            continue;
        }
        if found.start() > cursor {
            out.push(Event::Text(text[cursor..found.start()].to_string().into()));
        }
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.to_string().into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(url.to_string().into()));
        out.push(Event::End(TagEnd::Link));
        cursor = found.start() + url.len();
    }
    if cursor < text.len() {
        out.push(Event::Text(text[cursor..].to_string().into()));
    }
}

/// Render literal text as an escaped paragraph, keeping line breaks.
pub(crate) fn plain_to_html(text: &str) -> String {
    let mut events = vec![Event::Start(Tag::Paragraph)];
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            events.push(Event::HardBreak);
        }
        events.push(Event::Text(line.into()));
    }
    events.push(Event::End(TagEnd::Paragraph));
    let mut out = String::with_capacity(text.len() + 16);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Whether rendered HTML shows nothing: no text and no self-contained visual element.
pub(crate) fn is_visibly_empty(html: &str) -> bool {
    if html.contains("<img") || html.contains("<hr") {
        return false;
    }
    let text = re_html_tag().replace_all(html, "");
    text.trim().is_empty()
}
