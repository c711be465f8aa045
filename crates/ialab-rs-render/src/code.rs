//! Fenced code block extraction.

/// Language tag for fences without an info string.
pub(crate) const DEFAULT_LANGUAGE: &str = "plaintext";

/// A slice of the message: prose or fenced code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    Prose(&'a str),
    Code { language: &'a str, code: &'a str },
}

/// Split text on triple-backtick fences.
///
/// An unterminated fence runs to the end of the text.
pub(crate) fn split_fenced(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut prose_start = 0;
    let mut offset = 0;
    let mut open: Option<(&str, usize)> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim();
        match open {
            None => {
                let Some(info) = trimmed.strip_prefix("```") else {
                    continue;
                };
                if info.contains("```") {
                    continue;
                }
                if line_start > prose_start {
                    blocks.push(Block::Prose(&text[prose_start..line_start]));
                }
                let language = info.split_whitespace().next().unwrap_or(DEFAULT_LANGUAGE);
                open = Some((language, offset));
            }
            Some((language, code_start)) => {
                if is_closing_fence(trimmed) {
                    blocks.push(Block::Code {
                        language,
                        code: strip_newline(&text[code_start..line_start]),
                    });
                    open = None;
                    prose_start = offset;
                }
            }
        }
    }

    match open {
        Some((language, code_start)) => blocks.push(Block::Code {
            language,
            code: strip_newline(&text[code_start..]),
        }),
        None if prose_start < text.len() => blocks.push(Block::Prose(&text[prose_start..])),
        None => {}
    }
    blocks
}

fn is_closing_fence(trimmed: &str) -> bool {
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '`')
}

fn strip_newline(code: &str) -> &str {
    code.strip_suffix('\n')
        .map(|code| code.strip_suffix('\r').unwrap_or(code))
        .unwrap_or(code)
}
