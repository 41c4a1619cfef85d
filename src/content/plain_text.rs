//! Rich-text flattening
//!
//! CMS text fragments are light Markdown that may embed inline markup
//! (`<strong>`, `<a href=..>`, entities). Word counting needs the plain text
//! a reader would see, so fragments go through the Markdown parser and only
//! text events are kept. HTML events are lexed: a `<` only opens a tag when
//! it is followed by a tag name (or `/name`, `!name`, `!--`) and the tag is
//! closed by `>` before any other `<`. Anything else stays literal text.

use pulldown_cmark::{Event, Options, Parser, TagEnd};

/// Tags that separate words when rendered
const BREAKING_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Flatten a rich-text fragment into plain text
pub fn to_plain_text(text: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let mut out = String::with_capacity(text.len());

    for event in Parser::new_ext(text, options) {
        match event {
            Event::Text(run) | Event::Code(run) => out.push_str(&run),
            Event::Html(html) | Event::InlineHtml(html) => strip_markup(&html, &mut out),
            Event::SoftBreak
            | Event::HardBreak
            | Event::Rule
            | Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => push_break(&mut out),
            _ => {}
        }
    }

    out.truncate(out.trim_end().len());
    out
}

/// Separate the next text run from the previous one
fn push_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Append the text of raw HTML to `out`, dropping tags and decoding entities
fn strip_markup(html: &str, out: &mut String) {
    let mut rest = html;

    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with('<') {
            match scan_markup(tail) {
                Some(markup) => {
                    if markup.breaks_words {
                        push_break(out);
                    }
                    rest = &tail[markup.len..];
                }
                None => {
                    out.push('<');
                    rest = &tail[1..];
                }
            }
        } else {
            match decode_entity(tail) {
                Some((len, c)) => {
                    out.push(c);
                    rest = &tail[len..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            }
        }
    }

    out.push_str(rest);
}

/// A recognized piece of markup at the start of the input
struct Markup {
    len: usize,
    breaks_words: bool,
}

/// Recognize a tag, comment or declaration starting at `<`
fn scan_markup(s: &str) -> Option<Markup> {
    if let Some(body) = s.strip_prefix("<!--") {
        let end = body.find("-->")?;
        return Some(Markup {
            len: 4 + end + 3,
            breaks_words: false,
        });
    }

    let after_bracket = &s[1..];
    let name_start = if after_bracket.starts_with('/') || after_bracket.starts_with('!') {
        &after_bracket[1..]
    } else {
        after_bracket
    };

    if !name_start.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let name_len = name_start
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
        .unwrap_or(name_start.len());
    let name = &name_start[..name_len];

    // The name must be followed by attributes, a self-close or the end
    let after_name = &name_start[name_len..];
    if !after_name.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
        return None;
    }

    let offset = s.len() - after_name.len();
    let close = find_tag_end(after_name)?;

    Some(Markup {
        len: offset + close + 1,
        breaks_words: BREAKING_TAGS
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(name)),
    })
}

/// Byte offset of the `>` closing a tag, honoring quoted attribute values
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;

    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, '<') => return None,
            _ => {}
        }
    }

    None
}

/// Decode an HTML entity at the start of `s`, returning its length
fn decode_entity(s: &str) -> Option<(usize, char)> {
    let end = s.get(..12).unwrap_or(s).find(';')?;
    let name = &s[1..end];

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)?
        }
    };

    Some((end + 1, c))
}
