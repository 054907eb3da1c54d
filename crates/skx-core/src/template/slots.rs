//! Component body scanning and slot content.
//!
//! A body is split into segments: plain text, comments (kept verbatim),
//! `{...}` placeholders and `<slot>` tags. The include's children are split
//! into named parts (`<template slot="X">...</template>`) and the default
//! stream.

use crate::lexer::{Token, find_matching_close, lex_open_tag, parse_braced, tokenize};
use crate::props::Props;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'s> {
    Text(&'s str),
    /// `{/* ... */}` or `<!-- ... -->`, delimiters included.
    Comment(&'s str),
    /// Inner text of a `{...}` placeholder.
    Placeholder(&'s str),
    Slot {
        name: Option<String>,
        fallback: &'s str,
    },
    /// A `<slot` that never reaches its `>`.
    Malformed,
}

/// Split a component body into text, comments, placeholders and slots.
pub(crate) fn scan_body(body: &str) -> Vec<Segment<'_>> {
    scan(body, true)
}

/// Like [`scan_body`], but `<slot>` tags are plain text. Used on a body
/// whose slots are already filled.
pub(crate) fn scan_placeholders(text: &str) -> Vec<Segment<'_>> {
    scan(text, false)
}

fn scan(body: &str, slots: bool) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = body;
    let mut text_start: Option<usize> = None;

    while !rest.is_empty() {
        let offset = body.len() - rest.len();
        match next_segment(rest, slots) {
            Some((segment, len)) => {
                flush_text(body, &mut segments, &mut text_start, offset);
                segments.push(segment);
                rest = &rest[len..];
            }
            None => {
                text_start.get_or_insert(offset);
                let step = rest.chars().next().map_or(1, char::len_utf8);
                rest = &rest[step..];
            }
        }
    }
    flush_text(body, &mut segments, &mut text_start, body.len());
    segments
}

/// The segment starting at the head of `rest`, with its byte length.
fn next_segment(rest: &str, slots: bool) -> Option<(Segment<'_>, usize)> {
    if rest.starts_with("{/*") {
        let len = comment_len(rest, "*/}");
        return Some((Segment::Comment(&rest[..len]), len));
    }
    if rest.starts_with("<!--") {
        let len = comment_len(rest, "-->");
        return Some((Segment::Comment(&rest[..len]), len));
    }
    if rest.starts_with('{') {
        let mut input = rest;
        let inner = parse_braced(&mut input).ok()?;
        return Some((Segment::Placeholder(inner), rest.len() - input.len()));
    }
    if slots && starts_slot_tag(rest) {
        return Some(scan_slot(rest));
    }
    None
}

fn scan_slot(rest: &str) -> (Segment<'_>, usize) {
    let Some((attrs, self_closing, open_len)) = lex_slot_tag(rest) else {
        log::warn!("malformed <slot> tag; substituting an empty view");
        let len = rest.find('>').map_or(rest.len(), |i| i + 1);
        return (Segment::Malformed, len);
    };
    let input = &rest[open_len..];
    let name = attrs.get_non_empty("name").map(str::to_string);

    if self_closing {
        return (
            Segment::Slot {
                name,
                fallback: "",
            },
            open_len,
        );
    }
    match find_slot_close(input) {
        Some((inner_len, close_len)) => (
            Segment::Slot {
                name,
                fallback: &input[..inner_len],
            },
            open_len + inner_len + close_len,
        ),
        None => {
            log::warn!("<slot> has no closing tag; treating it as self-closing");
            (
                Segment::Slot {
                    name,
                    fallback: "",
                },
                open_len,
            )
        }
    }
}

/// Offset and length of the `</slot>` closing a slot whose content starts
/// at `s`. Nested open slots are counted.
fn find_slot_close(s: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if let Some(len) = close_slot_len(rest) {
            depth -= 1;
            if depth == 0 {
                return Some((i, len));
            }
            i += len;
            continue;
        }
        if starts_slot_tag(rest)
            && let Some((_, false, _)) = lex_slot_tag(rest)
        {
            depth += 1;
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Attributes, self-closing flag and byte length of the `<slot ...>` at the
/// head of `s`. `None` when a quoted or braced value is left open, or
/// another tag starts before the `>`.
fn lex_slot_tag(s: &str) -> Option<(Props, bool, usize)> {
    let len = open_tag_len(s)?;
    let mut tag = &s[..len];
    let (_, attrs, self_closing) = lex_open_tag(&mut tag).ok()?;
    Some((attrs, self_closing, len))
}

fn open_tag_len(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut braces = 0usize;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if braces > 0 => match c {
                '{' => braces += 1,
                '}' => braces -= 1,
                _ => {}
            },
            None => match c {
                '"' | '\'' => quote = Some(c),
                '{' => braces += 1,
                '<' => return None,
                '>' => return Some(i + 1),
                _ => {}
            },
        }
    }
    None
}

fn starts_slot_tag(s: &str) -> bool {
    s.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("<slot"))
        && s[5..]
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == '/' || c == '>')
}

fn close_slot_len(s: &str) -> Option<usize> {
    if !s.get(..6).is_some_and(|head| head.eq_ignore_ascii_case("</slot")) {
        return None;
    }
    let after = s[6..].trim_start().strip_prefix('>')?;
    Some(s.len() - after.len())
}

fn comment_len(s: &str, terminator: &str) -> usize {
    s.find(terminator).map_or(s.len(), |pos| pos + terminator.len())
}

fn flush_text<'s>(
    body: &'s str,
    segments: &mut Vec<Segment<'s>>,
    text_start: &mut Option<usize>,
    end: usize,
) {
    if let Some(start) = text_start.take()
        && end > start
    {
        segments.push(Segment::Text(&body[start..end]));
    }
}

// ─── Slot content ────────────────────────────────────────────────────────

/// The include's children, split for projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SlotContent {
    /// Everything outside `<template slot>` wrappers, trimmed.
    pub default: String,
    /// Named parts by lowercased slot name.
    pub named: HashMap<String, String>,
}

impl SlotContent {
    /// Split include children. Only top-level `<template slot="X">`
    /// wrappers are extracted; a template nested inside another element
    /// stays in that element.
    pub fn split(children: &str) -> Self {
        let Ok(tokens) = tokenize(children) else {
            return Self {
                default: children.trim().to_string(),
                named: HashMap::new(),
            };
        };

        let mut default = String::new();
        let mut named: HashMap<String, String> = HashMap::new();
        let mut copied = 0;
        let mut i = 0;
        while i < tokens.len() {
            let Token::Open {
                name,
                attrs,
                self_closing: false,
                span,
            } = &tokens[i]
            else {
                i += 1;
                continue;
            };
            let Some(close) = find_matching_close(&tokens, i, name, tokens.len()) else {
                i += 1;
                continue;
            };

            if name.eq_ignore_ascii_case("template")
                && let Some(slot) = attrs.get_non_empty("slot")
            {
                default.push_str(&children[copied..span.start]);
                let inner = &children[span.end..tokens[close].span().start];
                named
                    .entry(slot.to_ascii_lowercase())
                    .or_default()
                    .push_str(inner.trim());
                copied = tokens[close].span().end;
            }
            i = close + 1;
        }
        default.push_str(&children[copied..]);

        Self {
            default: default.trim().to_string(),
            named,
        }
    }

    /// Content for a slot; `None` and `"default"` mean the default stream.
    pub fn get(&self, name: Option<&str>) -> &str {
        match name {
            None => &self.default,
            Some(n) if n.eq_ignore_ascii_case("default") => &self.default,
            Some(n) => self
                .named
                .get(&n.to_ascii_lowercase())
                .map_or("", String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn slot(name: Option<&str>, fallback: &'static str) -> Segment<'static> {
        Segment::Slot {
            name: name.map(str::to_string),
            fallback,
        }
    }

    #[test]
    fn body_segments() {
        assert_eq!(
            scan_body("<view>{title}<slot/></view>"),
            vec![
                Segment::Text("<view>"),
                Segment::Placeholder("title"),
                slot(None, ""),
                Segment::Text("</view>"),
            ]
        );
    }

    #[test]
    fn comments_are_segments() {
        assert_eq!(
            scan_body("a{/* {x} */}b<!-- <slot/> -->"),
            vec![
                Segment::Text("a"),
                Segment::Comment("{/* {x} */}"),
                Segment::Text("b"),
                Segment::Comment("<!-- <slot/> -->"),
            ]
        );
    }

    #[test]
    fn slot_forms() {
        assert_eq!(scan_body("<slot></slot>"), vec![slot(None, "")]);
        assert_eq!(scan_body("<SLOT name=\"footer\" />"), vec![slot(Some("footer"), "")]);
        assert_eq!(
            scan_body("<slot name='x'><text>{hint}</text></slot>"),
            vec![slot(Some("x"), "<text>{hint}</text>")]
        );
    }

    #[test]
    fn nested_slot_fallback() {
        assert_eq!(
            scan_body("<slot name=\"a\"><slot name=\"b\">B</slot></slot>!"),
            vec![
                slot(Some("a"), "<slot name=\"b\">B</slot>"),
                Segment::Text("!"),
            ]
        );
    }

    #[test]
    fn slotted_is_not_a_slot() {
        assert_eq!(scan_body("<slotted/>"), vec![Segment::Text("<slotted/>")]);
    }

    #[test]
    fn malformed_slot() {
        assert_eq!(
            scan_body("<view><slot name=\"x</view>"),
            vec![Segment::Text("<view>"), Segment::Malformed]
        );
    }

    #[test]
    fn open_quote_or_brace_makes_slot_malformed() {
        assert_eq!(
            scan_body("<slot name={x></slot>after"),
            vec![Segment::Malformed, Segment::Text("</slot>after")]
        );
        assert_eq!(scan_body("<slot name='x"), vec![Segment::Malformed]);
        assert_eq!(
            scan_body("<slot name=\"a>b\"/>"),
            vec![slot(Some("a>b"), "")]
        );
    }

    #[test]
    fn placeholder_scan_leaves_slots_as_text() {
        assert_eq!(
            scan_placeholders("<slot/>{a}{/* {b} */}"),
            vec![
                Segment::Text("<slot/>"),
                Segment::Placeholder("a"),
                Segment::Comment("{/* {b} */}"),
            ]
        );
    }

    #[test]
    fn unbalanced_brace_is_text() {
        assert_eq!(scan_body("a { b"), vec![Segment::Text("a { b")]);
    }

    #[test]
    fn split_named_and_default() {
        let content = SlotContent::split(
            "<template slot=\"Header\"><text>H</text></template>\n<box/>\n<template slot=\"footer\">F</template>",
        );
        assert_eq!(content.default, "<box/>");
        assert_eq!(content.get(Some("header")), "<text>H</text>");
        assert_eq!(content.get(Some("FOOTER")), "F");
        assert_eq!(content.get(Some("missing")), "");
        assert_eq!(content.get(Some("default")), "<box/>");
    }

    #[test]
    fn nested_templates_stay_in_place() {
        let children = "<view><template slot=\"x\">X</template></view>";
        let content = SlotContent::split(children);
        assert_eq!(content.default, children);
        assert!(content.named.is_empty());
    }

    #[test]
    fn template_without_slot_is_default_content() {
        let content = SlotContent::split("<template>T</template>");
        assert_eq!(content.default, "<template>T</template>");
    }
}
