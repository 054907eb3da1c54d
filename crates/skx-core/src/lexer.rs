//! Markup tokenizer.
//!
//! Splits source text into opening tags (with parsed attributes), closing
//! tags and text runs. Comments (`{/* ... */}` and `<!-- ... -->`) are
//! dropped. A `<` that is not followed by a tag name is plain text.
//!
//! Built on `winnow` for the tag-level pieces (names, quoted values);
//! the outer loop is a byte-offset cursor so every token carries its span.

use crate::error::ParseError;
use crate::props::Props;
use winnow::ascii::multispace0;
use winnow::combinator::delimited;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Byte range into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'s>(&self, src: &'s str) -> &'s str {
        &src[self.start..self.end]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'s> {
    /// `<name attrs>` or `<name attrs/>`.
    Open {
        name: &'s str,
        attrs: Props,
        self_closing: bool,
        span: Span,
    },
    /// `</name>`.
    Close { name: &'s str, span: Span },
    /// Anything between tags.
    Text { span: Span },
}

impl Token<'_> {
    pub fn span(&self) -> Span {
        match self {
            Token::Open { span, .. } | Token::Close { span, .. } | Token::Text { span } => *span,
        }
    }
}

/// Tokenize markup.
///
/// # Errors
/// `ParseError::UnterminatedTag` when an opening or closing tag runs into
/// the end of input before its `>`.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, ParseError> {
    scan(src, true)
}

/// Tokenize without failing. A tag that cannot be lexed is kept as text
/// and scanning resumes right after its `<`.
pub fn tokenize_lenient(src: &str) -> Vec<Token<'_>> {
    // Only strict scans report errors.
    scan(src, false).unwrap_or_default()
}

fn scan(src: &str, strict: bool) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = src;
    let mut text_start: Option<usize> = None;

    while !rest.is_empty() {
        let offset = src.len() - rest.len();
        let start = rest;

        if rest.starts_with("<!--") || rest.starts_with("{/*") {
            flush_text(&mut tokens, &mut text_start, offset);
            rest = if rest.starts_with("<!--") {
                skip_past(rest, "-->")
            } else {
                skip_past(rest, "*/}")
            };
            continue;
        }

        if starts_close_tag(rest) {
            let mut attempt = rest;
            match lex_close_tag(&mut attempt) {
                Ok(name) => {
                    rest = attempt;
                    flush_text(&mut tokens, &mut text_start, offset);
                    tokens.push(Token::Close {
                        name,
                        span: Span {
                            start: offset,
                            end: src.len() - rest.len(),
                        },
                    });
                    continue;
                }
                Err(_) if strict => return Err(unterminated(start, offset)),
                Err(_) => log::debug!("skipping malformed closing tag at byte {offset}"),
            }
        } else if starts_open_tag(rest) {
            let mut attempt = rest;
            match lex_open_tag(&mut attempt) {
                Ok((name, attrs, self_closing)) => {
                    rest = attempt;
                    flush_text(&mut tokens, &mut text_start, offset);
                    tokens.push(Token::Open {
                        name,
                        attrs,
                        self_closing,
                        span: Span {
                            start: offset,
                            end: src.len() - rest.len(),
                        },
                    });
                    continue;
                }
                Err(_) if strict => return Err(unterminated(start, offset)),
                Err(_) => log::debug!("skipping unterminated tag at byte {offset}"),
            }
        }

        text_start.get_or_insert(offset);
        skip_char(&mut rest);
    }

    flush_text(&mut tokens, &mut text_start, src.len());
    Ok(tokens)
}

/// Index of the `</name>` that closes the opening tag at `tokens[at]`,
/// searching before `limit`. Same-named non-self-closing tags in between
/// nest; names compare ignoring ASCII case.
pub fn find_matching_close(tokens: &[Token<'_>], at: usize, name: &str, limit: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (j, token) in tokens.iter().enumerate().take(limit).skip(at + 1) {
        match token {
            Token::Open {
                name: other,
                self_closing: false,
                ..
            } if other.eq_ignore_ascii_case(name) => depth += 1,
            Token::Close { name: other, .. } if other.eq_ignore_ascii_case(name) => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the attribute section of a tag (the text after the tag name).
///
/// Accepts `name`, `name="v"`, `name='v'`, `name={v}` and `name=v`.
/// A bare name means `"true"`. Unparseable characters are skipped.
pub fn parse_attributes(text: &str) -> Props {
    let mut input = text;
    let mut props = Props::new();
    loop {
        skip_ws(&mut input);
        if input.is_empty() {
            break;
        }
        let checkpoint = input;
        match parse_attribute.parse_next(&mut input) {
            Ok((name, value)) => props.push(name, value),
            Err(_) => {
                input = checkpoint;
                skip_char(&mut input);
            }
        }
    }
    props
}

// ─── Tag lexers ──────────────────────────────────────────────────────────

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_open_tag(s: &str) -> bool {
    s.strip_prefix('<')
        .and_then(|r| r.chars().next())
        .is_some_and(is_name_char)
}

fn starts_close_tag(s: &str) -> bool {
    s.strip_prefix("</")
        .and_then(|r| r.chars().next())
        .is_some_and(is_name_char)
}

pub(crate) fn parse_tag_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., is_name_char).parse_next(input)
}

fn lex_close_tag<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let _ = "</".parse_next(input)?;
    let name = parse_tag_name(input)?;
    skip_ws(input);
    let _ = '>'.parse_next(input)?;
    Ok(name)
}

pub(crate) fn lex_open_tag<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Props, bool)> {
    let _ = '<'.parse_next(input)?;
    let name = parse_tag_name(input)?;
    let mut attrs = Props::new();
    loop {
        skip_ws(input);
        if let Some(after) = input.strip_prefix("/>") {
            *input = after;
            return Ok((name, attrs, true));
        }
        if let Some(after) = input.strip_prefix('>') {
            *input = after;
            return Ok((name, attrs, false));
        }
        if input.is_empty() {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        let checkpoint = *input;
        match parse_attribute.parse_next(input) {
            Ok((attr, value)) => attrs.push(attr, value),
            Err(_) => {
                *input = checkpoint;
                skip_char(input);
            }
        }
    }
}

// ─── Attribute lexers ────────────────────────────────────────────────────

fn parse_attribute(input: &mut &str) -> ModalResult<(String, String)> {
    let name: &str = take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.')
    })
    .parse_next(input)?;
    let checkpoint = *input;
    skip_ws(input);
    if input.starts_with('=') {
        let _ = '='.parse_next(input)?;
        skip_ws(input);
        let value = parse_attr_value(input)?;
        Ok((name.to_string(), value))
    } else {
        *input = checkpoint;
        Ok((name.to_string(), "true".to_string()))
    }
}

fn parse_attr_value(input: &mut &str) -> ModalResult<String> {
    if input.starts_with('"') {
        let v: &str = delimited('"', take_till(0.., '"'), '"').parse_next(input)?;
        Ok(v.to_string())
    } else if input.starts_with('\'') {
        let v: &str = delimited('\'', take_till(0.., '\''), '\'').parse_next(input)?;
        Ok(v.to_string())
    } else if input.starts_with('{') {
        parse_braced(input).map(str::to_string)
    } else {
        let checkpoint = *input;
        let v: &str = take_till(1.., |c: char| c.is_whitespace() || c == '>').parse_next(input)?;
        // `<image src=a.png/>`: the trailing `/` belongs to the tag.
        if let Some(trimmed) = v.strip_suffix('/')
            && input.starts_with('>')
        {
            *input = &checkpoint[trimmed.len()..];
            return Ok(trimmed.to_string());
        }
        Ok(v.to_string())
    }
}

/// `{...}` with balanced nested braces; returns the inner text.
pub(crate) fn parse_braced<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let s = *input;
    if !s.starts_with('{') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    *input = &s[i + 1..];
                    return Ok(&s[1..i]);
                }
            }
            _ => {}
        }
    }
    Err(ErrMode::Backtrack(ContextError::new()))
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn skip_ws(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

fn skip_char(input: &mut &str) {
    let mut chars = input.chars();
    chars.next();
    *input = chars.as_str();
}

/// Advance past the first `terminator`, or to the end of input.
fn skip_past<'s>(s: &'s str, terminator: &str) -> &'s str {
    match s.find(terminator) {
        Some(pos) => &s[pos + terminator.len()..],
        None => "",
    }
}

fn flush_text(tokens: &mut Vec<Token<'_>>, text_start: &mut Option<usize>, end: usize) {
    if let Some(start) = text_start.take()
        && end > start
    {
        tokens.push(Token::Text {
            span: Span { start, end },
        });
    }
}

fn unterminated(rest: &str, offset: usize) -> ParseError {
    let mut name_input = rest.trim_start_matches('<').trim_start_matches('/');
    let tag = parse_tag_name(&mut name_input).unwrap_or("?").to_string();
    ParseError::UnterminatedTag { tag, offset }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<String> {
        tokenize(src)
            .unwrap()
            .iter()
            .map(|t| match t {
                Token::Open {
                    name, self_closing, ..
                } => format!("<{name}{}>", if *self_closing { "/" } else { "" }),
                Token::Close { name, .. } => format!("</{name}>"),
                Token::Text { span } => format!("'{}'", span.slice(src)),
            })
            .collect()
    }

    #[test]
    fn tags_and_text() {
        assert_eq!(
            kinds("<view> hi <box/></view>"),
            vec!["<view>", "' hi '", "<box/>", "</view>"]
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            kinds("<view>{/* <box/> */}<!-- <circle/> --><text>a</text></view>"),
            vec!["<view>", "<text>", "'a'", "</text>", "</view>"]
        );
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(kinds("<text>a < b</text>"), vec!["<text>", "'a < b'", "</text>"]);
    }

    #[test]
    fn attribute_value_forms() {
        let props = parse_attributes(r#" a="x y" b='z' c={1 + {2}} d=plain e "#);
        assert_eq!(props.get("a"), Some("x y"));
        assert_eq!(props.get("b"), Some("z"));
        assert_eq!(props.get("c"), Some("1 + {2}"));
        assert_eq!(props.get("d"), Some("plain"));
        assert_eq!(props.get("e"), Some("true"));
    }

    #[test]
    fn gt_inside_quotes_does_not_close_tag() {
        let src = r#"<text label="a > b" size={10}/>"#;
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            Token::Open {
                name,
                attrs,
                self_closing,
                ..
            } => {
                assert_eq!(*name, "text");
                assert!(*self_closing);
                assert_eq!(attrs.get("label"), Some("a > b"));
                assert_eq!(attrs.get("size"), Some("10"));
            }
            other => panic!("expected open tag, got {other:?}"),
        }
    }

    #[test]
    fn bare_value_before_self_close() {
        let tokens = tokenize("<image src=img/logo.png/>").unwrap();
        match &tokens[0] {
            Token::Open {
                attrs,
                self_closing,
                ..
            } => {
                assert!(*self_closing);
                assert_eq!(attrs.get("src"), Some("img/logo.png"));
            }
            other => panic!("expected open tag, got {other:?}"),
        }
    }

    #[test]
    fn dangling_equals_does_not_swallow_the_tag_end() {
        let tokens = tokenize("<box width=><circle/></box>").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Open { name: "circle", .. }));
    }

    #[test]
    fn unterminated_open_tag_is_an_error() {
        let err = tokenize(r#"<view><box width="10""#).unwrap_err();
        match err {
            ParseError::UnterminatedTag { tag, offset } => {
                assert_eq!(tag, "box");
                assert_eq!(offset, 6);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn lenient_scan_resumes_after_a_broken_tag() {
        let src = "<view></view x><box/><circle width=\"1\"";
        assert!(tokenize(src).is_err());
        let tokens = tokenize_lenient(src);
        assert!(matches!(tokens[0], Token::Open { name: "view", .. }));
        assert!(matches!(tokens[1], Token::Text { .. }));
        assert!(matches!(tokens[2], Token::Open { name: "box", self_closing: true, .. }));
        assert!(matches!(tokens.last(), Some(Token::Text { .. })));
        assert!(!tokens.iter().any(|t| matches!(t, Token::Open { name: "circle", .. })));
    }

    #[test]
    fn matching_close_tracks_depth() {
        let tokens = tokenize("<view><view/><view></view></view><view></view>").unwrap();
        assert_eq!(tokens.len(), 7);
        assert_eq!(find_matching_close(&tokens, 0, "view", tokens.len()), Some(4));
        assert_eq!(find_matching_close(&tokens, 2, "VIEW", tokens.len()), Some(3));
        assert_eq!(find_matching_close(&tokens, 0, "view", 4), None);
    }

    #[test]
    fn spans_cover_source() {
        let src = "<view>x</view>";
        let tokens = tokenize(src).unwrap();
        assert_eq!(tokens[0].span(), Span { start: 0, end: 6 });
        assert_eq!(tokens[1].span().slice(src), "x");
        assert_eq!(tokens[2].span(), Span { start: 7, end: 14 });
    }
}
