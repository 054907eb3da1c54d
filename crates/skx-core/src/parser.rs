//! Element parser: markup → `SceneGraph`.
//!
//! Recursive descent over the token stream from [`crate::lexer`]. An
//! element's closing tag is found by counting same-named opening and
//! closing tags inside the enclosing element's range, so nested
//! `<view><view>..</view></view>` pairs close at the right place.
//!
//! Recovery rules:
//! - an element without a matching closing tag keeps no children and
//!   parsing resumes right after its opening tag;
//! - text between child elements of a non-text node is skipped;
//! - attribute problems are logged by the binder and never fail a parse.

use crate::color::HexLayout;
use crate::error::ParseError;
use crate::factory::ComponentRegistry;
use crate::lexer::{Span, Token, find_matching_close, tokenize};
use crate::model::{NodeKind, NodeTree, SceneGraph, SceneNode};
use crate::props::{Props, apply_props};

/// Tags that are conventionally written without a closing tag.
const IMPLICITLY_SELF_CLOSING: &[&str] = &["circle", "image", "text", "box", "slot"];

/// Parse markup into a fresh scene graph.
///
/// # Errors
/// No root element, an unknown tag, or an unterminated tag.
pub fn parse_markup(src: &str, components: &ComponentRegistry) -> Result<SceneGraph, ParseError> {
    parse_tree(src, components).map(SceneGraph::from_tree)
}

/// Parse markup into a detached tree.
///
/// # Errors
/// See [`parse_markup`].
pub fn parse_tree(src: &str, components: &ComponentRegistry) -> Result<NodeTree, ParseError> {
    let tokens = tokenize(src)?;
    let parser = ElementParser {
        src,
        tokens,
        components,
    };

    let first = parser
        .tokens
        .iter()
        .position(|t| !parser.is_blank(t))
        .ok_or(ParseError::NoRootElement)?;
    if !matches!(parser.tokens[first], Token::Open { .. }) {
        return Err(ParseError::NoRootElement);
    }

    let (tree, next) = parser.parse_element(first, parser.tokens.len())?;
    if parser.tokens[next..].iter().any(|t| !parser.is_blank(t)) {
        log::debug!("ignoring content after the root element");
    }
    Ok(tree)
}

struct ElementParser<'s, 'r> {
    src: &'s str,
    tokens: Vec<Token<'s>>,
    components: &'r ComponentRegistry,
}

impl ElementParser<'_, '_> {
    fn is_blank(&self, token: &Token<'_>) -> bool {
        matches!(token, Token::Text { span } if span.slice(self.src).trim().is_empty())
    }

    /// Parse the element opened at `at`. Its closing tag is searched for
    /// before `limit`. Returns the subtree and the index of the first token
    /// after the element.
    fn parse_element(&self, at: usize, limit: usize) -> Result<(NodeTree, usize), ParseError> {
        let Token::Open {
            name,
            attrs,
            self_closing,
            span,
        } = &self.tokens[at]
        else {
            return Err(ParseError::NoRootElement);
        };

        let mut tree = self.resolve_tag(name, attrs, span.start)?;
        if *self_closing {
            return Ok((tree, at + 1));
        }

        let Some(close) = find_matching_close(&self.tokens, at, name, limit) else {
            if IMPLICITLY_SELF_CLOSING
                .iter()
                .any(|t| t.eq_ignore_ascii_case(name))
            {
                log::warn!("<{name}> at byte {} has no closing tag; treating it as self-closing", span.start);
            } else {
                log::debug!("<{name}> at byte {} has no closing tag; children dropped", span.start);
            }
            return Ok((tree, at + 1));
        };

        let content = Span {
            start: span.end,
            end: self.tokens[close].span().start,
        };
        let raw = strip_comments(content.slice(self.src));
        let raw = raw.trim();

        if tree.node.kind == NodeKind::Text && !raw.starts_with('<') {
            if !raw.is_empty() {
                tree.node.text = raw.to_string();
            }
        } else {
            self.parse_children(at + 1, close, &mut tree)?;
        }
        Ok((tree, close + 1))
    }

    fn parse_children(&self, from: usize, to: usize, tree: &mut NodeTree) -> Result<(), ParseError> {
        let mut i = from;
        while i < to {
            match &self.tokens[i] {
                Token::Open { .. } => {
                    let (child, next) = self.parse_element(i, to)?;
                    tree.push(child);
                    i = next;
                }
                Token::Close { name, span } => {
                    log::debug!("stray </{name}> at byte {}", span.start);
                    i += 1;
                }
                token @ Token::Text { span } => {
                    if !self.is_blank(token) {
                        log::debug!(
                            "skipping text {:?} inside {}",
                            span.slice(self.src).trim(),
                            tree.node.id
                        );
                    }
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Registered factories first, then the built-in tag table.
    fn resolve_tag(&self, name: &str, attrs: &Props, offset: usize) -> Result<NodeTree, ParseError> {
        if let Some(factory) = self.components.get(name) {
            return Ok(factory.build(attrs));
        }

        if name.eq_ignore_ascii_case("include") {
            log::warn!(
                "unexpanded <include component={:?}> at byte {offset}; rendering an empty container",
                attrs.get("component").unwrap_or_default()
            );
            return Ok(NodeTree::new(SceneNode::anonymous(NodeKind::Container)));
        }

        let kind = NodeKind::from_tag(name).ok_or_else(|| ParseError::UnknownTag {
            tag: name.to_string(),
            offset,
        })?;
        let mut node = SceneNode::anonymous(kind);
        apply_props(&mut node, attrs, HexLayout::Argb);
        Ok(NodeTree::new(node))
    }
}

/// Remove `{/* ... */}` and `<!-- ... -->` comments from raw text content.
fn strip_comments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    loop {
        let next = [("{/*", "*/}"), ("<!--", "-->")]
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|pos| (pos, open, close)))
            .min_by_key(|&(pos, _, _)| pos);
        let Some((pos, open, close)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..pos]);
        let after = &rest[pos + open.len()..];
        rest = match after.find(close) {
            Some(end) => &after[end + close.len()..],
            None => "",
        };
    }
}
