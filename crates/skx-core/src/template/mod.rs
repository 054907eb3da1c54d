//! Component template engine: expands `<include component="X" ...>`
//! directives into plain markup before the element parser runs.
//!
//! Expansion runs in passes. Each pass replaces every top-level include
//! with its component body: the include's children are projected into the
//! body's slots first, then every `{...}` placeholder in the result is
//! evaluated against the include's attributes. Includes produced by a pass
//! (nested components, or includes passed in as children) are handled by
//! the next pass.
//!
//! Failures never abort expansion; they are logged and left in the output
//! as `<!-- ... -->` comments.

pub mod expr;
mod slots;
pub mod source;

pub use source::{DirectorySource, MemorySource, TemplateRegistry, TemplateSource};

use crate::lexer::{Token, find_matching_close, tokenize_lenient};
use crate::props::Props;
use slots::{Segment, SlotContent, scan_body, scan_placeholders};

/// Upper bound on expansion passes over the whole document.
pub const MAX_PASSES: usize = 10;

/// Upper bound on include replacements across all passes.
pub const MAX_REPLACEMENTS: usize = 100;

/// Placeholders that project the default slot, kept for older templates.
const SLOT_ALIASES: [&str; 3] = ["content", "children", "navItems"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("include without a component attribute")]
    MissingComponentAttr,

    #[error("Component '{0}' not found")]
    UnknownComponent(String),
}

#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    templates: TemplateRegistry,
}

impl TemplateEngine {
    pub fn new(templates: TemplateRegistry) -> Self {
        Self { templates }
    }

    pub fn from_source(source: &dyn TemplateSource) -> Self {
        Self::new(TemplateRegistry::from_source(source))
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    /// Expand every include in `src`. Never fails.
    ///
    /// Stops early once a pass replaces nothing. When either ceiling is
    /// reached the remaining includes are left in place and a warning is
    /// logged.
    pub fn expand_includes(&self, src: &str) -> String {
        let mut text = src.to_string();
        let mut replacements = 0usize;

        for pass in 0..MAX_PASSES {
            let (next, replaced) = self.expand_pass(&text, &mut replacements);
            if replaced == 0 {
                return text;
            }
            log::debug!("expansion pass {} replaced {replaced} include(s)", pass + 1);
            text = next;
            if replacements >= MAX_REPLACEMENTS {
                log::warn!(
                    "include expansion stopped after {MAX_REPLACEMENTS} replacements; remaining includes are left in place"
                );
                return text;
            }
        }

        if contains_include(&text) {
            log::warn!(
                "include expansion stopped after {MAX_PASSES} passes; remaining includes are left in place"
            );
        }
        text
    }

    /// One pass over `src`. Returns the new text and how many includes it
    /// replaced.
    fn expand_pass(&self, src: &str, replacements: &mut usize) -> (String, usize) {
        let tokens = tokenize_lenient(src);

        let mut out = String::with_capacity(src.len());
        let mut copied = 0;
        let mut replaced = 0;
        let mut i = 0;

        while i < tokens.len() {
            let Token::Open {
                name,
                attrs,
                self_closing,
                span,
            } = &tokens[i]
            else {
                i += 1;
                continue;
            };
            if !name.eq_ignore_ascii_case("include") {
                i += 1;
                continue;
            }
            if *replacements >= MAX_REPLACEMENTS {
                break;
            }

            let close = if *self_closing {
                None
            } else {
                find_matching_close(&tokens, i, name, tokens.len())
            };
            let (children, end, next) = match close {
                Some(c) => {
                    let close_span = tokens[c].span();
                    (&src[span.end..close_span.start], close_span.end, c + 1)
                }
                None => ("", span.end, i + 1),
            };

            out.push_str(&src[copied..span.start]);
            out.push_str(&self.render_include(attrs, children));
            copied = end;
            i = next;
            replaced += 1;
            *replacements += 1;
        }

        out.push_str(&src[copied..]);
        (out, replaced)
    }

    fn render_include(&self, attrs: &Props, children: &str) -> String {
        match self.instantiate(attrs, children) {
            Ok(markup) => markup,
            Err(err) => {
                log::warn!("{err}");
                format!("<!-- {} -->", err.to_string().replace("--", "- -"))
            }
        }
    }

    fn instantiate(&self, attrs: &Props, children: &str) -> Result<String, TemplateError> {
        let name = attrs
            .get_non_empty("component")
            .ok_or(TemplateError::MissingComponentAttr)?;
        let body = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::UnknownComponent(name.to_string()))?;
        let slots = SlotContent::split(children);
        Ok(render_body(body, attrs, &slots))
    }
}

/// Instantiate one component body: fill its slots with the include's
/// children, then evaluate every placeholder in the result, projected
/// content included.
fn render_body(body: &str, props: &Props, slots: &SlotContent) -> String {
    evaluate_placeholders(&fill_slots(body, props, slots), props)
}

/// Replace slots (and the legacy slot aliases) with projected content or
/// their fallback. Comments and other placeholders are copied unchanged.
fn fill_slots(body: &str, props: &Props, slots: &SlotContent) -> String {
    let mut out = String::with_capacity(body.len());
    for segment in scan_body(body) {
        match segment {
            Segment::Text(text) | Segment::Comment(text) => out.push_str(text),
            Segment::Placeholder(inner) => match slot_alias(inner, props, slots) {
                Some(content) => out.push_str(content),
                None => {
                    out.push('{');
                    out.push_str(inner);
                    out.push('}');
                }
            },
            Segment::Slot { name, fallback } => {
                let content = slots.get(name.as_deref());
                if content.is_empty() {
                    out.push_str(&fill_slots(fallback, props, slots));
                } else {
                    out.push_str(content);
                }
            }
            Segment::Malformed => out.push_str("<view></view>"),
        }
    }
    out
}

/// `{content}`, `{children}` and `{navItems}` project the default slot, or
/// the attribute of that name when there are no children.
fn slot_alias<'a>(placeholder: &str, props: &'a Props, slots: &'a SlotContent) -> Option<&'a str> {
    let key = placeholder.trim();
    if !SLOT_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(key)) {
        return None;
    }
    if slots.default.is_empty() {
        Some(props.get(key).unwrap_or_default())
    } else {
        Some(slots.default.as_str())
    }
}

fn evaluate_placeholders(text: &str, props: &Props) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in scan_placeholders(text) {
        match segment {
            Segment::Placeholder(inner) => out.push_str(&substitute(inner, props)),
            Segment::Text(text) | Segment::Comment(text) => out.push_str(text),
            Segment::Slot { .. } | Segment::Malformed => {}
        }
    }
    out
}

fn substitute(placeholder: &str, props: &Props) -> String {
    match expr::evaluate(placeholder, props) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("{err}; substituting an empty string");
            String::new()
        }
    }
}

fn contains_include(text: &str) -> bool {
    tokenize_lenient(text)
        .iter()
        .any(|t| matches!(t, Token::Open { name, .. } if name.eq_ignore_ascii_case("include")))
}
