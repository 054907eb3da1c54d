use std::fmt;

/// Structural failure while building a scene. These are the only problems
/// allowed to abort a parse; everything else is logged and defaulted.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no root element found")]
    NoRootElement,

    #[error("unknown tag <{tag}> at byte {offset}")]
    UnknownTag { tag: String, offset: usize },

    #[error("unterminated tag <{tag}> at byte {offset}")]
    UnterminatedTag { tag: String, offset: usize },

    #[error("invalid scene literal: {0}")]
    InvalidLiteral(String),

    #[error("malformed scene literal: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the dispatcher classified its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// Tag markup, starting with `<`.
    Markup,
    /// A JSON scene literal, starting with `{`.
    Json,
    /// Anything else; served by the fallback scene.
    Fallback,
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentFormat::Markup => "markup",
            ContentFormat::Json => "json",
            ContentFormat::Fallback => "fallback",
        })
    }
}

/// The single error returned by [`crate::Dsl::parse`]. Carries the
/// detected format and the original cause as its `source`.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse {format} content: {source}")]
pub struct FormatError {
    pub format: ContentFormat,
    #[source]
    pub source: ParseError,
}

impl FormatError {
    pub fn new(format: ContentFormat, source: ParseError) -> Self {
        Self { format, source }
    }
}
