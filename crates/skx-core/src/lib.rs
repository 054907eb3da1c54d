pub mod color;
pub mod config;
pub mod dsl;
pub mod error;
pub mod factory;
pub mod id;
pub mod json;
pub mod layout;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod props;
pub mod template;

pub use color::{Color, HexLayout, resolve_color};
pub use config::EngineConfig;
pub use dsl::Dsl;
pub use error::{ContentFormat, FormatError, ParseError};
pub use factory::{ComponentFactory, ComponentRegistry};
pub use id::NodeId;
pub use json::{emit_json, parse_json_literal};
pub use layout::resolve_bounds;
pub use model::*;
pub use parser::parse_markup;
pub use props::{Props, apply_props};
pub use template::{
    DirectorySource, MAX_PASSES, MAX_REPLACEMENTS, MemorySource, TemplateEngine,
    TemplateRegistry, TemplateSource,
};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
