//! Entry point: template expansion, format detection and parsing.

use crate::color::Color;
use crate::config::EngineConfig;
use crate::error::{ContentFormat, FormatError};
use crate::factory::{ComponentFactory, ComponentRegistry};
use crate::json::parse_json_literal;
use crate::model::{Alignment, NodeKind, NodeTree, SceneGraph, SceneNode};
use crate::parser::parse_markup;
use crate::template::{DirectorySource, TemplateEngine};
use std::borrow::Cow;

/// Caption of the scene served for content that is neither markup nor a
/// JSON literal.
pub const FALLBACK_TEXT: &str = "Unsupported content";

/// A configured parsing pipeline. Register factories and load templates
/// before the first parse; afterwards the value is only read.
#[derive(Debug)]
pub struct Dsl {
    components: ComponentRegistry,
    templates: Option<TemplateEngine>,
}

impl Default for Dsl {
    fn default() -> Self {
        Self::new()
    }
}

impl Dsl {
    /// Built-in factories, no template expansion.
    pub fn new() -> Self {
        Self {
            components: ComponentRegistry::with_builtins(),
            templates: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let components = if config.builtin_factories {
            ComponentRegistry::with_builtins()
        } else {
            ComponentRegistry::new()
        };
        let templates = config.components_dir.as_ref().map(|dir| {
            let source = DirectorySource::new(dir).with_extension(&config.template_extension);
            TemplateEngine::from_source(&source)
        });
        Self {
            components,
            templates,
        }
    }

    #[must_use]
    pub fn with_templates(mut self, engine: TemplateEngine) -> Self {
        self.templates = Some(engine);
        self
    }

    pub fn register_component(&mut self, name: &str, factory: impl ComponentFactory + 'static) {
        self.components.register(name, factory);
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn templates(&self) -> Option<&TemplateEngine> {
        self.templates.as_ref()
    }

    /// Run include expansion, if templates are configured.
    pub fn expand<'c>(&self, content: &'c str) -> Cow<'c, str> {
        match &self.templates {
            Some(engine) => Cow::Owned(engine.expand_includes(content)),
            None => Cow::Borrowed(content),
        }
    }

    /// Classify content by its first non-whitespace character.
    pub fn detect_format(content: &str) -> ContentFormat {
        match content.trim_start().chars().next() {
            Some('<') => ContentFormat::Markup,
            Some('{') => ContentFormat::Json,
            _ => ContentFormat::Fallback,
        }
    }

    /// Parse markup, a JSON literal, or anything else into a scene.
    ///
    /// # Errors
    /// A `FormatError` naming the detected format, with the underlying
    /// `ParseError` as its source. Fallback content never fails.
    pub fn parse(&self, content: &str) -> Result<SceneGraph, FormatError> {
        let expanded = self.expand(content);
        let format = Self::detect_format(&expanded);
        log::debug!("parsing {} bytes as {format}", expanded.len());

        let result = match format {
            ContentFormat::Markup => parse_markup(&expanded, &self.components),
            ContentFormat::Json => parse_json_literal(&expanded),
            ContentFormat::Fallback => {
                log::warn!("content is neither markup nor a scene literal; using the fallback scene");
                return Ok(fallback_scene());
            }
        };
        result.map_err(|source| FormatError::new(format, source))
    }
}

/// A placeholder panel with a centered caption.
pub fn fallback_scene() -> SceneGraph {
    let mut root = SceneNode::anonymous(NodeKind::Container);
    root.set_width(400.0);
    root.set_height(300.0);
    root.style.background = Some(Color::rgb(243, 244, 246));

    let mut caption = SceneNode::anonymous(NodeKind::Text);
    caption.set_width(root.width);
    caption.set_height(root.height);
    caption.text = FALLBACK_TEXT.to_string();
    caption.style.text_color = Some(Color::rgb(107, 114, 128));
    caption.layout.align = Alignment::Center;
    caption.layout.justify = Alignment::Center;

    SceneGraph::from_tree(NodeTree::new(root).with_child(NodeTree::new(caption)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::template::MemorySource;
    use std::error::Error;

    #[test]
    fn format_detection() {
        assert_eq!(Dsl::detect_format("  \n<view/>"), ContentFormat::Markup);
        assert_eq!(Dsl::detect_format("{\"type\":\"view\"}"), ContentFormat::Json);
        assert_eq!(Dsl::detect_format("hello"), ContentFormat::Fallback);
        assert_eq!(Dsl::detect_format(""), ContentFormat::Fallback);
    }

    #[test]
    fn fallback_content_yields_fixed_scene() {
        let graph = Dsl::new().parse("plain words").unwrap();
        assert_eq!(graph.node_count(), 2);
        let caption = &graph.graph[graph.children(graph.root)[0]];
        assert_eq!(caption.text, FALLBACK_TEXT);
    }

    #[test]
    fn errors_carry_format_and_source() {
        let err = Dsl::new().parse("<view><table/></view>").unwrap_err();
        assert_eq!(err.format, ContentFormat::Markup);
        assert!(matches!(err.source, ParseError::UnknownTag { .. }));
        assert!(err.to_string().contains("<table>"));
        assert!(err.source().is_some());

        let err = Dsl::new().parse("{ broken").unwrap_err();
        assert_eq!(err.format, ContentFormat::Json);
    }

    #[test]
    fn templates_run_before_parsing() {
        let source = MemorySource::new().with("Badge", "<circle width=\"{size || 24}\"/>");
        let dsl = Dsl::new().with_templates(TemplateEngine::from_source(&source));
        let graph = dsl
            .parse("<view><include component=\"Badge\" size=\"12\"/></view>")
            .unwrap();
        let badge = &graph.graph[graph.children(graph.root)[0]];
        assert_eq!(badge.kind, NodeKind::Circle);
        assert_eq!(badge.width, 12.0);
    }

    #[test]
    fn without_builtins_button_is_plain() {
        let config = EngineConfig {
            builtin_factories: false,
            ..EngineConfig::default()
        };
        let graph = Dsl::from_config(&config).parse("<button/>").unwrap();
        assert_eq!(graph.root_node().kind, NodeKind::Button);
        assert_eq!(graph.root_node().width, 100.0);
        assert!(graph.children(graph.root).is_empty());
    }

    #[test]
    fn custom_factory_registration() {
        let mut dsl = Dsl::new();
        dsl.register_component("Spacer", |_: &crate::props::Props| {
            NodeTree::new(SceneNode::anonymous(NodeKind::Rectangle))
        });
        let graph = dsl.parse("<spacer/>").unwrap();
        assert_eq!(graph.root_node().kind, NodeKind::Rectangle);
    }
}
