//! Component factories: named builders that turn an attribute mapping into
//! a node subtree with their own default geometry and styling.
//!
//! The element parser consults the registry before the built-in tag table,
//! so a factory registered as `Button` also handles plain `<button>` tags.

use crate::color::{Color, HexLayout};
use crate::model::{Alignment, NodeKind, NodeTree, SceneNode};
use crate::props::{Props, apply_props_except};
use std::collections::HashMap;
use std::fmt;

/// Builds a node subtree from attributes.
///
/// Implemented for every `Fn(&Props) -> NodeTree + Send + Sync`, so plain
/// closures register directly.
pub trait ComponentFactory: Send + Sync {
    fn build(&self, props: &Props) -> NodeTree;
}

impl<F> ComponentFactory for F
where
    F: Fn(&Props) -> NodeTree + Send + Sync,
{
    fn build(&self, props: &Props) -> NodeTree {
        self(props)
    }
}

/// Factories by case-insensitive name. Owned by the parser that uses it;
/// register everything before parsing.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, Box<dyn ComponentFactory>>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("factories", &names)
            .finish()
    }
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the `Button`, `Card` and `Header` factories.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("Button", button);
        registry.register("Card", card);
        registry.register("Header", header);
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, factory: impl ComponentFactory + 'static) {
        self.factories
            .insert(name.to_ascii_lowercase(), Box::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<&dyn ComponentFactory> {
        self.factories
            .get(&name.to_ascii_lowercase())
            .map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

// ─── Built-in factories ──────────────────────────────────────────────────

const PRIMARY: Color = Color::rgb(59, 130, 246);
const BORDER_GRAY: Color = Color::rgb(229, 231, 235);
const INK: Color = Color::rgb(17, 24, 39);
const MUTED: Color = Color::rgb(107, 114, 128);
const HEADER_BG: Color = Color::rgb(31, 41, 55);

fn label(parent: &SceneNode, suffix: &str, text: &str) -> SceneNode {
    let mut node = SceneNode::new(parent.id.part(suffix), NodeKind::Text);
    node.text = text.to_string();
    node
}

/// 120×40 rounded blue button with a centered label child.
///
/// `label` (or `text`) sets the caption, default `"Button"`.
pub fn button(props: &Props) -> NodeTree {
    let mut node = SceneNode::anonymous(NodeKind::Button);
    node.set_width(120.0);
    node.set_height(40.0);
    node.style.background = Some(PRIMARY);
    node.style.corner_radius = 6.0;
    node.style.text_color = Some(Color::WHITE);
    apply_props_except(&mut node, props, &["label", "text"], HexLayout::Argb);

    let caption = props
        .get_non_empty("label")
        .or_else(|| props.get_non_empty("text"))
        .unwrap_or("Button");
    let mut text = label(&node, "label", caption);
    text.set_width(node.width);
    text.set_height(node.height);
    text.style.text_color = node.style.text_color;
    text.style.font_size = node.style.font_size;
    text.layout.align = Alignment::Center;
    text.layout.justify = Alignment::Center;

    NodeTree::new(node).with_child(NodeTree::new(text))
}

/// 300×200 white bordered card with optional `title` and `subtitle` rows.
pub fn card(props: &Props) -> NodeTree {
    let mut node = SceneNode::anonymous(NodeKind::Container);
    node.set_width(300.0);
    node.set_height(200.0);
    node.style.background = Some(Color::WHITE);
    node.style.border_color = Some(BORDER_GRAY);
    node.style.border_width = 1.0;
    node.style.corner_radius = 8.0;
    node.layout.padding = 16.0;
    apply_props_except(&mut node, props, &["title", "subtitle"], HexLayout::Argb);

    let pad = node.layout.padding;
    let inner_width = (node.width - 2.0 * pad).max(0.0);
    let mut tree = NodeTree::new(node.clone());

    if let Some(title) = props.get_non_empty("title") {
        let mut text = label(&node, "title", title);
        text.x = pad;
        text.y = pad;
        text.set_width(inner_width);
        text.set_height(24.0);
        text.style.font_size = 18.0;
        text.style.text_color = Some(INK);
        tree.push(NodeTree::new(text));
    }
    if let Some(subtitle) = props.get_non_empty("subtitle") {
        let mut text = label(&node, "subtitle", subtitle);
        text.x = pad;
        text.y = pad + 28.0;
        text.set_width(inner_width);
        text.set_height(20.0);
        text.style.text_color = Some(MUTED);
        tree.push(NodeTree::new(text));
    }
    tree
}

/// Full-width 800×60 dark bar with an optional white `title`.
pub fn header(props: &Props) -> NodeTree {
    let mut node = SceneNode::anonymous(NodeKind::Container);
    node.set_width(800.0);
    node.set_height(60.0);
    node.style.background = Some(HEADER_BG);
    apply_props_except(&mut node, props, &["title"], HexLayout::Argb);

    let mut tree = NodeTree::new(node.clone());
    if let Some(title) = props.get_non_empty("title") {
        let mut text = label(&node, "title", title);
        text.x = 20.0;
        text.set_width((node.width - 40.0).max(0.0));
        text.set_height(node.height);
        text.style.font_size = 20.0;
        text.style.text_color = Some(Color::WHITE);
        text.layout.align = Alignment::Center;
        tree.push(NodeTree::new(text));
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_case_insensitive() {
        let registry = ComponentRegistry::with_builtins();
        assert!(registry.contains("button"));
        assert!(registry.contains("CARD"));
        assert!(registry.get("Header").is_some());
        assert!(registry.get("Footer").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn button_defaults_and_label() {
        let props: Props = [("label", "Save"), ("id", "save")].into_iter().collect();
        let tree = button(&props);
        assert_eq!(tree.node.kind, NodeKind::Button);
        assert_eq!(tree.node.id.as_str(), "save");
        assert_eq!((tree.node.width, tree.node.height), (120.0, 40.0));
        assert_eq!(tree.node.style.background, Some(PRIMARY));
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].node.text, "Save");
        assert_eq!(tree.children[0].node.id.as_str(), "save_label");
    }

    #[test]
    fn attributes_override_factory_defaults() {
        let props: Props = [("width", "200"), ("background", "red")].into_iter().collect();
        let tree = button(&props);
        assert_eq!(tree.node.width, 200.0);
        assert_eq!(tree.node.style.background, Some(Color::rgb(255, 0, 0)));
        assert_eq!(tree.children[0].node.text, "Button");
        assert_eq!(tree.children[0].node.width, 200.0);
    }

    #[test]
    fn card_rows_follow_padding() {
        let props: Props = [("title", "Plan"), ("subtitle", "Monthly"), ("padding", "10")]
            .into_iter()
            .collect();
        let tree = card(&props);
        assert_eq!(tree.children.len(), 2);
        let title = &tree.children[0].node;
        assert_eq!((title.x, title.y, title.width), (10.0, 10.0, 280.0));
        assert_eq!(tree.children[1].node.text, "Monthly");
    }

    #[test]
    fn custom_closure_factory() {
        let mut registry = ComponentRegistry::new();
        registry.register("Badge", |props: &Props| {
            let mut node = SceneNode::anonymous(NodeKind::Circle);
            node.text = props.get("count").unwrap_or("0").to_string();
            NodeTree::new(node)
        });
        let props: Props = [("count", "3")].into_iter().collect();
        let tree = registry.get("badge").unwrap().build(&props);
        assert_eq!(tree.node.kind, NodeKind::Circle);
        assert_eq!(tree.node.text, "3");
    }
}
