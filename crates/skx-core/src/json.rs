//! JSON scene literals.
//!
//! A literal is an object whose keys are property names, bound through the
//! same property binder as markup attributes:
//!
//! ```json
//! { "type": "view", "id": "page", "background": "#F3F4F6",
//!   "children": [ { "type": "text", "text": "Hello", "size": 18 } ] }
//! ```
//!
//! `type` (or `kind`) picks the node kind and defaults to a container.
//! Eight-digit hex colors are `#RRGGBBAA` here, unlike markup.

use crate::color::{Color, HexLayout};
use crate::error::ParseError;
use crate::model::{
    Alignment, DEFAULT_FONT_SIZE, NodeKind, NodeTree, SceneGraph, SceneNode, WidgetState,
};
use crate::props::{Props, apply_props_except};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use serde_json::{Map, Value};

const STRUCTURAL_KEYS: &[&str] = &["type", "kind", "children"];

/// Parse a JSON scene literal into a fresh scene graph.
///
/// # Errors
/// Malformed JSON, a non-object node, an unknown `type`, or a `children`
/// value that is not an array.
pub fn parse_json_literal(src: &str) -> Result<SceneGraph, ParseError> {
    let value: Value = serde_json::from_str(src)?;
    literal_to_tree(&value).map(SceneGraph::from_tree)
}

fn literal_to_tree(value: &Value) -> Result<NodeTree, ParseError> {
    let Value::Object(fields) = value else {
        return Err(ParseError::InvalidLiteral(format!(
            "expected an object, found {}",
            type_name(value)
        )));
    };

    let kind = match field(fields, "type").or_else(|| field(fields, "kind")) {
        Some(Value::String(name)) => NodeKind::from_name(name)
            .ok_or_else(|| ParseError::InvalidLiteral(format!("unknown node type {name:?}")))?,
        Some(other) => {
            return Err(ParseError::InvalidLiteral(format!(
                "node type must be a string, found {}",
                type_name(other)
            )));
        }
        None => NodeKind::Container,
    };

    let mut props = Props::new();
    for (name, value) in fields {
        match scalar_text(value) {
            Some(text) => props.push(name.as_str(), text),
            None if STRUCTURAL_KEYS.iter().any(|k| k.eq_ignore_ascii_case(name)) => {}
            None => log::warn!("ignoring non-scalar property {name:?} in scene literal"),
        }
    }

    let mut node = SceneNode::anonymous(kind);
    apply_props_except(&mut node, &props, STRUCTURAL_KEYS, HexLayout::Rgba);
    let mut tree = NodeTree::new(node);

    match field(fields, "children") {
        None | Some(Value::Null) => {}
        Some(Value::Array(children)) => {
            for child in children {
                tree.push(literal_to_tree(child)?);
            }
        }
        Some(other) => {
            return Err(ParseError::InvalidLiteral(format!(
                "children must be an array, found {}",
                type_name(other)
            )));
        }
    }
    Ok(tree)
}

/// Case-insensitive key lookup.
fn field<'v>(fields: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    fields
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Scalars become attribute text; `null` is an empty value (reset to default).
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Emit ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Literal<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_color: Option<Color>,
    #[serde(skip_serializing_if = "is_zero")]
    border_width: f32,
    #[serde(skip_serializing_if = "is_zero")]
    corner_radius: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(skip_serializing_if = "is_default_font_size")]
    font_size: f32,
    #[serde(skip_serializing_if = "str::is_empty")]
    text: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    src: &'a str,
    #[serde(skip_serializing_if = "is_true")]
    visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    align: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    justify: Option<&'static str>,
    #[serde(skip_serializing_if = "is_zero")]
    margin: f32,
    #[serde(skip_serializing_if = "is_zero")]
    padding: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    placeholder: &'a str,
    #[serde(skip_serializing_if = "is_false")]
    checked: bool,
    #[serde(skip_serializing_if = "is_false")]
    selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_click: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_hover: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_focus: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_change: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_blur: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Literal<'a>>,
}

fn is_zero(n: &f32) -> bool {
    *n == 0.0
}

fn is_default_font_size(n: &f32) -> bool {
    *n == DEFAULT_FONT_SIZE
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn non_default_alignment(a: Alignment) -> Option<&'static str> {
    (a != Alignment::default()).then(|| a.as_str())
}

impl<'a> Literal<'a> {
    fn build(graph: &'a SceneGraph, idx: NodeIndex) -> Self {
        let node = &graph.graph[idx];
        let slider = node.kind == NodeKind::Slider;
        let defaults = WidgetState::default();
        let numeric = |v: f32, d: f32| (slider && v != d).then_some(v);

        Self {
            kind: node.kind.as_str(),
            id: node.id.as_str(),
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            background: node.style.background,
            border_color: node.style.border_color,
            border_width: node.style.border_width,
            corner_radius: node.style.corner_radius,
            fill: node.style.fill,
            color: node.style.text_color,
            font_size: node.style.font_size,
            text: &node.text,
            src: &node.image_path,
            visible: node.layout.visible,
            align: non_default_alignment(node.layout.align),
            justify: non_default_alignment(node.layout.justify),
            margin: node.layout.margin,
            padding: node.layout.padding,
            value: (!slider && !node.state.value.is_empty()).then_some(node.state.value.as_str()),
            placeholder: &node.state.placeholder,
            checked: node.state.checked,
            selected: node.state.selected,
            group: node.state.group.as_deref(),
            min: numeric(node.state.min, defaults.min),
            current: numeric(node.state.current, defaults.current),
            max: numeric(node.state.max, defaults.max),
            on_click: node.handlers.on_click.as_deref(),
            on_hover: node.handlers.on_hover.as_deref(),
            on_focus: node.handlers.on_focus.as_deref(),
            on_change: node.handlers.on_change.as_deref(),
            on_blur: node.handlers.on_blur.as_deref(),
            children: graph
                .children(idx)
                .into_iter()
                .map(|c| Literal::build(graph, c))
                .collect(),
        }
    }
}

/// Serialize a scene graph as a pretty-printed JSON scene literal.
///
/// # Errors
/// Only if serialization itself fails, which plain literals never do.
pub fn emit_json(graph: &SceneGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Literal::build(graph, graph.root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ComponentRegistry;
    use crate::id::NodeId;
    use crate::parser::parse_markup;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_binds_properties() {
        let graph = parse_json_literal(
            r##"{
                "Type": "view", "id": "json_page", "Width": 320, "background": "#FF000080",
                "children": [
                    { "kind": "text", "text": "Hello", "fontSize": 18, "visible": false },
                    { "type": "slider", "min": 0, "max": 10, "value": 4 }
                ]
            }"##,
        )
        .unwrap();

        let root = graph.root_node();
        assert_eq!(root.id.as_str(), "json_page");
        assert_eq!(root.width, 320.0);
        assert_eq!(root.style.background, Some(Color::rgba(255, 0, 0, 128)));

        let children = graph.children(graph.root);
        let text = &graph.graph[children[0]];
        assert_eq!(text.kind, NodeKind::Text);
        assert_eq!(text.style.font_size, 18.0);
        assert!(!text.layout.visible);
        let slider = &graph.graph[children[1]];
        assert_eq!((slider.state.max, slider.state.current), (10.0, 4.0));
    }

    #[test]
    fn untyped_literal_is_a_container() {
        let graph = parse_json_literal("{}").unwrap();
        assert_eq!(graph.root_node().kind, NodeKind::Container);
    }

    #[test]
    fn literal_errors() {
        assert!(matches!(parse_json_literal("[1]"), Err(ParseError::InvalidLiteral(_))));
        assert!(matches!(
            parse_json_literal(r#"{"type": "table"}"#),
            Err(ParseError::InvalidLiteral(_))
        ));
        assert!(matches!(
            parse_json_literal(r#"{"children": {}}"#),
            Err(ParseError::InvalidLiteral(_))
        ));
        assert!(matches!(parse_json_literal("{ nope"), Err(ParseError::Json(_))));
    }

    #[test]
    fn emit_then_parse_preserves_the_scene() {
        let graph = parse_markup(
            r##"<view id="emit_root" background="#803B82F6" padding="8">
                <input id="emit_name" placeholder="Name" value="Ada" onChange="set_name"/>
                <slider id="emit_volume" max="11" value="7"/>
                <radio id="emit_radio" group="g" checked/>
                <text id="emit_caption" align="center" visible="false">Caption</text>
            </view>"##,
            &ComponentRegistry::new(),
        )
        .unwrap();

        let json = emit_json(&graph).unwrap();
        let reparsed = parse_json_literal(&json).unwrap();
        assert_eq!(reparsed.to_tree(), graph.to_tree());
        assert!(json.contains("\"type\": \"slider\""));
        assert!(json.contains("\"background\": \"#3B82F680\""));
        let caption = reparsed.get_by_id(NodeId::intern("emit_caption")).unwrap();
        assert_eq!(caption.text, "Caption");
    }
}
