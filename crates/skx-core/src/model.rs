//! Scene node model.
//!
//! Every parse produces a fresh `SceneGraph`: an arena of `SceneNode`
//! values connected by parent→child edges. The arena owns every node;
//! a child's parent is found by walking the incoming edge, so the
//! upward link is an index and never a second owner. Sibling order is
//! declaration order, which is also paint order (later children are
//! painted on top and must be hit-tested first).

use crate::color::Color;
use crate::id::NodeId;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The closed set of element kinds the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Container,
    Text,
    Rectangle,
    Circle,
    Image,
    Button,
    Input,
    Checkbox,
    RadioButton,
    Slider,
    DropDown,
}

impl NodeKind {
    pub const ALL: [NodeKind; 11] = [
        NodeKind::Container,
        NodeKind::Text,
        NodeKind::Rectangle,
        NodeKind::Circle,
        NodeKind::Image,
        NodeKind::Button,
        NodeKind::Input,
        NodeKind::Checkbox,
        NodeKind::RadioButton,
        NodeKind::Slider,
        NodeKind::DropDown,
    ];

    /// Map a built-in markup tag (case-insensitive) to its kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.to_ascii_lowercase().as_str() {
            "view" | "slot" => NodeKind::Container,
            "text" => NodeKind::Text,
            "box" => NodeKind::Rectangle,
            "circle" => NodeKind::Circle,
            "image" => NodeKind::Image,
            "button" => NodeKind::Button,
            "input" => NodeKind::Input,
            "checkbox" => NodeKind::Checkbox,
            "radio" | "radiobutton" => NodeKind::RadioButton,
            "slider" => NodeKind::Slider,
            "dropdown" | "select" => NodeKind::DropDown,
            _ => return None,
        };
        Some(kind)
    }

    /// Resolve a kind from either its variant name (`RadioButton`,
    /// `rectangle`) or a markup tag (`box`, `select`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
            .or_else(|| Self::from_tag(name))
    }

    /// Lowercase variant name; also the prefix of generated ids.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Text => "text",
            NodeKind::Rectangle => "rectangle",
            NodeKind::Circle => "circle",
            NodeKind::Image => "image",
            NodeKind::Button => "button",
            NodeKind::Input => "input",
            NodeKind::Checkbox => "checkbox",
            NodeKind::RadioButton => "radiobutton",
            NodeKind::Slider => "slider",
            NodeKind::DropDown => "dropdown",
        }
    }

    /// Geometry used when markup leaves `width`/`height` unset.
    pub const fn default_size(self) -> (f32, f32) {
        match self {
            NodeKind::Checkbox | NodeKind::RadioButton => (20.0, 20.0),
            NodeKind::Circle => (50.0, 50.0),
            NodeKind::Slider => (200.0, 20.0),
            _ => (100.0, 30.0),
        }
    }

    /// Kinds that receive pointer input even without a click handler.
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            NodeKind::Button
                | NodeKind::Input
                | NodeKind::Checkbox
                | NodeKind::RadioButton
                | NodeKind::Slider
                | NodeKind::DropDown
        )
    }
}

// ─── Style & layout hints ────────────────────────────────────────────────

pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Visual style of a node. `None` colors are not painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub background: Option<Color>,
    pub border_color: Option<Color>,
    pub border_width: f32,
    pub corner_radius: f32,
    pub fill: Option<Color>,
    pub text_color: Option<Color>,
    pub font_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: None,
            border_color: None,
            border_width: 0.0,
            corner_radius: 0.0,
            fill: None,
            text_color: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

impl Alignment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "left" | "top" => Some(Alignment::Start),
            "center" | "middle" => Some(Alignment::Center),
            "end" | "right" | "bottom" => Some(Alignment::End),
            "stretch" | "fill" => Some(Alignment::Stretch),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::Center => "center",
            Alignment::End => "end",
            Alignment::Stretch => "stretch",
        }
    }
}

/// Declared layout hints. Positioning is absolute; these are carried for
/// the renderer and never enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutHints {
    pub visible: bool,
    pub align: Alignment,
    pub justify: Alignment,
    pub margin: f32,
    pub padding: f32,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            visible: true,
            align: Alignment::Start,
            justify: Alignment::Start,
            margin: 0.0,
            padding: 0.0,
        }
    }
}

// ─── Interactive state & events ──────────────────────────────────────────

/// Mutable widget state. Application handlers update it between renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetState {
    /// Current text of an input.
    pub value: String,
    pub placeholder: String,
    pub checked: bool,
    pub selected: bool,
    /// Mutual-exclusion group for radio buttons.
    pub group: Option<String>,
    pub min: f32,
    pub current: f32,
    pub max: f32,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            value: String::new(),
            placeholder: String::new(),
            checked: false,
            selected: false,
            group: None,
            min: 0.0,
            current: 0.0,
            max: 100.0,
        }
    }
}

/// Named handler bindings. Values are opaque message identifiers that the
/// application dispatches; they are never evaluated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandlers {
    pub on_click: Option<String>,
    pub on_hover: Option<String>,
    pub on_focus: Option<String>,
    pub on_change: Option<String>,
    pub on_blur: Option<String>,
}

// ─── Scene nodes ─────────────────────────────────────────────────────────

/// A single UI element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,

    /// Offset from the parent's resolved position.
    pub x: f32,
    pub y: f32,
    /// Never negative; see [`SceneNode::set_width`].
    pub width: f32,
    pub height: f32,

    pub style: Style,
    pub text: String,
    pub image_path: String,
    pub layout: LayoutHints,
    pub state: WidgetState,
    pub handlers: EventHandlers,
}

impl SceneNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id,
            kind,
            x: 0.0,
            y: 0.0,
            width,
            height,
            style: Style::default(),
            text: String::new(),
            image_path: String::new(),
            layout: LayoutHints::default(),
            state: WidgetState::default(),
            handlers: EventHandlers::default(),
        }
    }

    /// A node with a generated id (`button_7`).
    pub fn anonymous(kind: NodeKind) -> Self {
        Self::new(NodeId::for_kind(kind), kind)
    }

    /// Set the width, clamping negatives to zero.
    pub fn set_width(&mut self, width: f32) {
        self.width = width.max(0.0);
    }

    /// Set the height, clamping negatives to zero.
    pub fn set_height(&mut self, height: f32) {
        self.height = height.max(0.0);
    }

    /// Whether pointer input should stop at this node.
    pub fn accepts_pointer(&self) -> bool {
        self.handlers.on_click.is_some() || self.kind.is_interactive()
    }
}

/// A detached, owned subtree.
///
/// Parsers, component factories and the JSON codec build these first;
/// [`SceneGraph::from_tree`] then moves them into the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    pub node: SceneNode,
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    pub fn new(node: SceneNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: NodeTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: NodeTree) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, including the root.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeTree::node_count).sum::<usize>()
    }
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// The scene produced by one parse.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// Parent → child edges; insertion order is sibling order.
    pub graph: StableDiGraph<SceneNode, ()>,

    /// Index of the root element.
    pub root: NodeIndex,

    /// NodeId → NodeIndex lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,
}

impl SceneGraph {
    /// Create a graph holding a single root node.
    #[must_use]
    pub fn new(root: SceneNode) -> Self {
        let mut graph = StableDiGraph::new();
        let id = root.id;
        let root = graph.add_node(root);

        let mut id_index = HashMap::new();
        id_index.insert(id, root);

        Self {
            graph,
            root,
            id_index,
        }
    }

    /// Move a detached tree into a fresh graph.
    #[must_use]
    pub fn from_tree(tree: NodeTree) -> Self {
        let NodeTree { node, children } = tree;
        let mut sg = Self::new(node);
        let root = sg.root;
        for child in children {
            sg.add_tree(root, child);
        }
        sg
    }

    /// Add a node as the last child of `parent`. Returns the new node's index.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        if self.id_index.insert(id, idx).is_some() {
            log::warn!("duplicate node id {id:?}; lookups resolve to the latest node");
        }
        idx
    }

    /// Add a whole subtree under `parent`, preserving child order.
    pub fn add_tree(&mut self, parent: NodeIndex, tree: NodeTree) -> NodeIndex {
        let NodeTree { node, children } = tree;
        let idx = self.add_node(parent, node);
        for child in children {
            self.add_tree(idx, child);
        }
        idx
    }

    pub fn root_node(&self) -> &SceneNode {
        &self.graph[self.root]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn get_by_id(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_by_id_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Upward back-reference: the parent of `idx`, if any.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in declaration (paint) order.
    ///
    /// Sorted by `NodeIndex`: nodes are only ever appended, so index order
    /// is insertion order regardless of petgraph's adjacency iteration.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Copy the graph back out into a detached tree.
    pub fn to_tree(&self) -> NodeTree {
        self.subtree(self.root)
    }

    fn subtree(&self, idx: NodeIndex) -> NodeTree {
        NodeTree {
            node: self.graph[idx].clone(),
            children: self
                .children(idx)
                .into_iter()
                .map(|c| self.subtree(c))
                .collect(),
        }
    }
}

// ─── Resolved positions ──────────────────────────────────────────────────

/// Absolute bounding box: the node's offset plus every ancestor's offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ResolvedBounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind) -> SceneNode {
        SceneNode::new(NodeId::intern(id), kind)
    }

    #[test]
    fn scene_graph_basics() {
        let mut sg = SceneGraph::new(node("page", NodeKind::Container));
        let idx = sg.add_node(sg.root, node("box1", NodeKind::Rectangle));

        assert!(sg.get_by_id(NodeId::intern("box1")).is_some());
        assert_eq!(sg.children(sg.root), vec![idx]);
        assert_eq!(sg.parent(idx), Some(sg.root));
        assert_eq!(sg.parent(sg.root), None);
    }

    #[test]
    fn children_keep_declaration_order() {
        let tree = NodeTree::new(node("list", NodeKind::Container))
            .with_child(NodeTree::new(node("first", NodeKind::Text)))
            .with_child(
                NodeTree::new(node("second", NodeKind::Container))
                    .with_child(NodeTree::new(node("nested", NodeKind::Circle))),
            )
            .with_child(NodeTree::new(node("third", NodeKind::Text)));
        assert_eq!(tree.node_count(), 5);

        let sg = SceneGraph::from_tree(tree.clone());
        let ids: Vec<&str> = sg
            .children(sg.root)
            .into_iter()
            .map(|i| sg.graph[i].id.as_str())
            .collect();
        assert_eq!(ids, ["first", "second", "third"]);
        assert_eq!(sg.to_tree(), tree);
    }

    #[test]
    fn default_geometry_per_kind() {
        let n = SceneNode::anonymous(NodeKind::Container);
        assert_eq!((n.width, n.height), (100.0, 30.0));
        let c = SceneNode::anonymous(NodeKind::Checkbox);
        assert_eq!((c.width, c.height), (20.0, 20.0));
        assert!(n.id.as_str().starts_with("container_"));
    }

    #[test]
    fn negative_size_is_clamped() {
        let mut n = SceneNode::anonymous(NodeKind::Rectangle);
        n.set_width(-5.0);
        n.set_height(-0.5);
        assert_eq!((n.width, n.height), (0.0, 0.0));
    }

    #[test]
    fn tag_and_name_lookup() {
        assert_eq!(NodeKind::from_tag("VIEW"), Some(NodeKind::Container));
        assert_eq!(NodeKind::from_tag("select"), Some(NodeKind::DropDown));
        assert_eq!(NodeKind::from_tag("radio"), Some(NodeKind::RadioButton));
        assert_eq!(NodeKind::from_tag("table"), None);
        assert_eq!(NodeKind::from_name("RadioButton"), Some(NodeKind::RadioButton));
        assert_eq!(NodeKind::from_name("box"), Some(NodeKind::Rectangle));
    }

    #[test]
    fn pointer_acceptance() {
        let mut rect = SceneNode::anonymous(NodeKind::Rectangle);
        assert!(!rect.accepts_pointer());
        rect.handlers.on_click = Some("select_rect".into());
        assert!(rect.accepts_pointer());
        assert!(SceneNode::anonymous(NodeKind::Slider).accepts_pointer());
    }
}
