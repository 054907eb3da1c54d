//! Hit testing: point → node lookup.
//!
//! Reverse-walks the render tree (front-to-back) to find the topmost node
//! that accepts pointer input at a given (x, y) canvas position.

use skx_core::id::NodeId;
use skx_core::{NodeIndex, ResolvedBounds, SceneGraph};
use std::collections::HashMap;

/// Find the topmost pointer target at (px, py).
///
/// A node is a target when it has a click handler or is an interactive
/// widget. Returns `None` when nothing clickable is under the point.
pub fn hit_test(
    graph: &SceneGraph,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
    px: f32,
    py: f32,
) -> Option<NodeId> {
    hit_test_node(graph, graph.root, bounds, px, py)
}

fn hit_test_node(
    graph: &SceneGraph,
    idx: NodeIndex,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
    px: f32,
    py: f32,
) -> Option<NodeId> {
    // Invisible: neither it nor its subtree has bounds.
    let b = bounds.get(&idx)?;

    // Check children in reverse (topmost first)
    for &child_idx in graph.children(idx).iter().rev() {
        if let Some(hit) = hit_test_node(graph, child_idx, bounds, px, py) {
            return Some(hit);
        }
    }

    let node = &graph.graph[idx];
    if node.accepts_pointer() && b.contains(px, py) {
        return Some(node.id);
    }
    None
}

/// The click handler of the topmost target at (px, py), if it has one.
pub fn click_handler<'g>(
    graph: &'g SceneGraph,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
    px: f32,
    py: f32,
) -> Option<(NodeId, &'g str)> {
    let id = hit_test(graph, bounds, px, py)?;
    let handler = graph.get_by_id(id)?.handlers.on_click.as_deref()?;
    Some((id, handler))
}
