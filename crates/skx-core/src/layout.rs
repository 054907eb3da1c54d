//! Absolute bounds for rendering and hit-testing.
//!
//! Node positions are relative to the parent. Resolution is a single
//! top-down walk that adds each node's offset to its parent's absolute
//! origin. Layout hints (alignment, margin, padding) are declared on nodes
//! but not enforced here.

use crate::model::{ResolvedBounds, SceneGraph};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Absolute bounds of every visible node.
///
/// Invisible nodes and their whole subtrees are absent from the result.
pub fn resolve_bounds(graph: &SceneGraph) -> HashMap<NodeIndex, ResolvedBounds> {
    let mut bounds = HashMap::with_capacity(graph.node_count());
    resolve_subtree(graph, graph.root, 0.0, 0.0, &mut bounds);
    bounds
}

fn resolve_subtree(
    graph: &SceneGraph,
    idx: NodeIndex,
    origin_x: f32,
    origin_y: f32,
    bounds: &mut HashMap<NodeIndex, ResolvedBounds>,
) {
    let node = &graph.graph[idx];
    if !node.layout.visible {
        return;
    }

    let resolved = ResolvedBounds {
        x: origin_x + node.x,
        y: origin_y + node.y,
        width: node.width,
        height: node.height,
    };
    bounds.insert(idx, resolved);

    for child in graph.children(idx) {
        resolve_subtree(graph, child, resolved.x, resolved.y, bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ComponentRegistry;
    use crate::id::NodeId;
    use crate::parser::parse_markup;

    fn bounds_of(src: &str, id: &str) -> Option<ResolvedBounds> {
        let graph = parse_markup(src, &ComponentRegistry::new()).unwrap();
        let idx = graph.index_of(NodeId::intern(id))?;
        resolve_bounds(&graph).get(&idx).copied()
    }

    #[test]
    fn offsets_accumulate() {
        let src = r#"<view x="10" y="20"><view id="mid" x="5" y="5"><box id="leaf" x="1" y="2" width="4" height="3"/></view></view>"#;
        let leaf = bounds_of(src, "leaf").unwrap();
        assert_eq!((leaf.x, leaf.y, leaf.width, leaf.height), (16.0, 27.0, 4.0, 3.0));
    }

    #[test]
    fn invisible_subtrees_are_skipped() {
        let src = r#"<view><view id="gone" visible="false"><box id="inner"/></view><box id="kept"/></view>"#;
        assert!(bounds_of(src, "gone").is_none());
        assert!(bounds_of(src, "inner").is_none());
        assert!(bounds_of(src, "kept").is_some());
    }
}
