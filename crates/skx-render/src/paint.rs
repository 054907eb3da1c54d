//! Scene graph → canvas drawing calls.
//!
//! Depth-first in child order, so later siblings paint over earlier ones.
//! Nodes without resolved bounds (invisible subtrees) are skipped.

use skx_core::model::{NodeKind, SceneNode, Style};
use skx_core::{NodeIndex, ResolvedBounds, SceneGraph};
use std::collections::HashMap;

/// Drawing backend. One call per painted node, in paint order.
pub trait Canvas {
    /// Rectangle with the node's background, border and corner radius.
    fn rect(&mut self, bounds: &ResolvedBounds, style: &Style);

    /// Ellipse inscribed in `bounds`.
    fn ellipse(&mut self, bounds: &ResolvedBounds, style: &Style);

    fn text(&mut self, bounds: &ResolvedBounds, text: &str, style: &Style);

    fn image(&mut self, bounds: &ResolvedBounds, path: &str, style: &Style);

    /// Input, checkbox, radio button, slider or dropdown. The node carries
    /// the widget state to draw.
    fn widget(&mut self, bounds: &ResolvedBounds, node: &SceneNode);
}

/// Paint the whole scene.
pub fn paint_scene(
    canvas: &mut dyn Canvas,
    graph: &SceneGraph,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
) {
    paint_node(canvas, graph, graph.root, bounds);
}

fn paint_node(
    canvas: &mut dyn Canvas,
    graph: &SceneGraph,
    idx: NodeIndex,
    bounds: &HashMap<NodeIndex, ResolvedBounds>,
) {
    let node = &graph.graph[idx];
    let Some(nb) = bounds.get(&idx) else {
        return;
    };

    match node.kind {
        NodeKind::Container => {
            if has_box_style(&node.style) {
                canvas.rect(nb, &node.style);
            }
        }

        NodeKind::Rectangle | NodeKind::Button => canvas.rect(nb, &node.style),

        NodeKind::Circle => canvas.ellipse(nb, &node.style),

        NodeKind::Text => {
            log::trace!("TEXT {} {:?} at ({}, {})", node.id, node.text, nb.x, nb.y);
            canvas.text(nb, &node.text, &node.style);
        }

        NodeKind::Image => canvas.image(nb, &node.image_path, &node.style),

        NodeKind::Input
        | NodeKind::Checkbox
        | NodeKind::RadioButton
        | NodeKind::Slider
        | NodeKind::DropDown => canvas.widget(nb, node),
    }

    for child_idx in graph.children(idx) {
        paint_node(canvas, graph, child_idx, bounds);
    }
}

/// Containers only draw when they have something visible of their own.
fn has_box_style(style: &Style) -> bool {
    style.background.is_some() || (style.border_color.is_some() && style.border_width > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skx_core::{ComponentRegistry, parse_markup, resolve_bounds};

    /// Records one line per call.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Canvas for Recorder {
        fn rect(&mut self, b: &ResolvedBounds, _: &Style) {
            self.calls.push(format!("rect {} {}", b.x, b.y));
        }
        fn ellipse(&mut self, b: &ResolvedBounds, _: &Style) {
            self.calls.push(format!("ellipse {} {}", b.x, b.y));
        }
        fn text(&mut self, _: &ResolvedBounds, text: &str, _: &Style) {
            self.calls.push(format!("text {text}"));
        }
        fn image(&mut self, _: &ResolvedBounds, path: &str, _: &Style) {
            self.calls.push(format!("image {path}"));
        }
        fn widget(&mut self, _: &ResolvedBounds, node: &SceneNode) {
            self.calls.push(format!("widget {}", node.kind.as_str()));
        }
    }

    fn paint(src: &str) -> Vec<String> {
        let graph = parse_markup(src, &ComponentRegistry::with_builtins()).unwrap();
        let bounds = resolve_bounds(&graph);
        let mut canvas = Recorder::default();
        paint_scene(&mut canvas, &graph, &bounds);
        canvas.calls
    }

    #[test]
    fn paints_in_child_order() {
        let calls = paint(
            r#"<view x="10" y="10">
                <box x="5" y="5"/>
                <circle/>
                <text>Hi</text>
                <image src="logo.png"/>
                <checkbox/>
            </view>"#,
        );
        assert_eq!(
            calls,
            vec![
                "rect 15 15",
                "ellipse 10 10",
                "text Hi",
                "image logo.png",
                "widget checkbox",
            ]
        );
    }

    #[test]
    fn styled_containers_paint_and_plain_ones_do_not() {
        let calls = paint(r#"<view><view background="red"/><view border="blue" borderWidth="1"/></view>"#);
        assert_eq!(calls, vec!["rect 0 0", "rect 0 0"]);
    }

    #[test]
    fn invisible_subtrees_are_not_painted() {
        let calls = paint(r#"<view><view visible="false"><text>secret</text></view><text>shown</text></view>"#);
        assert_eq!(calls, vec!["text shown"]);
    }

    #[test]
    fn button_factory_paints_body_then_label() {
        let calls = paint(r#"<view><button label="Go"/></view>"#);
        assert_eq!(calls, vec!["rect 0 0", "text Go"]);
    }
}
