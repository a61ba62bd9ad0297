//! Compile a document step (or the live tree workspace) into a retained scene.
//!
//! Compilation is total: malformed components are skipped, dangling ids are
//! ignored, and the result is always a drawable [`Scene`]. Rasterization of
//! the ops lives in [`crate::render_cpu`].

use std::collections::HashSet;

use kurbo::Shape as _;

use crate::{
    core::{Affine, BezPath, Point, Rgba8},
    model::{RenderStrategy, VisualComponent, VisualizationData},
    tree::{NodeState, TreeWorkspace},
};

/// Retained drawing instructions for one frame, in draw order.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Uniform zoom applied to every op at raster time.
    pub transform: Affine,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    Fill {
        path: BezPath,
        color: Rgba8,
    },
    Stroke {
        path: BezPath,
        color: Rgba8,
        width: f64,
    },
    /// Pre-wrapped label text, centered on `origin`.
    Label {
        lines: Vec<String>,
        origin: Point,
        size_px: f32,
        color: Rgba8,
    },
}

// Fixed palette shared by both strategies and the tree view.
pub const NODE_FILL: Rgba8 = Rgba8::opaque(0x3b, 0x82, 0xf6);
pub const BOX_FILL: Rgba8 = Rgba8::opaque(0x33, 0x41, 0x55);
pub const HIGHLIGHT_FILL: Rgba8 = Rgba8::opaque(0xf5, 0x9e, 0x0b);
pub const EDGE_COLOR: Rgba8 = Rgba8::opaque(0x94, 0xa3, 0xb8);
pub const EDGE_HIGHLIGHT: Rgba8 = Rgba8::opaque(0xf5, 0x9e, 0x0b);
pub const OUTLINE_COLOR: Rgba8 = Rgba8::opaque(0x1e, 0x29, 0x3b);
pub const LABEL_COLOR: Rgba8 = Rgba8::opaque(0xf8, 0xfa, 0xfc);
pub const VISITING_FILL: Rgba8 = Rgba8::opaque(0xf5, 0x9e, 0x0b);
pub const VISITED_FILL: Rgba8 = Rgba8::opaque(0x10, 0xb9, 0x81);

const DEFAULT_NODE_RADIUS: f64 = 40.0;
const DEFAULT_BOX_WIDTH: f64 = 120.0;
const DEFAULT_BOX_HEIGHT: f64 = 60.0;
const EDGE_WIDTH: f64 = 2.0;
const EDGE_WIDTH_HIGHLIGHT: f64 = 4.0;
const ARROW_LEN: f64 = 15.0;
const ARROW_HALF_ANGLE_RAD: f64 = 30.0 * std::f64::consts::PI / 180.0;
const NODE_LABEL_SIZE: f32 = 14.0;
const BOX_LABEL_SIZE: f32 = 13.0;
const BOX_LABEL_PAD: f64 = 20.0;
const PATH_TOLERANCE: f64 = 0.1;

const TREE_NODE_RADIUS: f64 = 22.0;

/// Compile one step of a document. `step_index` is clamped to the valid
/// range, so a stepless document compiles its static view for any index.
#[tracing::instrument(skip(doc), fields(kind = doc.visualization_type.as_str()))]
pub fn compile_scene(doc: &VisualizationData, step_index: usize, zoom: f64) -> Scene {
    let highlight = doc.highlight_for(step_index.min(doc.step_count() - 1));
    let mut scene = Scene {
        transform: zoom_affine(zoom),
        ops: Vec::new(),
    };

    // Edges first so every node body paints over the lines touching it.
    match doc.strategy() {
        RenderStrategy::NodeEdge => {
            compile_edges(doc, &highlight, false, &mut scene);
            for comp in &doc.components {
                compile_circle_node(comp, &highlight, &mut scene);
            }
        }
        RenderStrategy::BoxArrow => {
            compile_edges(doc, &highlight, true, &mut scene);
            for comp in &doc.components {
                compile_box_node(comp, &highlight, &mut scene);
            }
        }
    }

    scene
}

/// Project the interactive tree workspace through the same scene vocabulary:
/// parent-child edges, then circles colored by traversal state.
pub fn tree_scene(tree: &TreeWorkspace, zoom: f64) -> Scene {
    let mut scene = Scene {
        transform: zoom_affine(zoom),
        ops: Vec::new(),
    };

    for node in tree.nodes() {
        for child_id in [node.left, node.right].into_iter().flatten() {
            if let Some(child) = tree.node(child_id) {
                scene.ops.push(DrawOp::Stroke {
                    path: line_path(
                        Point::new(node.x, node.y),
                        Point::new(child.x, child.y),
                    ),
                    color: EDGE_COLOR,
                    width: EDGE_WIDTH,
                });
            }
        }
    }

    for node in tree.nodes() {
        let center = Point::new(node.x, node.y);
        let fill = match node.state {
            NodeState::Normal => NODE_FILL,
            NodeState::Visiting => VISITING_FILL,
            NodeState::Visited => VISITED_FILL,
        };
        scene.ops.push(DrawOp::Fill {
            path: circle_path(center, TREE_NODE_RADIUS),
            color: fill,
        });
        scene.ops.push(DrawOp::Stroke {
            path: circle_path(center, TREE_NODE_RADIUS),
            color: OUTLINE_COLOR,
            width: EDGE_WIDTH,
        });
        scene.ops.push(DrawOp::Label {
            lines: vec![node.value.to_string()],
            origin: center,
            size_px: NODE_LABEL_SIZE,
            color: LABEL_COLOR,
        });
    }

    scene
}

fn compile_edges(
    doc: &VisualizationData,
    highlight: &HashSet<&str>,
    arrows: bool,
    scene: &mut Scene,
) {
    for comp in &doc.components {
        let Some(from) = position(comp) else {
            continue;
        };
        for target_id in &comp.connections {
            let Some(target) = doc.component(target_id) else {
                tracing::debug!(from = %comp.id, to = %target_id, "dangling connection skipped");
                continue;
            };
            let Some(to) = position(target) else {
                continue;
            };

            let lit = highlight.contains(comp.id.as_str()) || highlight.contains(target_id.as_str());
            let (color, width) = if lit {
                (EDGE_HIGHLIGHT, EDGE_WIDTH_HIGHLIGHT)
            } else {
                (EDGE_COLOR, EDGE_WIDTH)
            };

            scene.ops.push(DrawOp::Stroke {
                path: line_path(from, to),
                color,
                width,
            });
            if arrows {
                scene.ops.push(DrawOp::Stroke {
                    path: arrow_head(from, to),
                    color,
                    width,
                });
            }
        }
    }
}

fn compile_circle_node(comp: &VisualComponent, highlight: &HashSet<&str>, scene: &mut Scene) {
    let Some(center) = position(comp) else {
        tracing::debug!(id = %comp.id, "component without coordinates skipped");
        return;
    };

    let radius = positive_or(comp.properties.width, DEFAULT_NODE_RADIUS);
    let lit = highlight.contains(comp.id.as_str());
    let fill = if lit {
        HIGHLIGHT_FILL
    } else {
        declared_color(comp).unwrap_or(NODE_FILL)
    };

    scene.ops.push(DrawOp::Fill {
        path: circle_path(center, radius),
        color: fill,
    });
    scene.ops.push(DrawOp::Stroke {
        path: circle_path(center, radius),
        color: OUTLINE_COLOR,
        width: if lit { EDGE_WIDTH_HIGHLIGHT } else { EDGE_WIDTH },
    });

    if let Some(text) = label_text(comp) {
        scene.ops.push(DrawOp::Label {
            lines: vec![text.to_string()],
            origin: center,
            size_px: NODE_LABEL_SIZE,
            color: LABEL_COLOR,
        });
    }
}

fn compile_box_node(comp: &VisualComponent, highlight: &HashSet<&str>, scene: &mut Scene) {
    let Some(center) = position(comp) else {
        tracing::debug!(id = %comp.id, "component without coordinates skipped");
        return;
    };

    let w = positive_or(comp.properties.width, DEFAULT_BOX_WIDTH);
    let h = positive_or(comp.properties.height, DEFAULT_BOX_HEIGHT);
    let rect = kurbo::Rect::new(
        center.x - w / 2.0,
        center.y - h / 2.0,
        center.x + w / 2.0,
        center.y + h / 2.0,
    );

    let lit = highlight.contains(comp.id.as_str());
    let fill = if lit {
        HIGHLIGHT_FILL
    } else {
        declared_color(comp).unwrap_or(BOX_FILL)
    };

    scene.ops.push(DrawOp::Fill {
        path: rect.to_path(PATH_TOLERANCE),
        color: fill,
    });
    scene.ops.push(DrawOp::Stroke {
        path: rect.to_path(PATH_TOLERANCE),
        color: OUTLINE_COLOR,
        width: if lit { EDGE_WIDTH_HIGHLIGHT } else { EDGE_WIDTH },
    });

    if let Some(text) = label_text(comp) {
        scene.ops.push(DrawOp::Label {
            lines: wrap_label(text, w - BOX_LABEL_PAD, BOX_LABEL_SIZE),
            origin: center,
            size_px: BOX_LABEL_SIZE,
            color: LABEL_COLOR,
        });
    }
}

/// Greedy word wrap against an approximate fixed advance per character.
/// Glyph-accurate shaping happens only at raster time; keeping the wrap
/// approximate makes it a pure function of the document.
pub fn wrap_label(text: &str, max_width_px: f64, size_px: f32) -> Vec<String> {
    let advance = 0.6 * f64::from(size_px);
    let max_chars = if advance > 0.0 && max_width_px > advance {
        (max_width_px / advance).floor() as usize
    } else {
        1
    };

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
        } else if line.chars().count() + 1 + word.chars().count() <= max_chars {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn zoom_affine(zoom: f64) -> Affine {
    let z = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
    Affine::scale(z)
}

fn position(comp: &VisualComponent) -> Option<Point> {
    let x = comp.properties.x.filter(|v| v.is_finite())?;
    let y = comp.properties.y.filter(|v| v.is_finite())?;
    Some(Point::new(x, y))
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn declared_color(comp: &VisualComponent) -> Option<Rgba8> {
    comp.properties.color.as_deref().and_then(Rgba8::from_hex)
}

fn label_text(comp: &VisualComponent) -> Option<&str> {
    comp.properties
        .label
        .as_deref()
        .or(comp.content.as_deref())
        .filter(|s| !s.trim().is_empty())
}

fn circle_path(center: Point, radius: f64) -> BezPath {
    kurbo::Circle::new(center, radius).to_path(PATH_TOLERANCE)
}

fn line_path(from: Point, to: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(from);
    path.line_to(to);
    path
}

/// Two strokes back from the line tip, `ARROW_LEN` long, splayed
/// `ARROW_HALF_ANGLE_RAD` either side of the reversed line direction.
fn arrow_head(from: Point, to: Point) -> BezPath {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let barb = |side: f64| {
        Point::new(
            to.x - ARROW_LEN * (angle - side * ARROW_HALF_ANGLE_RAD).cos(),
            to.y - ARROW_LEN * (angle - side * ARROW_HALF_ANGLE_RAD).sin(),
        )
    };

    let mut path = BezPath::new();
    path.move_to(barb(1.0));
    path.line_to(to);
    path.line_to(barb(-1.0));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentKind, VisualizationType};

    fn comp(id: &str, x: Option<f64>, y: Option<f64>) -> VisualComponent {
        VisualComponent {
            id: id.to_string(),
            kind: ComponentKind::Node,
            properties: crate::model::ComponentProps {
                x,
                y,
                ..Default::default()
            },
            content: Some(id.to_string()),
            connections: Vec::new(),
        }
    }

    fn doc(kind: VisualizationType, components: Vec<VisualComponent>) -> VisualizationData {
        VisualizationData {
            topic: String::new(),
            title: String::new(),
            description: String::new(),
            visualization_type: kind,
            components,
            steps: Vec::new(),
            metadata: Default::default(),
        }
    }

    fn count_strokes(scene: &Scene) -> usize {
        scene
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Stroke { .. }))
            .count()
    }

    #[test]
    fn missing_coordinates_are_skipped() {
        let d = doc(
            VisualizationType::Graph,
            vec![comp("a", Some(10.0), Some(10.0)), comp("b", None, Some(5.0))],
        );
        let scene = compile_scene(&d, 0, 1.0);
        // One drawable node: fill + outline + label.
        let fills = scene
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
            .count();
        assert_eq!(fills, 1);
    }

    #[test]
    fn dangling_connection_draws_no_edge() {
        let mut a = comp("a", Some(0.0), Some(0.0));
        a.connections = vec!["ghost".to_string()];
        let d = doc(VisualizationType::Graph, vec![a]);
        let scene = compile_scene(&d, 0, 1.0);
        // Only the node outline stroke, no edge line.
        assert_eq!(count_strokes(&scene), 1);
    }

    #[test]
    fn box_arrow_adds_arrowheads() {
        let mut a = comp("a", Some(0.0), Some(0.0));
        a.connections = vec!["b".to_string()];
        let b = comp("b", Some(200.0), Some(0.0));
        let d = doc(VisualizationType::Flowchart, vec![a, b]);
        let scene = compile_scene(&d, 0, 1.0);
        // Edge line + arrowhead + two box outlines.
        assert_eq!(count_strokes(&scene), 4);
    }

    #[test]
    fn highlight_widens_edge_stroke() {
        let mut a = comp("a", Some(0.0), Some(0.0));
        a.connections = vec!["b".to_string()];
        let b = comp("b", Some(100.0), Some(100.0));
        let mut d = doc(VisualizationType::Graph, vec![a, b]);
        d.steps = vec![crate::model::AnimationStep {
            step_number: 0,
            description: String::new(),
            duration: 1.0,
            changes: Vec::new(),
            highlight: vec!["b".to_string()],
        }];
        let scene = compile_scene(&d, 0, 1.0);
        let widths: Vec<f64> = scene
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        // Edge stroke comes first and carries the highlight width.
        assert_eq!(widths[0], EDGE_WIDTH_HIGHLIGHT);
    }

    #[test]
    fn zoom_is_a_uniform_scale() {
        let d = doc(VisualizationType::Graph, vec![comp("a", Some(1.0), Some(1.0))]);
        let scene = compile_scene(&d, 0, 2.0);
        assert_eq!(scene.transform, Affine::scale(2.0));
        // Degenerate zoom falls back to identity rather than a 0-scale.
        let scene = compile_scene(&d, 0, 0.0);
        assert_eq!(scene.transform, Affine::scale(1.0));
    }

    #[test]
    fn wrap_is_greedy_at_word_boundaries() {
        // 13 px size -> 7.8 px advance; 100 px -> 12 chars per line.
        let lines = wrap_label("compare value with current node", 100.0, 13.0);
        assert_eq!(lines, vec!["compare", "value with", "current node"]);
    }

    #[test]
    fn wrap_keeps_overlong_word_whole() {
        let lines = wrap_label("incomprehensibilities yes", 40.0, 13.0);
        assert_eq!(lines[0], "incomprehensibilities");
        assert_eq!(lines[1], "yes");
    }
}
