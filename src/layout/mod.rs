mod overlap;
mod tidy;
pub(crate) mod types;
pub use types::*;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::{NodeKind, Tree};

/// Computes a position for every node: `y` is a fixed per-depth row, `x`
/// comes from the separation-aware tidy pass scaled onto the plane, after
/// which the overlap sweep guarantees the per-level minimum spacing.
pub fn compute_layout(tree: &Tree, config: &LayoutConfig) -> Layout {
    let mut xs = tidy::layout_units(tree, config);

    let mut per_level = vec![0usize; tree.max_depth() + 1];
    for (_, node) in tree.iter() {
        per_level[node.depth] += 1;
    }
    let max_siblings = per_level.iter().copied().max().unwrap_or(1);

    // Wide levels get proportionally more room than the viewport alone
    // would give them.
    let plane_width = (config.viewport_width * config.width_fill_ratio)
        .max(max_siblings as f32 * config.node_width * config.sibling_width_factor);
    let plane_height = (tree.max_depth() as f32 + 1.0) * config.level_height;

    scale_to_plane(&mut xs, plane_width);
    overlap::resolve_overlaps(tree, &mut xs, config.min_distance);

    let mut nodes = BTreeMap::new();
    for (id, node) in tree.iter() {
        let (width, height) = node_size(node.kind, config);
        nodes.insert(
            node.id.clone(),
            NodeLayout {
                id: node.id.clone(),
                x: xs[id],
                y: node.depth as f32 * config.level_height,
                width,
                height,
            },
        );
    }

    let mut edges = Vec::new();
    for (id, node) in tree.iter() {
        let from = (xs[id], node.depth as f32 * config.level_height);
        for &child in &node.children {
            let child_node = tree.node(child);
            let to = (xs[child], child_node.depth as f32 * config.level_height);
            edges.push(EdgeLayout {
                from: node.id.clone(),
                to: child_node.id.clone(),
                points: vec![from, to],
            });
        }
    }

    // Overlap shifts only ever push right, so the plane may have grown.
    let max_x = xs.iter().copied().fold(0.0f32, f32::max);
    let width = plane_width.max(max_x + config.node_width / 2.0);

    Layout {
        nodes,
        edges,
        width,
        height: plane_height,
    }
}

fn node_size(kind: NodeKind, config: &LayoutConfig) -> (f32, f32) {
    if kind.is_framing() {
        (config.framing_rx * 2.0, config.framing_ry * 2.0)
    } else {
        (config.thought_width, config.thought_height)
    }
}

fn scale_to_plane(xs: &mut [f32], plane_width: f32) {
    let min = xs.iter().copied().fold(f32::MAX, f32::min);
    let max = xs.iter().copied().fold(f32::MIN, f32::max);
    let span = max - min;
    if span <= f32::EPSILON {
        for x in xs.iter_mut() {
            *x = plane_width / 2.0;
        }
    } else {
        for x in xs.iter_mut() {
            *x = (*x - min) / span * plane_width;
        }
    }
}
