mod generation;
mod placement;
mod routing;
pub mod text;
pub(crate) mod types;
pub use generation::resolve_generations;
pub use placement::place_nodes;
pub use routing::route_edges;
pub use types::*;

use crate::config::LayoutConfig;
use crate::model::FamilyTree;

/// Runs a full layout pass over one snapshot: generations, placement, then
/// connector routing. The result is a pure function of its inputs.
pub fn compute_layout(tree: &FamilyTree, config: &LayoutConfig, viewport_width: f32) -> Layout {
    let config = config.sanitized();
    let generations = resolve_generations(tree);
    let nodes = place_nodes(tree, &generations, viewport_width, &config);
    let edges = route_edges(tree, &nodes, &config);
    let bounds = scene_bounds(&nodes, &config, viewport_width);
    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        viewport_width,
        "layout pass complete"
    );
    Layout {
        nodes,
        edges,
        generations,
        viewport_width: config.effective_viewport_width(viewport_width),
        bounds,
    }
}

/// Area the drawing occupies: the viewport strip from the origin, grown to
/// hold every card (rows wider than the viewport reach into negative x).
fn scene_bounds(nodes: &[NodePosition], config: &LayoutConfig, viewport_width: f32) -> Bounds {
    let half_w = config.node_width / 2.0;
    let half_h = config.node_height / 2.0;
    let mut bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: config.effective_viewport_width(viewport_width),
        max_y: config.node_height,
    };
    for node in nodes {
        bounds.min_x = bounds.min_x.min(node.x - half_w);
        bounds.max_x = bounds.max_x.max(node.x + half_w);
        bounds.min_y = bounds.min_y.min(node.y - half_h);
        bounds.max_y = bounds.max_y.max(node.y + half_h);
    }
    if !nodes.is_empty() {
        // Mirror the top margin below the last row.
        bounds.max_y += (config.base_y - half_h).max(0.0);
    }
    bounds
}
