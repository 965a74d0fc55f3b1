use std::collections::{HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::model::FamilyTree;

use super::{EdgeKind, EdgeLayout, NodePosition};

/// Builds the connector polylines for a finished placement.
///
/// Parent-child edges are three-segment elbows: a drop from the parents'
/// row (at the midpoint between two parents, or under a single parent), a
/// horizontal run halfway between the rows, and a drop onto the top of the
/// child card. Spouse ties are one horizontal segment between the two card
/// centers, emitted once per pair and only within a row.
pub fn route_edges(
    tree: &FamilyTree,
    positions: &[NodePosition],
    config: &LayoutConfig,
) -> Vec<EdgeLayout> {
    let by_id: HashMap<&str, &NodePosition> =
        positions.iter().map(|pos| (pos.id.as_str(), pos)).collect();
    let half_height = config.node_height.max(1.0) / 2.0;
    let mut edges = Vec::new();

    for child in tree.iter() {
        let Some(child_pos) = by_id.get(child.id.as_str()) else {
            continue;
        };
        let mut parents: Vec<&NodePosition> = Vec::with_capacity(2);
        for parent in &child.parents {
            if parent == &child.id || parents.iter().any(|p| &p.id == parent) {
                continue;
            }
            if let Some(pos) = by_id.get(parent.as_str()) {
                parents.push(*pos);
            }
        }
        if parents.is_empty() {
            continue;
        }

        let source_x = parents.iter().map(|p| p.x).sum::<f32>() / parents.len() as f32;
        let parent_y = parents.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let mid_y = (parent_y + child_pos.y) / 2.0;
        let end_y = child_pos.y - half_height;
        edges.push(EdgeLayout {
            kind: EdgeKind::ParentChild,
            sources: parents.iter().map(|p| p.id.clone()).collect(),
            target: child.id.clone(),
            points: vec![
                (source_x, parent_y),
                (source_x, mid_y),
                (child_pos.x, mid_y),
                (child_pos.x, end_y),
            ],
        });
    }

    let mut tied: HashSet<(&str, &str)> = HashSet::new();
    for person in tree.iter() {
        let id = person.id.as_str();
        let Some(own) = by_id.get(id) else {
            continue;
        };
        for spouse in &person.spouses {
            let spouse = spouse.as_str();
            if spouse == id {
                continue;
            }
            let Some(other) = by_id.get(spouse) else {
                continue;
            };
            if own.generation != other.generation {
                continue;
            }
            let key = if id < spouse { (id, spouse) } else { (spouse, id) };
            if !tied.insert(key) {
                continue;
            }
            edges.push(EdgeLayout {
                kind: EdgeKind::Spouse,
                sources: vec![id.to_string()],
                target: spouse.to_string(),
                points: vec![(own.x, own.y), (other.x, own.y)],
            });
        }
    }

    edges
}
