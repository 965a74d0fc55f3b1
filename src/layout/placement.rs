use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::model::FamilyTree;

use super::{GenerationAssignment, NodePosition};

/// Orders one generation row. Members keep store order except that a
/// member's spouses in the same row are pulled in right after them. A spouse
/// link counts from either side, so a one-sided link still keeps the pair
/// together.
pub(super) fn arrange_row<'a>(tree: &'a FamilyTree, row: &[&'a str]) -> Vec<&'a str> {
    let in_row: HashSet<&str> = row.iter().copied().collect();
    let mut partners: HashMap<&str, Vec<&str>> = HashMap::with_capacity(row.len());
    for &id in row {
        let Some(person) = tree.get(id) else {
            continue;
        };
        for spouse in &person.spouses {
            let spouse = spouse.as_str();
            if spouse == id || !in_row.contains(spouse) {
                continue;
            }
            partners.entry(id).or_default().push(spouse);
            partners.entry(spouse).or_default().push(id);
        }
    }

    let mut placed: HashSet<&str> = HashSet::with_capacity(row.len());
    let mut arranged = Vec::with_capacity(row.len());
    for &id in row {
        if !placed.insert(id) {
            continue;
        }
        arranged.push(id);
        for &spouse in partners.get(id).into_iter().flatten() {
            if placed.insert(spouse) {
                arranged.push(spouse);
            }
        }
    }
    arranged
}

/// Groups member ids by generation, each group in store order.
pub(super) fn generation_rows<'a>(
    tree: &'a FamilyTree,
    generations: &GenerationAssignment,
) -> BTreeMap<usize, Vec<&'a str>> {
    let mut rows: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for person in tree.iter() {
        if let Some(generation) = generations.get(&person.id) {
            rows.entry(generation).or_default().push(person.id.as_str());
        }
    }
    rows
}

/// Positions every member that has a generation. Rows are centered on
/// `viewport_width` and stacked by the rank of their generation, so gaps in
/// generation numbers do not leave empty rows.
pub fn place_nodes(
    tree: &FamilyTree,
    generations: &GenerationAssignment,
    viewport_width: f32,
    config: &LayoutConfig,
) -> Vec<NodePosition> {
    let config = config.sanitized();
    let width = config.effective_viewport_width(viewport_width);
    let mut positions = Vec::with_capacity(generations.len());

    for (row_index, (generation, row)) in generation_rows(tree, generations).iter().enumerate() {
        let arranged = arrange_row(tree, row);
        let count = arranged.len();
        let start_x = (width - count.saturating_sub(1) as f32 * config.horizontal_spacing) / 2.0;
        let y = config.base_y + row_index as f32 * config.vertical_spacing;
        for (slot, id) in arranged.into_iter().enumerate() {
            positions.push(NodePosition {
                id: id.to_string(),
                x: start_x + slot as f32 * config.horizontal_spacing,
                y,
                generation: *generation,
            });
        }
    }
    positions
}
