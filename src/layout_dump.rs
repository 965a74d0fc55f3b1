use crate::layout::{Bounds, Diagnostic, EdgeKind, Layout};
use crate::model::FamilyTree;
use crate::viewport::ViewTransform;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub viewport_width: f32,
    pub bounds: Bounds,
    pub transform: ViewTransform,
    pub root_member_id: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub generation: usize,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub kind: EdgeKind,
    pub sources: Vec<String>,
    pub target: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, tree: &FamilyTree, transform: ViewTransform) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                name: tree
                    .get(&node.id)
                    .map(|person| person.name.clone())
                    .unwrap_or_default(),
                generation: node.generation,
                x: node.x,
                y: node.y,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                kind: edge.kind,
                sources: edge.sources.clone(),
                target: edge.target.clone(),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            viewport_width: layout.viewport_width,
            bounds: layout.bounds,
            transform,
            root_member_id: tree.root_member_id.clone(),
            nodes,
            edges,
            diagnostics: layout.generations.diagnostics.clone(),
        }
    }
}

pub fn layout_dump_json(
    layout: &Layout,
    tree: &FamilyTree,
    transform: ViewTransform,
) -> anyhow::Result<String> {
    let dump = LayoutDump::from_layout(layout, tree, transform);
    Ok(serde_json::to_string_pretty(&dump)?)
}
