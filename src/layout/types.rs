use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: String,
    /// Center of the node card in scene coordinates.
    pub x: f32,
    pub y: f32,
    pub generation: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    ParentChild,
    Spouse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLayout {
    pub kind: EdgeKind,
    /// Parents for a parent-child edge, the first partner for a spouse tie.
    pub sources: Vec<String>,
    pub target: String,
    pub points: Vec<(f32, f32)>,
}

impl EdgeLayout {
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.target.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    MissingReference {
        from: String,
        to: String,
        relation: crate::model::Relation,
    },
    CyclicAncestry {
        id: String,
        ancestor: String,
    },
    Unconverged {
        rounds: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationAssignment {
    pub generations: BTreeMap<String, usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationAssignment {
    pub fn get(&self, id: &str) -> Option<usize> {
        self.generations.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<EdgeLayout>,
    pub generations: GenerationAssignment,
    /// Width the rows were centered on, after the degenerate-width fallback.
    pub viewport_width: f32,
    pub bounds: Bounds,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodePosition> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
