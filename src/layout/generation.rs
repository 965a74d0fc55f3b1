use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::FamilyTree;

use super::{Diagnostic, GenerationAssignment};

#[derive(Debug, Clone, Copy)]
enum Visit {
    InProgress,
    Done(usize),
}

struct Resolver<'a> {
    tree: &'a FamilyTree,
    state: HashMap<&'a str, Visit>,
    /// `(child, parent)` links that closed an ancestry cycle.
    broken: HashSet<(&'a str, &'a str)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    fn new(tree: &'a FamilyTree) -> Self {
        Self {
            tree,
            state: HashMap::with_capacity(tree.len()),
            broken: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    fn base_generation(&mut self, id: &'a str) -> usize {
        if let Some(Visit::Done(generation)) = self.state.get(id) {
            return *generation;
        }
        let tree = self.tree;
        let Some(person) = tree.get(id) else {
            return 0;
        };
        self.state.insert(id, Visit::InProgress);

        let mut deepest: Option<usize> = None;
        for parent in &person.parents {
            let parent = parent.as_str();
            if !tree.contains(parent) {
                continue;
            }
            let generation = match self.state.get(parent).copied() {
                Some(Visit::Done(generation)) => generation,
                Some(Visit::InProgress) => {
                    tracing::warn!(id, ancestor = parent, "ancestry cycle, using generation 0");
                    self.broken.insert((id, parent));
                    self.diagnostics.push(Diagnostic::CyclicAncestry {
                        id: id.to_string(),
                        ancestor: parent.to_string(),
                    });
                    0
                }
                None => self.base_generation(parent),
            };
            deepest = Some(deepest.map_or(generation, |d| d.max(generation)));
        }

        let generation = deepest.map_or(0, |d| d + 1);
        self.state.insert(id, Visit::Done(generation));
        generation
    }

    fn report_missing(&mut self) {
        for person in self.tree.iter() {
            for (relation, other) in person.references() {
                if self.tree.contains(other) {
                    continue;
                }
                tracing::debug!(
                    id = %person.id,
                    missing = other,
                    ?relation,
                    "reference does not resolve, treating as absent"
                );
                self.diagnostics.push(Diagnostic::MissingReference {
                    from: person.id.clone(),
                    to: other.to_string(),
                    relation,
                });
            }
        }
    }

    /// Ties spouses to one row and pushes children below their parents again,
    /// alternating until nothing moves.
    fn align(&mut self, generations: &mut HashMap<&'a str, usize>) {
        let tree = self.tree;
        let limit = tree.len() + 1;
        let mut rounds = 0;
        loop {
            let mut changed = false;
            for person in tree.iter() {
                let id = person.id.as_str();
                let required = person
                    .parents
                    .iter()
                    .map(String::as_str)
                    .filter(|parent| !self.broken.contains(&(id, *parent)))
                    .filter_map(|parent| generations.get(parent).map(|g| g + 1))
                    .max();
                if let Some(required) = required {
                    let current = generations.entry(id).or_insert(0);
                    if *current < required {
                        *current = required;
                        changed = true;
                    }
                }

                for spouse in &person.spouses {
                    let spouse = spouse.as_str();
                    if spouse == id {
                        continue;
                    }
                    let (Some(&own), Some(&theirs)) = (generations.get(id), generations.get(spouse))
                    else {
                        continue;
                    };
                    if own != theirs {
                        let row = own.max(theirs);
                        generations.insert(id, row);
                        generations.insert(spouse, row);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
            rounds += 1;
            if rounds >= limit {
                tracing::warn!(rounds, "spouse alignment did not settle, keeping last assignment");
                self.diagnostics.push(Diagnostic::Unconverged { rounds });
                break;
            }
        }
    }
}

/// Assigns every member a generation row.
///
/// Members without resolvable parents sit in row 0 of their lineage; everyone
/// else sits one row below their deepest parent. Linked spouses always share
/// a row, which can push a spouse (and their descendants) further down.
pub fn resolve_generations(tree: &FamilyTree) -> GenerationAssignment {
    let mut resolver = Resolver::new(tree);
    resolver.report_missing();

    let mut generations: HashMap<&str, usize> = HashMap::with_capacity(tree.len());
    for person in tree.iter() {
        let generation = resolver.base_generation(person.id.as_str());
        generations.insert(person.id.as_str(), generation);
    }
    resolver.align(&mut generations);

    let generations: BTreeMap<String, usize> = generations
        .into_iter()
        .map(|(id, generation)| (id.to_string(), generation))
        .collect();
    tracing::debug!(
        members = generations.len(),
        rows = generations.values().collect::<HashSet<_>>().len(),
        diagnostics = resolver.diagnostics.len(),
        "resolved generations"
    );
    GenerationAssignment {
        generations,
        diagnostics: resolver.diagnostics,
    }
}
