use thiserror::Error;

use crate::model::{FamilyTree, Person};

pub const MAX_PARENTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("person id must not be empty")]
    EmptyId,
    #[error("person `{0}` has an empty name")]
    EmptyName(String),
    #[error("person `{0}` already exists")]
    DuplicateId(String),
    #[error("person `{0}` does not exist")]
    UnknownId(String),
    #[error("person `{id}` lists {count} parents, at most 2 are allowed")]
    TooManyParents { id: String, count: usize },
    #[error("person `{0}` references itself")]
    SelfReference(String),
}

/// Owns the mutable tree and keeps its links consistent. Layout never reads
/// the store directly; it works on [`PersonStore::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct PersonStore {
    tree: FamilyTree,
}

impl PersonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts an already-built tree (for example one parsed from a file) and
    /// reconciles its links.
    pub fn from_tree(tree: FamilyTree) -> Self {
        let mut store = Self { tree };
        store.normalize();
        store
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.tree.get(id)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    pub fn snapshot(&self) -> FamilyTree {
        self.tree.clone()
    }

    pub fn set_root(&mut self, id: Option<&str>) -> Result<(), StoreError> {
        if let Some(id) = id {
            if !self.tree.contains(id) {
                return Err(StoreError::UnknownId(id.to_string()));
            }
        }
        self.tree.root_member_id = id.map(str::to_string);
        Ok(())
    }

    pub fn insert(&mut self, person: Person) -> Result<(), StoreError> {
        validate(&person)?;
        if self.tree.contains(&person.id) {
            return Err(StoreError::DuplicateId(person.id));
        }
        let id = person.id.clone();
        self.tree.members.insert(id.clone(), person);
        self.link_back_references(&id);
        self.adopt_links_to(&id);
        Ok(())
    }

    /// Replaces the record with the same id. Links the old record had and the
    /// new one dropped are removed from the other side as well.
    pub fn update(&mut self, person: Person) -> Result<(), StoreError> {
        validate(&person)?;
        let Some(old) = self.tree.members.get(&person.id).cloned() else {
            return Err(StoreError::UnknownId(person.id));
        };
        let id = person.id.clone();
        for parent in old.parents.iter().filter(|p| !person.parents.contains(p)) {
            if let Some(other) = self.tree.members.get_mut(parent) {
                other.children.retain(|c| c != &id);
            }
        }
        for spouse in old.spouses.iter().filter(|s| !person.spouses.contains(s)) {
            if let Some(other) = self.tree.members.get_mut(spouse) {
                other.spouses.retain(|s| s != &id);
            }
        }
        for child in old.children.iter().filter(|c| !person.children.contains(c)) {
            if let Some(other) = self.tree.members.get_mut(child) {
                other.parents.retain(|p| p != &id);
            }
        }
        self.tree.members.insert(id.clone(), person);
        self.link_back_references(&id);
        Ok(())
    }

    /// Removes a person and scrubs every reference to them in one pass over
    /// the remaining members.
    pub fn remove(&mut self, id: &str) -> Option<Person> {
        let removed = self.tree.members.shift_remove(id)?;
        for other in self.tree.members.values_mut() {
            other.parents.retain(|p| p != id);
            other.spouses.retain(|s| s != id);
            other.children.retain(|c| c != id);
        }
        if self.tree.root_member_id.as_deref() == Some(id) {
            self.tree.root_member_id = None;
        }
        tracing::debug!(id, remaining = self.tree.len(), "removed person");
        Some(removed)
    }

    /// Makes spouse links symmetric and reconciles `children` with `parents`.
    /// Returns the number of links that were added or dropped.
    pub fn normalize(&mut self) -> usize {
        let ids: Vec<String> = self.tree.members.keys().cloned().collect();
        let mut repaired = 0;
        for id in &ids {
            repaired += self.link_back_references(id);
        }
        // A parent may list a child whose `parents` is already full.
        for id in &ids {
            let Some(person) = self.tree.get(id) else {
                continue;
            };
            let stale: Vec<String> = person
                .children
                .iter()
                .filter(|child| {
                    self.tree
                        .get(child)
                        .is_some_and(|c| !c.parents.iter().any(|p| p == id))
                })
                .cloned()
                .collect();
            if stale.is_empty() {
                continue;
            }
            for child in &stale {
                tracing::debug!(parent = %id, child = %child, "dropping child link, child already has two parents");
            }
            repaired += stale.len();
            if let Some(person) = self.tree.members.get_mut(id) {
                person.children.retain(|c| !stale.contains(c));
            }
        }
        repaired
    }

    /// Mirrors links that existing members already hold to a newly inserted
    /// id onto the new record. A parent claim on a child whose `parents` is
    /// full is dropped from the claiming parent.
    fn adopt_links_to(&mut self, id: &str) -> usize {
        let mut spouses = Vec::new();
        let mut parents = Vec::new();
        let mut children = Vec::new();
        for other in self.tree.iter().filter(|other| other.id != id) {
            if other.spouses.iter().any(|s| s == id) {
                spouses.push(other.id.clone());
            }
            if other.children.iter().any(|c| c == id) {
                parents.push(other.id.clone());
            }
            if other.parents.iter().any(|p| p == id) {
                children.push(other.id.clone());
            }
        }

        let Some(person) = self.tree.members.get_mut(id) else {
            return 0;
        };
        let mut added = 0;
        for spouse in spouses {
            if !person.spouses.contains(&spouse) {
                person.spouses.push(spouse);
                added += 1;
            }
        }
        for child in children {
            if !person.children.contains(&child) {
                person.children.push(child);
                added += 1;
            }
        }
        let mut stale = Vec::new();
        for parent in parents {
            if person.parents.contains(&parent) {
                continue;
            }
            if person.parents.len() < MAX_PARENTS {
                person.parents.push(parent);
                added += 1;
            } else {
                stale.push(parent);
            }
        }
        for parent in stale {
            tracing::debug!(parent = %parent, child = id, "dropping child link, child already has two parents");
            if let Some(other) = self.tree.members.get_mut(&parent) {
                other.children.retain(|c| c != id);
            }
        }
        added
    }

    fn link_back_references(&mut self, id: &str) -> usize {
        let Some(person) = self.tree.get(id).cloned() else {
            return 0;
        };
        let mut added = 0;
        for parent in &person.parents {
            match self.tree.members.get_mut(parent) {
                Some(other) if !other.children.iter().any(|c| c == id) => {
                    other.children.push(id.to_string());
                    added += 1;
                }
                Some(_) => {}
                None => tracing::debug!(id, parent = %parent, "parent reference does not resolve"),
            }
        }
        for spouse in &person.spouses {
            match self.tree.members.get_mut(spouse) {
                Some(other) if !other.spouses.iter().any(|s| s == id) => {
                    other.spouses.push(id.to_string());
                    added += 1;
                }
                Some(_) => {}
                None => tracing::debug!(id, spouse = %spouse, "spouse reference does not resolve"),
            }
        }
        for child in &person.children {
            match self.tree.members.get_mut(child) {
                Some(other)
                    if !other.parents.iter().any(|p| p == id)
                        && other.parents.len() < MAX_PARENTS =>
                {
                    other.parents.push(id.to_string());
                    added += 1;
                }
                Some(_) => {}
                None => tracing::debug!(id, child = %child, "child reference does not resolve"),
            }
        }
        added
    }
}

fn validate(person: &Person) -> Result<(), StoreError> {
    if person.id.trim().is_empty() {
        return Err(StoreError::EmptyId);
    }
    if person.name.trim().is_empty() {
        return Err(StoreError::EmptyName(person.id.clone()));
    }
    if person.parents.len() > MAX_PARENTS {
        return Err(StoreError::TooManyParents {
            id: person.id.clone(),
            count: person.parents.len(),
        });
    }
    if person.references().any(|(_, other)| other == person.id) {
        return Err(StoreError::SelfReference(person.id.clone()));
    }
    Ok(())
}
