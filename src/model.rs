use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub spouses: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Person {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            birth_date: None,
            death_date: None,
            gender: Gender::Other,
            parents: Vec::new(),
            spouses: Vec::new(),
            children: Vec::new(),
            notes: None,
            photo: None,
        }
    }

    pub fn with_parents(mut self, parents: &[&str]) -> Self {
        self.parents = parents.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn with_spouses(mut self, spouses: &[&str]) -> Self {
        self.spouses = spouses.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn with_children(mut self, children: &[&str]) -> Self {
        self.children = children.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn with_dates(mut self, birth: Option<&str>, death: Option<&str>) -> Self {
        self.birth_date = birth.map(str::to_string);
        self.death_date = death.map(str::to_string);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Every id this record points at, tagged with the relation it came from.
    pub fn references(&self) -> impl Iterator<Item = (Relation, &str)> {
        self.parents
            .iter()
            .map(|id| (Relation::Parent, id.as_str()))
            .chain(self.spouses.iter().map(|id| (Relation::Spouse, id.as_str())))
            .chain(self.children.iter().map(|id| (Relation::Child, id.as_str())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Parent,
    Spouse,
    Child,
}

/// A snapshot of the whole tree. Member order is the store order that the
/// layout walks; it is preserved across removals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyTree {
    pub members: IndexMap<String, Person>,
    pub root_member_id: Option<String>,
}

impl FamilyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: impl IntoIterator<Item = Person>) -> Self {
        let mut tree = Self::new();
        for person in members {
            tree.members.insert(person.id.clone(), person);
        }
        tree
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.members.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.members.values()
    }
}
