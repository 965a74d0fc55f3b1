use crate::model::{FamilyTree, Gender, Person};
use anyhow::{Result, bail};
use serde::Deserialize;

/// Ids show up both as strings and as bare numbers in exported trees.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl IdValue {
    fn into_id(self) -> String {
        match self {
            IdValue::Integer(val) => val.to_string(),
            IdValue::Float(val) if val.fract() == 0.0 && val.is_finite() => {
                format!("{}", val as i64)
            }
            IdValue::Float(val) => val.to_string(),
            IdValue::Text(val) => val.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonRecord {
    id: IdValue,
    name: String,
    birth_date: Option<String>,
    death_date: Option<String>,
    gender: Option<Gender>,
    #[serde(default)]
    parents: Option<Vec<IdValue>>,
    #[serde(default)]
    spouses: Option<Vec<IdValue>>,
    spouse: Option<IdValue>,
    #[serde(default)]
    children: Option<Vec<IdValue>>,
    notes: Option<String>,
    photo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyTreeFile {
    #[serde(alias = "persons")]
    members: Vec<PersonRecord>,
    root_member_id: Option<IdValue>,
}

fn ids(values: Option<Vec<IdValue>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(IdValue::into_id)
        .filter(|id| !id.is_empty())
        .collect()
}

impl PersonRecord {
    fn into_person(self) -> Person {
        let mut spouses = ids(self.spouses);
        if let Some(legacy) = self.spouse.map(IdValue::into_id) {
            if !legacy.is_empty() && !spouses.contains(&legacy) {
                spouses.push(legacy);
            }
        }
        Person {
            id: self.id.into_id(),
            name: self.name,
            birth_date: self.birth_date,
            death_date: self.death_date,
            gender: self.gender.unwrap_or_default(),
            parents: ids(self.parents),
            spouses,
            children: ids(self.children),
            notes: self.notes,
            photo: self.photo,
        }
    }
}

/// Parses a family tree document. Plain JSON is tried first, JSON5 second so
/// hand-written files may carry comments and trailing commas.
pub fn parse_family_tree(input: &str) -> Result<FamilyTree> {
    let file: FamilyTreeFile = match serde_json::from_str(input) {
        Ok(file) => file,
        Err(json_err) => match json5::from_str(input) {
            Ok(file) => file,
            Err(json5_err) => {
                bail!("invalid family tree document: {json_err} (as JSON5: {json5_err})")
            }
        },
    };

    let mut tree = FamilyTree::new();
    for record in file.members {
        let person = record.into_person();
        if person.id.is_empty() {
            bail!("member `{}` has an empty id", person.name);
        }
        if tree.contains(&person.id) {
            bail!("duplicate member id `{}`", person.id);
        }
        tree.members.insert(person.id.clone(), person);
    }
    tree.root_member_id = file.root_member_id.map(IdValue::into_id);
    tracing::debug!(members = tree.len(), "parsed family tree");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_members() {
        let input = r#"{
            "rootMemberId": "1",
            "members": [
                {"id": "1", "name": "John Smith", "birthDate": "1920-05-15", "gender": "male", "spouses": ["2"]},
                {"id": "2", "name": "Mary Smith", "gender": "female", "spouses": ["1"]},
                {"id": "3", "name": "Robert Smith", "parents": ["1", "2"]}
            ]
        }"#;
        let tree = parse_family_tree(input).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root_member_id.as_deref(), Some("1"));
        let john = tree.get("1").unwrap();
        assert_eq!(john.gender, Gender::Male);
        assert_eq!(john.birth_date.as_deref(), Some("1920-05-15"));
        assert_eq!(tree.get("3").unwrap().parents, vec!["1", "2"]);
        assert_eq!(tree.get("3").unwrap().gender, Gender::Other);
    }

    #[test]
    fn accepts_numeric_ids_and_legacy_spouse() {
        let input = r#"{
            "persons": [
                {"id": 1, "name": "Ivan", "spouse": 2, "generation": 0, "years": "1920-1990"},
                {"id": 2, "name": "Anna", "spouse": 1},
                {"id": 3, "name": "Petr", "parents": [1, 2]}
            ]
        }"#;
        let tree = parse_family_tree(input).unwrap();
        assert_eq!(tree.get("1").unwrap().spouses, vec!["2"]);
        assert_eq!(tree.get("3").unwrap().parents, vec!["1", "2"]);
    }

    #[test]
    fn accepts_json5() {
        let input = r#"{
            // comment
            members: [
                {id: 'a', name: 'Alpha',},
            ],
        }"#;
        let tree = parse_family_tree(input).unwrap();
        assert!(tree.contains("a"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let input = r#"{"members": [{"id": "1", "name": "A"}, {"id": 1, "name": "B"}]}"#;
        let err = parse_family_tree(input).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_family_tree("not a tree").is_err());
    }
}
