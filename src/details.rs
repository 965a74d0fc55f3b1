use serde::Serialize;

use crate::layout::text::{format_date, initials, lifespan};
use crate::model::{Gender, Person};

/// Strings shown in the member detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetails {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub gender: String,
    pub lifespan: String,
    pub birth_date: String,
    /// Only present when a death date was recorded.
    pub death_date: Option<String>,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

pub fn person_details(person: &Person) -> PersonDetails {
    PersonDetails {
        id: person.id.clone(),
        name: person.name.clone(),
        initials: initials(&person.name),
        gender: gender_label(person.gender).to_string(),
        lifespan: lifespan(person),
        birth_date: format_date(person.birth_date.as_deref()),
        death_date: non_blank(person.death_date.as_deref()).map(|d| format_date(Some(d))),
        notes: non_blank(person.notes.as_deref()).map(str::to_string),
        photo: non_blank(person.photo.as_deref()).map(str::to_string),
    }
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
        Gender::Other => "Other",
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
