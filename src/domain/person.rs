use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// Free-form note or metadata mapping attached to persons, events and links.
///
/// Ordered so that serialized results are stable across runs.
pub type Notes = BTreeMap<String, serde_json::Value>;

/// Event kind recording a foreign naturalization of the person.
pub const NATURALIZATION_FOREIGN: &str = "naturalization_foreign";

/// Event kind recording loss of citizenship on marriage to a foreigner.
pub const AUTOMATIC_LOSS_BY_MARRIAGE: &str = "automatic_loss_by_marriage";

/// Unique person identifier within one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        PersonId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dated event affecting someone's citizenship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenshipEvent {
    /// Free-form tag, e.g. `naturalization_foreign`
    pub kind: String,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    pub country: Option<String>,

    /// Keys consulted: `co_resident_child`, `child_emancipated`, `jus_soli_country`
    #[serde(default)]
    pub metadata: Notes,
}

impl CitizenshipEvent {
    pub fn new(kind: impl Into<String>, date: Option<NaiveDate>) -> Self {
        CitizenshipEvent {
            kind: kind.into(),
            date,
            country: None,
            metadata: Notes::new(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A person appearing somewhere in the ancestry chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,

    pub name: String,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,

    #[serde(default)]
    pub birth_country: Option<String>,

    /// Citizenships held at birth besides the Italian one
    /// SmallVec optimizes for the common case of one or two
    #[serde(default)]
    pub other_citizenships_at_birth: SmallVec<[String; 2]>,

    #[serde(default)]
    pub events: Vec<CitizenshipEvent>,

    #[serde(default)]
    pub notes: Notes,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Person {
            id: PersonId::new(id),
            name: name.into(),
            birth_date: None,
            birth_country: None,
            other_citizenships_at_birth: SmallVec::new(),
            events: Vec::new(),
            notes: Notes::new(),
        }
    }

    pub fn born(mut self, date: NaiveDate, country: impl Into<String>) -> Self {
        self.birth_date = Some(date);
        self.birth_country = Some(country.into());
        self
    }

    pub fn with_other_citizenship(mut self, country: impl Into<String>) -> Self {
        self.other_citizenships_at_birth.push(country.into());
        self
    }

    pub fn with_event(mut self, event: CitizenshipEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_note(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.notes.insert(key.into(), value);
        self
    }

    /// First event of the given kind, if any.
    pub fn find_event(&self, kind: &str) -> Option<&CitizenshipEvent> {
        self.events.iter().find(|event| event.kind == kind)
    }

    /// Check whether the person was born in the given country.
    ///
    /// Comparison ignores case and surrounding whitespace.
    pub fn born_in(&self, country: &str) -> bool {
        self.birth_country
            .as_deref()
            .map(|c| c.trim().eq_ignore_ascii_case(country))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_born_in_normalization() {
        let date = NaiveDate::from_ymd_opt(1890, 5, 1).unwrap();
        assert!(Person::new("a1", "Giorgio").born(date, "  ITALY ").born_in("italy"));
        assert!(!Person::new("a2", "Maria").born(date, "Italia").born_in("italy"));
        assert!(!Person::new("a3", "Unknown").born_in("italy"));
    }

    #[test]
    fn test_find_event_returns_first() {
        let first = NaiveDate::from_ymd_opt(1910, 1, 1);
        let second = NaiveDate::from_ymd_opt(1920, 1, 1);
        let person = Person::new("a1", "Giorgio")
            .with_event(CitizenshipEvent::new(NATURALIZATION_FOREIGN, first))
            .with_event(CitizenshipEvent::new(NATURALIZATION_FOREIGN, second));

        let event = person.find_event(NATURALIZATION_FOREIGN).unwrap();
        assert_eq!(event.date, first);
        assert!(person.find_event(AUTOMATIC_LOSS_BY_MARRIAGE).is_none());
    }

    #[test]
    fn test_person_deserialization_defaults() {
        let person: Person = serde_json::from_value(json!({
            "id": "app",
            "name": "Applicant",
            "birth_date": "1990-07-01",
            "other_citizenships_at_birth": ["USA"],
            "events": [{"kind": "naturalization_foreign", "metadata": {"jus_soli_country": true}}]
        }))
        .unwrap();

        assert_eq!(person.id.as_str(), "app");
        assert_eq!(person.birth_date, NaiveDate::from_ymd_opt(1990, 7, 1));
        assert!(person.birth_country.is_none());
        assert_eq!(person.other_citizenships_at_birth.len(), 1);
        assert!(person.events[0].date.is_none());
        assert_eq!(person.events[0].metadata["jus_soli_country"], json!(true));
        assert!(person.notes.is_empty());
    }
}
