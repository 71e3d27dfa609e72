use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::person::{Notes, Person};

/// Directed parent → child edge of the ancestry chain.
///
/// Links are ordered from the Italian ancestor down to the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageLink {
    pub parent: Person,

    pub child: Person,

    /// Relationship label, e.g. "father" or "mother"
    pub relationship: String,

    #[serde(default)]
    pub notes: Notes,
}

impl LineageLink {
    pub fn new(parent: Person, child: Person, relationship: impl Into<String>) -> Self {
        LineageLink {
            parent,
            child,
            relationship: relationship.into(),
            notes: Notes::new(),
        }
    }

    /// Returns true if the parent is the child's mother.
    #[inline]
    pub fn is_maternal(&self) -> bool {
        self.relationship
            .get(..6)
            .map(|prefix| prefix.eq_ignore_ascii_case("mother"))
            .unwrap_or(false)
    }
}

/// Kind of recognition process the applicant intends to file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessType {
    /// Consulate or comune (administrative) recognition
    Admin,
    /// Judicial recognition in an Italian court
    Court,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Admin => "ADMIN",
            ProcessType::Court => "COURT",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filing context supplied alongside the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessContext {
    #[serde(default)]
    pub process_type: Option<ProcessType>,

    #[serde(default)]
    pub country_of_filing: Option<String>,

    /// Carried through for rules; none of the shipped rules read it
    #[serde(default)]
    pub appointment_filed_date: Option<NaiveDate>,
}

impl ProcessContext {
    pub fn admin() -> Self {
        ProcessContext {
            process_type: Some(ProcessType::Admin),
            ..Default::default()
        }
    }

    pub fn court() -> Self {
        ProcessContext {
            process_type: Some(ProcessType::Court),
            ..Default::default()
        }
    }
}
