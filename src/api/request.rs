use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LineageLink, Notes, Person, PersonId, ProcessContext};

/// Errors in a request's person and link data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Applicant id '{0}' must be distinct from ancestors")]
    ApplicantAmongAncestors(PersonId),

    #[error("Duplicate ancestor id '{0}'")]
    DuplicatePerson(PersonId),

    #[error("Unknown parent_id '{0}' in lineage")]
    UnknownParent(PersonId),

    #[error("Unknown child_id '{0}' in lineage")]
    UnknownChild(PersonId),
}

/// Request for an eligibility evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The person applying for recognition
    pub applicant: Person,

    /// Everyone else referenced by the links
    pub ancestors: Vec<Person>,

    /// Parent/child links, oldest ancestor first
    pub lineage_links: Vec<LinkRequest>,

    /// Filing context (optional)
    #[serde(default)]
    pub context: Option<ProcessContext>,
}

/// Link portion of the request, referencing people by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRequest {
    pub parent_id: PersonId,
    pub child_id: PersonId,
    pub relationship: String,
    #[serde(default)]
    pub notes: Notes,
}

impl EvaluationRequest {
    /// Index every person in the request by id.
    pub fn person_index(&self) -> Result<AHashMap<&PersonId, &Person>, IngestError> {
        let mut people = AHashMap::with_capacity(self.ancestors.len() + 1);
        people.insert(&self.applicant.id, &self.applicant);

        for ancestor in &self.ancestors {
            if ancestor.id == self.applicant.id {
                return Err(IngestError::ApplicantAmongAncestors(ancestor.id.clone()));
            }
            if people.insert(&ancestor.id, ancestor).is_some() {
                return Err(IngestError::DuplicatePerson(ancestor.id.clone()));
            }
        }

        Ok(people)
    }

    /// Resolve the links into a lineage chain, keeping request order.
    pub fn to_lineage(&self) -> Result<Vec<LineageLink>, IngestError> {
        let people = self.person_index()?;

        self.lineage_links
            .iter()
            .map(|link| {
                let parent = people
                    .get(&link.parent_id)
                    .ok_or_else(|| IngestError::UnknownParent(link.parent_id.clone()))?;
                let child = people
                    .get(&link.child_id)
                    .ok_or_else(|| IngestError::UnknownChild(link.child_id.clone()))?;

                Ok(LineageLink {
                    parent: (*parent).clone(),
                    child: (*child).clone(),
                    relationship: link.relationship.clone(),
                    notes: link.notes.clone(),
                })
            })
            .collect()
    }

    /// Filing context, defaulting to an empty one.
    pub fn process_context(&self) -> ProcessContext {
        self.context.clone().unwrap_or_default()
    }
}
