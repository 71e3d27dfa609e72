pub mod lineage;
pub mod outcome;
pub mod person;
pub mod rule;
pub mod status;

pub use lineage::{LineageLink, ProcessContext, ProcessType};
pub use outcome::{EvaluationResult, RuleOutcome, NO_RULES_TRIGGERED};
pub use person::{CitizenshipEvent, Notes, Person, PersonId};
pub use rule::{EffectsDef, Preconditions, RuleDef, RuleSource};
pub use status::{AcquisitionMode, Confidence, CourtViability, OverallStatus, TransmissionStatus};
