use chrono::NaiveDate;

use crate::domain::{
    AcquisitionMode, Confidence, EffectsDef, Preconditions, RuleDef, RuleOutcome,
    TransmissionStatus,
};
use crate::policy::RuleError;

use super::expr::Expr;

/// Typed effects applied when a rule matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Effects {
    pub status: TransmissionStatus,
    /// Falls back to the rule description when absent
    pub notes: Option<String>,
    pub confidence: Confidence,
    pub needs_lawyer: bool,
    /// Only overwrites the running acquisition mode when present
    pub acquisition_mode: Option<AcquisitionMode>,
}

impl Effects {
    /// Validate raw effects, rejecting unrecognized enum values.
    fn compile(rule_id: &str, def: &EffectsDef) -> Result<Self, RuleError> {
        let status = match def.status.as_deref() {
            Some(s) => TransmissionStatus::from_str(s)
                .ok_or_else(|| RuleError::invalid_enum(rule_id, "status", s))?,
            None => TransmissionStatus::Intact,
        };
        let confidence = match def.confidence.as_deref() {
            Some(s) => Confidence::from_str(s)
                .ok_or_else(|| RuleError::invalid_enum(rule_id, "confidence", s))?,
            None => Confidence::Medium,
        };
        let acquisition_mode = def
            .acquisition_mode
            .as_deref()
            .map(|s| {
                AcquisitionMode::from_str(s)
                    .ok_or_else(|| RuleError::invalid_enum(rule_id, "acquisition_mode", s))
            })
            .transpose()?;

        Ok(Effects {
            status,
            notes: def.notes.clone(),
            confidence,
            needs_lawyer: def.needs_lawyer,
            acquisition_mode,
        })
    }
}

/// A rule compiled from its definition, ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub preconditions: Preconditions,
    pub condition: Expr,
    pub effects: Effects,
    pub sources: Vec<String>,
    pub effective_date: Option<NaiveDate>,
    pub contested: bool,
}

impl Rule {
    /// Compile a rule definition.
    pub fn compile(def: &RuleDef) -> Result<Self, RuleError> {
        if def.id.trim().is_empty() {
            return Err(RuleError::Validation("Rule ID cannot be empty".to_string()));
        }

        let condition = Expr::compile(&def.condition).map_err(|source| RuleError::Condition {
            rule_id: def.id.clone(),
            source,
        })?;

        Ok(Rule {
            id: def.id.clone(),
            description: def.description.clone(),
            preconditions: def.preconditions,
            condition,
            effects: Effects::compile(&def.id, &def.effects)?,
            sources: def.sources.clone(),
            effective_date: def.effective_date,
            contested: def.contested,
        })
    }

    /// Check the rule's preconditions against a chain of the given length.
    #[inline]
    pub fn preconditions_met(&self, lineage_length: usize) -> bool {
        !(self.preconditions.needs_lineage && lineage_length == 0)
    }

    /// Outcome recorded when this rule matches.
    pub fn outcome(&self) -> RuleOutcome {
        RuleOutcome {
            rule_id: self.id.clone(),
            status: self.effects.status,
            notes: self
                .effects
                .notes
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            confidence: self.effects.confidence,
            needs_lawyer: self.effects.needs_lawyer || self.contested,
        }
    }
}
