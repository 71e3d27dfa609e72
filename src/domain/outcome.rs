use serde::{Deserialize, Serialize};

use super::lineage::LineageLink;
use super::status::{AcquisitionMode, Confidence, CourtViability, OverallStatus, TransmissionStatus};

/// Explanation used when no rule matched.
pub const NO_RULES_TRIGGERED: &str =
    "No blocking rules triggered; defaulting to classical transmission pending document review.";

/// Outcome recorded for a rule whose preconditions and condition both held.
///
/// Provides the audit trail of why a verdict was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// The rule that matched
    pub rule_id: String,

    pub status: TransmissionStatus,

    pub notes: String,

    pub confidence: Confidence,

    pub needs_lawyer: bool,
}

impl RuleOutcome {
    /// Explanation line for this outcome.
    pub fn explanation(&self) -> String {
        format!("{}: {}", self.rule_id, self.notes)
    }
}

/// Result of evaluating one ancestry chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The evaluated chain, unchanged
    pub lineage: Vec<LineageLink>,

    /// Transmission status per link, parallel to `lineage`
    pub link_statuses: Vec<TransmissionStatus>,

    pub overall_status: OverallStatus,

    pub confidence: Confidence,

    pub court_viability: CourtViability,

    pub needs_lawyer: bool,

    pub acquisition_mode: AcquisitionMode,

    pub explanations: Vec<String>,

    pub rule_outcomes: Vec<RuleOutcome>,
}

impl EvaluationResult {
    /// Find the outcome recorded for a rule, if it matched.
    pub fn outcome(&self, rule_id: &str) -> Option<&RuleOutcome> {
        self.rule_outcomes.iter().find(|o| o.rule_id == rule_id)
    }

    /// Returns true if any matched rule produced the given status.
    pub fn has_status(&self, status: TransmissionStatus) -> bool {
        self.rule_outcomes.iter().any(|o| o.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_explanation() {
        let outcome = RuleOutcome {
            rule_id: "MATERNAL_1948".to_string(),
            status: TransmissionStatus::CourtOnly1948,
            notes: "Court only".to_string(),
            confidence: Confidence::High,
            needs_lawyer: true,
        };

        assert_eq!(outcome.explanation(), "MATERNAL_1948: Court only");
    }

    #[test]
    fn test_result_lookup() {
        let result = EvaluationResult {
            lineage: Vec::new(),
            link_statuses: Vec::new(),
            overall_status: OverallStatus::IndeterminateComplexCase,
            confidence: Confidence::Medium,
            court_viability: CourtViability::None,
            needs_lawyer: true,
            acquisition_mode: AcquisitionMode::AutomaticByBlood,
            explanations: vec!["R1: broken".to_string()],
            rule_outcomes: vec![RuleOutcome {
                rule_id: "R1".to_string(),
                status: TransmissionStatus::BrokenNaturalization,
                notes: "broken".to_string(),
                confidence: Confidence::Medium,
                needs_lawyer: true,
            }],
        };

        assert!(result.outcome("R1").is_some());
        assert!(result.outcome("R2").is_none());
        assert!(result.has_status(TransmissionStatus::BrokenNaturalization));
        assert!(!result.has_status(TransmissionStatus::Intact));
    }
}
