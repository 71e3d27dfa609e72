use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    AcquisitionMode, Confidence, CourtViability, EvaluationResult, OverallStatus, RuleOutcome,
    TransmissionStatus,
};

/// Response from an eligibility evaluation.
#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    /// Unique id for this evaluation, for support follow-up
    pub evaluation_id: Uuid,

    /// Rule set version used for this evaluation
    pub rules_version: String,

    pub overall_status: OverallStatus,
    pub confidence: Confidence,
    pub court_viability: CourtViability,
    pub needs_lawyer: bool,
    pub acquisition_mode: AcquisitionMode,

    /// Derived status for each link, parallel to the request's links
    pub link_statuses: Vec<TransmissionStatus>,

    pub explanations: Vec<String>,
    pub rule_outcomes: Vec<RuleOutcome>,
}

impl EvaluationResponse {
    /// Create a response from an evaluation result.
    pub fn new(result: EvaluationResult, rules_version: String) -> Self {
        EvaluationResponse {
            evaluation_id: Uuid::new_v4(),
            rules_version,
            overall_status: result.overall_status,
            confidence: result.confidence,
            court_viability: result.court_viability,
            needs_lawyer: result.needs_lawyer,
            acquisition_mode: result.acquisition_mode,
            link_statuses: result.link_statuses,
            explanations: result.explanations,
            rule_outcomes: result.rule_outcomes,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rules_version: String,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub rules_version: String,
    pub rules: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "INVALID_INPUT")
    }

    pub fn evaluation_error(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "RULE_EVALUATION_ERROR")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> EvaluationResult {
        EvaluationResult {
            lineage: Vec::new(),
            link_statuses: vec![TransmissionStatus::Intact, TransmissionStatus::CourtOnly1948],
            overall_status: OverallStatus::CourtOnly1948,
            confidence: Confidence::High,
            court_viability: CourtViability::High,
            needs_lawyer: true,
            acquisition_mode: AcquisitionMode::AutomaticByBlood,
            explanations: vec!["MATERNAL_1948: Pre-1948 maternal line".to_string()],
            rule_outcomes: vec![RuleOutcome {
                rule_id: "MATERNAL_1948".to_string(),
                status: TransmissionStatus::CourtOnly1948,
                notes: "Pre-1948 maternal line".to_string(),
                confidence: Confidence::High,
                needs_lawyer: true,
            }],
        }
    }

    #[test]
    fn test_evaluation_response_serialization() {
        let resp = EvaluationResponse::new(result(), "classical-1+reform-1".to_string());

        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["overall_status"], "COURT_ONLY_1948");
        assert_eq!(json["court_viability"], "HIGH");
        assert_eq!(json["acquisition_mode"], "AUTOMATIC_BY_BLOOD");
        assert_eq!(json["rules_version"], "classical-1+reform-1");
        assert_eq!(json["link_statuses"][1], "COURT_ONLY_1948");
        assert_eq!(json["rule_outcomes"][0]["rule_id"], "MATERNAL_1948");
        assert!(json.get("lineage").is_none());
    }

    #[test]
    fn test_evaluation_ids_are_unique() {
        let a = EvaluationResponse::new(result(), "v1".to_string());
        let b = EvaluationResponse::new(result(), "v1".to_string());
        assert_ne!(a.evaluation_id, b.evaluation_id);
    }

    #[test]
    fn test_error_response_codes() {
        assert_eq!(ErrorResponse::invalid_input("bad").code, "INVALID_INPUT");
        assert_eq!(
            ErrorResponse::evaluation_error("boom").code,
            "RULE_EVALUATION_ERROR"
        );
    }
}
