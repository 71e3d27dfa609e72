use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

use crate::domain::{
    AcquisitionMode, Confidence, CourtViability, EvaluationResult, LineageLink, OverallStatus,
    ProcessContext, RuleOutcome, NO_RULES_TRIGGERED,
};

use super::expr::{Context, ExprError};
use super::features::{FeatureExtractor, Facts};
use super::rule::Rule;
use super::RuleSet;

/// Errors raised while applying rules to a chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("condition of rule {rule_id} failed: {source}")]
    Condition {
        rule_id: String,
        #[source]
        source: ExprError,
    },
}

/// Running aggregate of matched rule outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub overall_status: OverallStatus,
    pub confidence: Confidence,
    pub court_viability: CourtViability,
    pub acquisition_mode: AcquisitionMode,
    pub needs_lawyer: bool,
}

impl Verdict {
    /// Verdict before any rule has matched.
    pub fn initial() -> Self {
        Verdict {
            overall_status: OverallStatus::ClearAdminEligible,
            confidence: Confidence::High,
            court_viability: CourtViability::None,
            acquisition_mode: AcquisitionMode::AutomaticByBlood,
            needs_lawyer: false,
        }
    }

    /// Fold one matched outcome into the verdict.
    ///
    /// The overall status is overwritten rather than ranked, so the last
    /// matched rule with a mapped status decides it.
    pub fn apply(&mut self, rule: &Rule, outcome: &RuleOutcome) {
        if let Some(overall) = outcome.status.overall() {
            self.overall_status = overall;
        }
        if let Some(mode) = rule.effects.acquisition_mode {
            self.acquisition_mode = mode;
        }
        self.needs_lawyer |= outcome.needs_lawyer;
        if outcome.status.opens_court_path() {
            self.court_viability = CourtViability::High;
        }
        self.confidence = self.confidence.downgrade(outcome.confidence);
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Verdict::initial()
    }
}

/// Rule engine evaluating ancestry chains against one rule set.
///
/// The rule set is shared read-only, so one engine (or many engines
/// over the same `Arc<RuleSet>`) can serve concurrent evaluations.
#[derive(Debug, Clone)]
pub struct Engine {
    rules: Arc<RuleSet>,
    extractor: FeatureExtractor,
}

impl Engine {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Engine {
            rules,
            extractor: FeatureExtractor::default(),
        }
    }

    /// Build the flat context rule conditions are evaluated against.
    ///
    /// Derived facts overwrite the base keys on collision.
    pub fn build_context(chain: &[LineageLink], process: &ProcessContext, facts: &Facts) -> Context {
        let mut ctx = Context::new();

        ctx.insert(
            "process_type".to_string(),
            optional_string(process.process_type.map(|p| p.as_str())),
        );
        ctx.insert(
            "country_of_filing".to_string(),
            optional_string(process.country_of_filing.as_deref()),
        );
        ctx.insert("lineage_length".to_string(), Value::from(chain.len()));
        ctx.insert(
            "applicant_birth_country".to_string(),
            optional_string(chain.last().and_then(|l| l.child.birth_country.as_deref())),
        );
        ctx.insert(
            "ancestor_birth_country".to_string(),
            optional_string(chain.first().and_then(|l| l.parent.birth_country.as_deref())),
        );

        facts.extend_context(&mut ctx);
        ctx
    }

    /// Evaluate a chain against every rule, in rule order.
    pub fn evaluate(
        &self,
        chain: &[LineageLink],
        process: &ProcessContext,
    ) -> Result<EvaluationResult, EvaluationError> {
        let facts = self.extractor.extract(chain);
        let ctx = Self::build_context(chain, process, &facts);
        trace!(?ctx, "Evaluation context built");

        let mut verdict = Verdict::initial();
        let mut outcomes = Vec::new();

        for rule in &self.rules.rules {
            if !rule.preconditions_met(chain.len()) {
                trace!(rule_id = %rule.id, "Preconditions unmet, skipping rule");
                continue;
            }

            let matched =
                rule.condition
                    .matches(&ctx)
                    .map_err(|source| EvaluationError::Condition {
                        rule_id: rule.id.clone(),
                        source,
                    })?;
            if !matched {
                continue;
            }

            let outcome = rule.outcome();
            debug!(
                rule_id = %outcome.rule_id,
                status = %outcome.status,
                needs_lawyer = outcome.needs_lawyer,
                "Rule matched"
            );
            verdict.apply(rule, &outcome);
            outcomes.push(outcome);
        }

        let mut explanations: Vec<String> = outcomes.iter().map(RuleOutcome::explanation).collect();
        if explanations.is_empty() {
            explanations.push(NO_RULES_TRIGGERED.to_string());
        }

        debug!(
            overall_status = %verdict.overall_status,
            matched = outcomes.len(),
            rules = self.rules.len(),
            "Evaluation finished"
        );

        Ok(EvaluationResult {
            lineage: chain.to_vec(),
            link_statuses: facts.link_statuses,
            overall_status: verdict.overall_status,
            confidence: verdict.confidence,
            court_viability: verdict.court_viability,
            needs_lawyer: verdict.needs_lawyer,
            acquisition_mode: verdict.acquisition_mode,
            explanations,
            rule_outcomes: outcomes,
        })
    }
}

fn optional_string(value: Option<&str>) -> Value {
    value
        .map(|s| Value::String(s.to_string()))
        .unwrap_or(Value::Null)
}
