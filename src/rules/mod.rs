pub mod expr;
pub mod features;
pub mod pipeline;
pub mod rule;
pub mod value;

pub use expr::{Context, Expr, ExprError};
pub use features::{FeatureExtractor, Facts};
pub use pipeline::{Engine, EvaluationError};
pub use rule::{Effects, Rule};

use ahash::AHashSet;

use crate::domain::RuleDef;
use crate::policy::RuleError;

/// Ordered collection of compiled rules ready for evaluation.
///
/// Order is source order, then declaration order within each source, and
/// is significant for aggregation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
    pub version: String,
    /// Hash of the raw source contents the set was built from
    pub fingerprint: u64,
}

impl RuleSet {
    /// Compile rule definitions, rejecting duplicate IDs.
    pub fn compile<'a>(
        version: impl Into<String>,
        fingerprint: u64,
        defs: impl IntoIterator<Item = &'a RuleDef>,
    ) -> Result<Self, RuleError> {
        let mut seen_ids = AHashSet::new();
        let mut rules = Vec::new();

        for def in defs {
            if !seen_ids.insert(def.id.clone()) {
                return Err(RuleError::Validation(format!(
                    "Duplicate rule ID: {}",
                    def.id
                )));
            }
            rules.push(Rule::compile(def)?);
        }

        Ok(RuleSet {
            rules,
            version: version.into(),
            fingerprint,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuleSource;

    fn source(yaml: &str) -> RuleSource {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_ruleset_preserves_order() {
        let first = source("rules:\n  - {id: B, condition: true}\n  - {id: A, condition: false}\n");
        let second = source("rules:\n  - {id: C, condition: true}\n");

        let ruleset =
            RuleSet::compile("test-1", 7, first.rules.iter().chain(second.rules.iter())).unwrap();

        let ids: Vec<&str> = ruleset.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
        assert_eq!(ruleset.version, "test-1");
        assert_eq!(ruleset.fingerprint, 7);
        assert!(ruleset.get("C").is_some());
    }

    #[test]
    fn test_ruleset_duplicate_ids() {
        let first = source("rules:\n  - {id: R1, condition: true}\n");
        let second = source("rules:\n  - {id: R1, condition: false}\n");

        let err = RuleSet::compile("test", 0, first.rules.iter().chain(second.rules.iter()))
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }
}
