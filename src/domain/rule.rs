use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One declarative rule source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSource {
    /// Optional version label of this source
    #[serde(default)]
    pub version: Option<String>,

    /// Rule definitions, in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// Definition of a single rule as written in a rule source.
///
/// Conditions and effects are kept loosely typed here; the loader
/// compiles them into a [`crate::rules::Rule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Unique rule identifier
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub preconditions: Preconditions,

    /// Condition expression tree
    #[serde(default = "empty_condition")]
    pub condition: serde_json::Value,

    #[serde(default)]
    pub effects: EffectsDef,

    /// Legal citations backing the rule
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub effective_date: Option<NaiveDate>,

    /// Contested rules always require specialist review
    #[serde(default)]
    pub contested: bool,
}

fn empty_condition() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Conditions that must hold before a rule's condition is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preconditions {
    /// Skip the rule when the chain is empty
    #[serde(default)]
    pub needs_lineage: bool,
}

/// Rule effects as written, before enum values are validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectsDef {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub confidence: Option<String>,

    #[serde(default)]
    pub needs_lawyer: bool,

    #[serde(default)]
    pub acquisition_mode: Option<String>,
}
