pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod policy;
pub mod rules;

use std::path::PathBuf;
use std::sync::Arc;

pub use config::Config;
pub use domain::{
    EvaluationResult, LineageLink, OverallStatus, Person, ProcessContext, TransmissionStatus,
};
pub use error::Error;
pub use policy::RuleRepository;
pub use rules::{Engine, RuleSet};

/// Load the given rule sources and evaluate one chain against them.
///
/// Sources are applied in the order given. For repeated evaluations,
/// load a [`RuleSet`] once and reuse an [`Engine`].
pub fn evaluate_lineage<P: Into<PathBuf>>(
    chain: &[LineageLink],
    context: &ProcessContext,
    sources: impl IntoIterator<Item = P>,
) -> Result<EvaluationResult, Error> {
    let ruleset = RuleRepository::new(sources).load()?;
    let result = Engine::new(Arc::new(ruleset)).evaluate(chain, context)?;
    Ok(result)
}
