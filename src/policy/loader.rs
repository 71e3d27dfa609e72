use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::domain::RuleSource;
use crate::rules::{ExprError, RuleSet};

/// Errors that can occur while loading rule sources.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON parsing error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rule {rule_id}: unrecognized {field} value '{value}'")]
    InvalidEnum {
        rule_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Rule {rule_id}: malformed condition: {source}")]
    Condition {
        rule_id: String,
        #[source]
        source: ExprError,
    },
}

impl RuleError {
    pub(crate) fn invalid_enum(rule_id: &str, field: &'static str, value: &str) -> Self {
        RuleError::InvalidEnum {
            rule_id: rule_id.to_string(),
            field,
            value: value.to_string(),
        }
    }
}

/// Parse one rule source document.
///
/// `.json` files are parsed as JSON, everything else as YAML.
pub fn parse_source(path: &Path, content: &str) -> Result<RuleSource, RuleError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_str(content).map_err(|source| RuleError::Json {
            path: path.display().to_string(),
            source,
        })
    } else {
        serde_yaml::from_str(content).map_err(|source| RuleError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }
}

fn read_source(path: &Path) -> Result<String, RuleError> {
    fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loads the ordered rule sources into a compiled [`RuleSet`].
#[derive(Debug, Clone)]
pub struct RuleRepository {
    sources: Vec<PathBuf>,
}

impl RuleRepository {
    /// Create a repository over an explicit, ordered list of sources.
    pub fn new<P: Into<PathBuf>>(sources: impl IntoIterator<Item = P>) -> Self {
        RuleRepository {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Read, parse and compile every source, in order.
    pub fn load(&self) -> Result<RuleSet, RuleError> {
        if self.sources.is_empty() {
            return Err(RuleError::Validation(
                "At least one rule source is required".to_string(),
            ));
        }

        let mut hasher = DefaultHasher::new();
        let mut documents = Vec::with_capacity(self.sources.len());

        for path in &self.sources {
            let content = read_source(path)?;
            content.hash(&mut hasher);

            let document = parse_source(path, &content)?;
            debug!(
                path = %path.display(),
                rules = document.rules.len(),
                "Parsed rule source"
            );
            documents.push(document);
        }

        let fingerprint = hasher.finish();
        let version = version_label(&documents, fingerprint);
        RuleSet::compile(
            version,
            fingerprint,
            documents.iter().flat_map(|doc| doc.rules.iter()),
        )
    }

    /// Hash of the current source contents, without compiling them.
    pub fn fingerprint(&self) -> Result<u64, RuleError> {
        let mut hasher = DefaultHasher::new();
        for path in &self.sources {
            read_source(path)?.hash(&mut hasher);
        }
        Ok(hasher.finish())
    }

    /// Get the configured source paths.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

/// Joined source versions, or the fingerprint when no source declares one.
fn version_label(documents: &[RuleSource], fingerprint: u64) -> String {
    let versions: Vec<&str> = documents
        .iter()
        .filter_map(|doc| doc.version.as_deref())
        .collect();

    if versions.is_empty() {
        format!("{:016x}", fingerprint)
    } else {
        versions.join("+")
    }
}
