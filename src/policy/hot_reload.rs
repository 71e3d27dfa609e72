use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

use crate::observability::MetricsRegistry;
use crate::rules::RuleSet;

use super::loader::{RuleError, RuleRepository};

/// Watch rule sources for changes and broadcast recompiled rule sets.
pub struct RuleWatcher {
    repository: RuleRepository,
    check_interval: Duration,
    last_fingerprint: u64,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl RuleWatcher {
    /// Create a new rule watcher.
    pub fn new(repository: RuleRepository, check_interval: Duration) -> Self {
        RuleWatcher {
            repository,
            check_interval,
            last_fingerprint: 0,
            metrics: None,
        }
    }

    /// Record reload attempts in the given registry.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Load the rules and start watching for changes.
    ///
    /// Fails if the check interval is zero or the initial load fails;
    /// later reload failures are logged and the previous rule set stays
    /// active.
    pub fn start(
        mut self,
    ) -> Result<(watch::Receiver<Arc<RuleSet>>, tokio::task::JoinHandle<()>), RuleError> {
        if self.check_interval.is_zero() {
            return Err(RuleError::Validation(
                "Rule reload interval must be greater than zero".to_string(),
            ));
        }

        let initial = self.repository.load()?;
        self.last_fingerprint = initial.fingerprint;
        info!(
            version = %initial.version,
            rules = initial.len(),
            "Loaded initial rule set"
        );

        let (tx, rx) = watch::channel(Arc::new(initial));

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                match self.check_for_updates(&tx) {
                    Ok(true) => info!("Rule set reloaded successfully"),
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Error checking for rule updates"),
                }
            }
        });

        Ok((rx, handle))
    }

    /// Reload and broadcast if the sources changed.
    fn check_for_updates(&mut self, tx: &watch::Sender<Arc<RuleSet>>) -> Result<bool, RuleError> {
        let fingerprint = self.repository.fingerprint()?;
        if fingerprint == self.last_fingerprint {
            return Ok(false);
        }

        let result = self.repository.load();
        if let Some(metrics) = &self.metrics {
            metrics.record_rule_reload(result.is_ok());
        }
        let ruleset = result?;

        info!(
            previous = %format!("{:016x}", self.last_fingerprint),
            version = %ruleset.version,
            rules = ruleset.len(),
            "Rule sources changed"
        );

        self.last_fingerprint = ruleset.fingerprint;
        let _ = tx.send(Arc::new(ruleset));

        Ok(true)
    }
}
