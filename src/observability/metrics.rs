use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::domain::{EvaluationResult, OverallStatus};

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total evaluation requests processed
    pub evaluations_total: AtomicU64,

    /// Completed evaluations by overall status, indexed like `OverallStatus::ALL`
    pub evaluations_by_status: [AtomicU64; OverallStatus::ALL.len()],

    /// Evaluations needing legal counsel
    pub needs_lawyer_total: AtomicU64,

    /// Rejected requests and failed evaluations
    pub input_errors_total: AtomicU64,
    pub evaluation_errors_total: AtomicU64,

    /// Evaluation latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_50_100ms: AtomicU64,
    pub latency_over_100ms: AtomicU64,

    /// Rule evaluation counts
    pub rules_evaluated_total: AtomicU64,
    pub rules_matched_total: AtomicU64,

    /// Rule reloads
    pub rule_reloads_total: AtomicU64,
    pub rule_reload_errors: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record a completed evaluation.
    pub fn record_evaluation(&self, result: &EvaluationResult, rules_evaluated: usize) {
        self.evaluations_total.fetch_add(1, Ordering::Relaxed);
        self.evaluations_by_status[status_index(result.overall_status)]
            .fetch_add(1, Ordering::Relaxed);
        if result.needs_lawyer {
            self.needs_lawyer_total.fetch_add(1, Ordering::Relaxed);
        }
        self.rules_evaluated_total
            .fetch_add(rules_evaluated as u64, Ordering::Relaxed);
        self.rules_matched_total
            .fetch_add(result.rule_outcomes.len() as u64, Ordering::Relaxed);
    }

    /// Record a request rejected during ingestion.
    pub fn record_input_error(&self) {
        self.input_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evaluation aborted by a rule condition.
    pub fn record_evaluation_error(&self) {
        self.evaluation_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count of completed evaluations with the given overall status.
    pub fn evaluations_with(&self, status: OverallStatus) -> u64 {
        self.evaluations_by_status[status_index(status)].load(Ordering::Relaxed)
    }

    /// Record evaluation latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 1000 {
            self.latency_under_1ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 5000 {
            self.latency_1_5ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 10000 {
            self.latency_5_10ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 50000 {
            self.latency_10_50ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 100000 {
            self.latency_50_100ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_100ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rule reload.
    pub fn record_rule_reload(&self, success: bool) {
        self.rule_reloads_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.rule_reload_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let mut by_status = String::new();
        for status in OverallStatus::ALL {
            by_status.push_str(&format!(
                "sanguis_evaluations{{status=\"{}\"}} {}\n",
                status.as_str(),
                self.evaluations_with(status)
            ));
        }

        format!(
            r#"# HELP sanguis_evaluations_total Total number of evaluation requests
# TYPE sanguis_evaluations_total counter
sanguis_evaluations_total {}

# HELP sanguis_evaluations Evaluations by overall status
# TYPE sanguis_evaluations counter
{}
# HELP sanguis_needs_lawyer_total Evaluations flagged for legal counsel
# TYPE sanguis_needs_lawyer_total counter
sanguis_needs_lawyer_total {}

# HELP sanguis_input_errors_total Requests rejected during ingestion
# TYPE sanguis_input_errors_total counter
sanguis_input_errors_total {}

# HELP sanguis_evaluation_errors_total Evaluations aborted by a rule error
# TYPE sanguis_evaluation_errors_total counter
sanguis_evaluation_errors_total {}

# HELP sanguis_evaluation_latency_bucket Evaluation latency histogram
# TYPE sanguis_evaluation_latency_bucket counter
sanguis_evaluation_latency_bucket{{le="0.001"}} {}
sanguis_evaluation_latency_bucket{{le="0.005"}} {}
sanguis_evaluation_latency_bucket{{le="0.01"}} {}
sanguis_evaluation_latency_bucket{{le="0.05"}} {}
sanguis_evaluation_latency_bucket{{le="0.1"}} {}
sanguis_evaluation_latency_bucket{{le="+Inf"}} {}

# HELP sanguis_rules_evaluated_total Total rule evaluations
# TYPE sanguis_rules_evaluated_total counter
sanguis_rules_evaluated_total {}

# HELP sanguis_rules_matched_total Total rules that matched
# TYPE sanguis_rules_matched_total counter
sanguis_rules_matched_total {}

# HELP sanguis_rule_reloads_total Rule reload operations
# TYPE sanguis_rule_reloads_total counter
sanguis_rule_reloads_total {}

# HELP sanguis_rule_reload_errors_total Rule reload errors
# TYPE sanguis_rule_reload_errors_total counter
sanguis_rule_reload_errors_total {}
"#,
            self.evaluations_total.load(Ordering::Relaxed),
            by_status,
            self.needs_lawyer_total.load(Ordering::Relaxed),
            self.input_errors_total.load(Ordering::Relaxed),
            self.evaluation_errors_total.load(Ordering::Relaxed),
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_50_100ms.load(Ordering::Relaxed),
            self.latency_over_100ms.load(Ordering::Relaxed),
            self.rules_evaluated_total.load(Ordering::Relaxed),
            self.rules_matched_total.load(Ordering::Relaxed),
            self.rule_reloads_total.load(Ordering::Relaxed),
            self.rule_reload_errors.load(Ordering::Relaxed),
        )
    }
}

fn status_index(status: OverallStatus) -> usize {
    OverallStatus::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or_default()
}

/// Guard for timing operations.
pub struct TimingGuard<'a> {
    registry: &'a MetricsRegistry,
    start: Instant,
}

impl<'a> TimingGuard<'a> {
    pub fn new(registry: &'a MetricsRegistry) -> Self {
        TimingGuard {
            registry,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for TimingGuard<'a> {
    fn drop(&mut self) {
        self.registry.record_latency(self.start);
    }
}
