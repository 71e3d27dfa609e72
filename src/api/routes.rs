use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::observability::metrics::TimingGuard;
use crate::observability::MetricsRegistry;
use crate::rules::{Engine, RuleSet};

use super::request::EvaluationRequest;
use super::response::{ErrorResponse, EvaluationResponse, HealthResponse, ReadyResponse};

/// Shared application state.
pub struct AppState {
    /// Current rule set (updated via watch channel)
    pub ruleset_rx: watch::Receiver<Arc<RuleSet>>,

    /// Application metrics
    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Latency budget in milliseconds
    pub latency_budget_ms: u64,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/eligibility/evaluate", post(handle_evaluate))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle eligibility evaluation requests.
async fn handle_evaluate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let _timing = TimingGuard::new(&state.metrics);

    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => {
            state.metrics.record_input_error();
            warn!(error = %rejection.body_text(), "Rejected malformed evaluation request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::invalid_input(rejection.body_text())),
            )
                .into_response();
        }
    };

    let chain = match req.to_lineage() {
        Ok(chain) => chain,
        Err(e) => {
            state.metrics.record_input_error();
            warn!(applicant = %req.applicant.id, error = %e, "Rejected evaluation request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::invalid_input(e.to_string())),
            )
                .into_response();
        }
    };

    // Get current ruleset
    let ruleset = state.ruleset_rx.borrow().clone();
    let rules_version = ruleset.version.clone();
    let rule_count = ruleset.len();

    let result = match Engine::new(ruleset).evaluate(&chain, &req.process_context()) {
        Ok(result) => result,
        Err(e) => {
            state.metrics.record_evaluation_error();
            error!(
                applicant = %req.applicant.id,
                rules_version = %rules_version,
                error = %e,
                "Rule evaluation failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::evaluation_error(e.to_string())),
            )
                .into_response();
        }
    };

    state.metrics.record_evaluation(&result, rule_count);

    // Check latency budget
    let elapsed = start.elapsed();
    if elapsed.as_millis() > state.latency_budget_ms as u128 {
        warn!(
            applicant = %req.applicant.id,
            latency_ms = elapsed.as_millis(),
            budget_ms = state.latency_budget_ms,
            "Evaluation latency exceeded budget"
        );
    }

    info!(
        applicant = %req.applicant.id,
        links = chain.len(),
        overall_status = %result.overall_status,
        needs_lawyer = result.needs_lawyer,
        latency_us = elapsed.as_micros(),
        "Evaluation completed"
    );

    (
        StatusCode::OK,
        Json(EvaluationResponse::new(result, rules_version)),
    )
        .into_response()
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ruleset = state.ruleset_rx.borrow();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        rules_version: ruleset.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> Response {
    let ruleset = state.ruleset_rx.borrow();

    if ruleset.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("No rules loaded", "NOT_READY")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            rules_version: ruleset.version.clone(),
            rules: ruleset.len(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rules_loaded = state.ruleset_rx.borrow().len();

    let metrics = format!(
        r#"# HELP sanguis_uptime_seconds Application uptime in seconds
# TYPE sanguis_uptime_seconds counter
sanguis_uptime_seconds {}

# HELP sanguis_rules_loaded Number of rules in the active rule set
# TYPE sanguis_rules_loaded gauge
sanguis_rules_loaded {}

{}"#,
        state.start_time.elapsed().as_secs(),
        rules_loaded,
        state.metrics.to_prometheus(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}
