use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use sanguis::api::routes::{create_router, AppState};
use sanguis::api::{EvaluationRequest, EvaluationResponse};
use sanguis::config::{Command, Config};
use sanguis::observability::{init_tracing, MetricsRegistry};
use sanguis::policy::{RuleRepository, RuleWatcher};
use sanguis::rules::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level);

    let repository = RuleRepository::new(config.rule_sources());

    match config.command() {
        Command::Serve => serve(&config, repository).await,
        Command::Evaluate { input, pretty } => evaluate_file(repository, &input, pretty),
    }
}

async fn serve(config: &Config, repository: RuleRepository) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        sources = ?repository.sources(),
        "Starting sanguis eligibility engine"
    );

    let metrics = Arc::new(MetricsRegistry::new());

    // Load rules and start watching for changes
    let watcher = RuleWatcher::new(repository, config.rules_reload_interval())
        .with_metrics(metrics.clone());
    let (ruleset_rx, rules_handle) = watcher.start().context("Failed to load rule sources")?;

    // Create application state
    let state = Arc::new(AppState {
        ruleset_rx,
        metrics,
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        latency_budget_ms: config.latency_budget_ms,
    });

    // Create router
    let app = create_router(state);

    // Parse listen address
    let addr: SocketAddr = config.listen_addr.parse()?;

    info!(addr = %addr, "Starting HTTP server");

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        let (signalled_tx, mut signalled_rx) = watch::channel(false);
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(true);
        })
        .into_future();

        let timeout = config.shutdown_timeout();
        let drain_deadline = async move {
            let _ = signalled_rx.wait_for(|signalled| *signalled).await;
            tokio::time::sleep(timeout).await;
        };

        tokio::select! {
            result = server => result?,
            _ = drain_deadline => warn!(
                timeout_secs = timeout.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            ),
        }
    } else {
        axum::serve(listener, app).await?;
    }

    // Cleanup
    info!("Shutting down...");
    rules_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Evaluate one request file and print the response to stdout.
fn evaluate_file(repository: RuleRepository, input: &Path, pretty: bool) -> anyhow::Result<()> {
    let ruleset = repository.load().context("Failed to load rule sources")?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let request: EvaluationRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid evaluation request in {}", input.display()))?;
    let chain = request.to_lineage().map_err(sanguis::Error::from)?;

    let rules_version = ruleset.version.clone();
    let start = Instant::now();
    let result = Engine::new(Arc::new(ruleset))
        .evaluate(&chain, &request.process_context())
        .map_err(sanguis::Error::from)?;

    info!(
        overall_status = %result.overall_status,
        latency_us = start.elapsed().as_micros(),
        "Evaluation completed"
    );

    let response = EvaluationResponse::new(result, rules_version);
    let output = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
