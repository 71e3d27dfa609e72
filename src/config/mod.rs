use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Rule files loaded when no sources are given, in evaluation order.
pub const DEFAULT_RULE_SOURCES: [&str; 4] = [
    "rules/classical.yaml",
    "rules/maternal1948.yaml",
    "rules/minor_issue.yaml",
    "rules/reform.yaml",
];

/// Eligibility engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "sanguis")]
#[command(about = "Jure sanguinis citizenship eligibility rule engine")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, global = true, default_value = "0.0.0.0:8080", env = "SANGUIS_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Ordered rule source files (comma separated)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        default_values_t = DEFAULT_RULE_SOURCES.map(String::from),
        env = "SANGUIS_RULES"
    )]
    pub rules: Vec<String>,

    /// Rule reload check interval in seconds
    #[arg(
        long,
        global = true,
        default_value = "30",
        env = "SANGUIS_RULES_RELOAD_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub rules_reload_secs: u64,

    /// Latency budget in milliseconds for the evaluation endpoint
    #[arg(long, global = true, default_value = "100", env = "SANGUIS_LATENCY_BUDGET_MS")]
    pub latency_budget_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable graceful shutdown
    #[arg(long, global = true, default_value = "true", env = "SANGUIS_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Graceful shutdown timeout in seconds
    #[arg(long, global = true, default_value = "30", env = "SANGUIS_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the HTTP evaluation API (default)
    Serve,

    /// Evaluate a single request file and print the result as JSON
    Evaluate {
        /// Path to an evaluation request JSON file
        #[arg(long, short)]
        input: PathBuf,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

impl Config {
    /// Get the rule sources as paths, in order.
    pub fn rule_sources(&self) -> Vec<PathBuf> {
        self.rules.iter().map(PathBuf::from).collect()
    }

    /// Get rule reload interval as Duration.
    pub fn rules_reload_interval(&self) -> Duration {
        Duration::from_secs(self.rules_reload_secs)
    }

    /// Get shutdown timeout as Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Subcommand to run, defaulting to `serve`.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            rules: DEFAULT_RULE_SOURCES.map(String::from).to_vec(),
            rules_reload_secs: 30,
            latency_budget_ms: 100,
            log_level: "info".to_string(),
            graceful_shutdown: true,
            shutdown_timeout_secs: 30,
            command: None,
        }
    }
}
