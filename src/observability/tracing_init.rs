//! Tracing initialization for the CLI.
//!
//! Logs are written to stderr; stdout is reserved for the rendered report.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use super::Verbosity;
use crate::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber.
///
/// Filter precedence: `RUST_LOG`, then the `--verbose` level, then the
/// configured level and filter directives.
pub fn init_tracing(config: &LoggingConfig, verbosity: Verbosity) -> Result<(), TracingError> {
    let filter = build_env_filter(config, verbosity);

    let result = match (config.format, config.timestamps) {
        (LogFormat::Pretty, true) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        (LogFormat::Pretty, false) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        (LogFormat::Compact, true) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        (LogFormat::Compact, false) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        (LogFormat::Json, _) => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
    };

    result.map_err(|e| TracingError::Init(e.to_string()))
}

fn build_env_filter(config: &LoggingConfig, verbosity: Verbosity) -> EnvFilter {
    if let Ok(env_filter) = std::env::var("RUST_LOG")
        && let Ok(filter) = EnvFilter::try_new(env_filter)
    {
        return filter;
    }

    EnvFilter::new(filter_directives(config, verbosity))
}

/// Filter directives for the given configuration and verbosity.
fn filter_directives(config: &LoggingConfig, verbosity: Verbosity) -> String {
    if let Some(crate_level) = verbosity.crate_level() {
        return format!("warn,aidex={crate_level}");
    }

    let base_level = config.level.as_str();
    match &config.filter {
        Some(filter) if EnvFilter::try_new(format!("{base_level},{filter}")).is_ok() => {
            format!("{base_level},{filter}")
        }
        _ => format!("{base_level},hyper=warn,h2=warn,reqwest=warn"),
    }
}

/// Tracing initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}
