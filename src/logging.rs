//! `tracing` subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingSection;

/// Resolve the filter: `RUST_LOG` wins, then `verbose`, then the configured level.
pub fn build_filter(logging: &LoggingSection, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { logging.level.as_str() };
    EnvFilter::try_new(level_directive(level))
        .unwrap_or_else(|_| EnvFilter::new("taskboard=info"))
}

/// A bare level applies to this crate only; full directives pass through.
pub fn level_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("taskboard={}", level)
    }
}

/// Install the global subscriber, writing to stderr so stdout stays clean
/// for command output. Calling it twice is harmless.
pub fn init(logging: &LoggingSection, verbose: bool, json: bool) {
    let filter = build_filter(logging, verbose);
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json || logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("[taskboard] logging already initialised: {}", e);
    }
}
