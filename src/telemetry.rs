//! Tracing setup for the terminal binary.
//!
//! - LOG_LEVEL: EnvFilter directives, e.g. "debug" or "warn,engine=debug,store=trace".
//! - LOG_FORMAT: "json" for one JSON object per event, anything else for the
//!   human-readable format.
//!
//! Output goes to stderr so the quiz text on stdout is never interleaved with logs.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "warn,engine=info,xuci_trainer=info";

fn filter_from_env() -> EnvFilter {
    match EnvFilter::try_from_env("LOG_LEVEL") {
        Ok(f) => f,
        Err(_) => EnvFilter::new(DEFAULT_DIRECTIVES),
    }
}

fn wants_json() -> bool {
    matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json") | Ok("JSON"))
}

/// Install the global subscriber. Call once, first thing in `main`.
pub fn init_tracing() {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    if wants_json() {
        builder.json().with_current_span(true).init();
    } else {
        builder.compact().init();
    }
}
