//! Tracing setup.
//!
//! Logs always go to stderr: stdout carries the identity strings the host
//! reads back.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the filter: an explicit level wins over `RUST_LOG`, which wins over `info`.
pub fn filter(log_level: Option<Level>) -> EnvFilter {
	match log_level {
		Some(level) => EnvFilter::default().add_directive(level.into()),
		None => EnvFilter::builder()
			.with_default_directive(Level::INFO.into())
			.from_env_lossy(),
	}
}

/// Install the global subscriber.
///
/// Human-readable output when stderr is a terminal, JSON lines otherwise.
pub fn init(log_level: Option<Level>) {
	let fmt_layer = if std::io::stderr().is_terminal() {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.compact()
			.boxed()
	} else {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.json()
			.boxed()
	};

	tracing_subscriber::registry()
		.with(filter(log_level))
		.with(fmt_layer)
		.init();
}

#[cfg(test)]
mod tests {
	use tracing::level_filters::LevelFilter;

	use super::*;

	#[test]
	fn test_explicit_level_wins() {
		assert_eq!(
			filter(Some(Level::DEBUG)).max_level_hint(),
			Some(LevelFilter::DEBUG)
		);
	}
}
