//! Stderr logging for the `ats` binary.
//!
//! The libraries log through the `log` facade. The subscriber installed here
//! bridges those records and writes them to stderr, so stdout stays reserved
//! for results.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive such as `ats_core=debug`.
pub(crate) const LOG_ENV: &str = "ATS_LOG";

/// Install the global subscriber.
///
/// `ATS_LOG` wins when set. Otherwise `verbose` selects debug output for the
/// workspace crates and warnings are shown by default.
pub(crate) fn initialize(verbose: bool) -> Result<()> {
	let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.try_init()
		.map_err(|err| anyhow!("failed to initialise logging: {err}"))
}

fn default_filter(verbose: bool) -> EnvFilter {
	if verbose {
		EnvFilter::new("warn,ats=debug,ats_core=debug,ats_stream=debug")
	} else {
		EnvFilter::new("warn")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbose_filter_enables_debug_for_workspace_crates() {
		let filter = default_filter(true).to_string();
		assert!(filter.contains("ats_core=debug"));
		assert_eq!(default_filter(false).to_string(), "warn");
	}
}
