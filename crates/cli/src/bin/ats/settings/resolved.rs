use std::path::PathBuf;
use std::time::Duration;

use ats_core::{ActionPolicy, SearchOptions};

/// Application-ready configuration derived from user input, config files and
/// defaults.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
	pub(crate) options: SearchOptions,
	pub(crate) registry_capacity: usize,
	pub(crate) poll_interval: Duration,
	pub(crate) policy: ActionPolicy,
	pub(crate) collections: Vec<PathBuf>,
}

impl ResolvedConfig {
	/// Print a human readable summary of the effective configuration.
	pub(crate) fn print_summary(&self) {
		let options = &self.options;
		println!("Effective configuration:");
		println!("  Case sensitive: {}", bool_to_word(options.case_sensitive));
		println!("  Search title: {}", bool_to_word(options.title));
		println!("  Search user name: {}", bool_to_word(options.user_name));
		println!("  Search URL: {}", bool_to_word(options.url));
		println!("  Search notes: {}", bool_to_word(options.notes));
		println!(
			"  Search custom fields: {}",
			bool_to_word(options.custom_fields)
		);
		println!("  Search tags: {}", bool_to_word(options.tags));
		println!(
			"  Resolve references: {}",
			bool_to_word(options.resolve_references)
		);
		println!(
			"  Exclude expired: {}",
			bool_to_word(options.exclude_expired)
		);
		println!("  Registry capacity: {}", self.registry_capacity);
		println!("  Poll interval: {}ms", self.poll_interval.as_millis());
		println!("  Default action: {}", self.policy.default);
		println!("  Alternative action: {}", self.policy.alternative);
		if self.collections.is_empty() {
			println!("  Collections: (none)");
		} else {
			println!("  Collections:");
			for path in &self.collections {
				println!("    {}", path.display());
			}
		}
	}
}

fn bool_to_word(value: bool) -> &'static str {
	if value { "yes" } else { "no" }
}
