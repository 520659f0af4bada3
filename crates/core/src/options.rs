use serde::{Deserialize, Serialize};

/// Matching behaviour captured when a search stream is created.
///
/// Later changes to the options only affect streams created afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
	pub case_sensitive: bool,
	pub title: bool,
	pub user_name: bool,
	pub url: bool,
	pub notes: bool,
	pub custom_fields: bool,
	pub tags: bool,
	/// Retry entries that did not match with placeholders expanded.
	pub resolve_references: bool,
	/// Skip entries whose expiry time has passed when the scan starts.
	pub exclude_expired: bool,
}

impl Default for SearchOptions {
	fn default() -> Self {
		Self {
			case_sensitive: false,
			title: true,
			user_name: true,
			url: true,
			notes: true,
			custom_fields: true,
			tags: true,
			resolve_references: true,
			exclude_expired: false,
		}
	}
}

impl SearchOptions {
	/// Options that search only the title field.
	#[must_use]
	pub fn titles_only() -> Self {
		Self {
			user_name: false,
			url: false,
			notes: false,
			custom_fields: false,
			tags: false,
			..Self::default()
		}
	}
}
