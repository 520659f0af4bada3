//! What happens when a result is accepted.
//!
//! The engine never performs actions itself. The host application implements
//! [`ActionHost`] and [`perform_action`] decides which capability to call.

use std::fmt;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ParseActionError;
use crate::model::{Collection, Entry};

/// An action applied to the chosen entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
	#[serde(rename = "auto-type")]
	PerformAutoType,
	#[serde(rename = "edit")]
	EditEntry,
	#[serde(rename = "show")]
	ShowEntry,
	#[serde(rename = "open-url")]
	OpenEntryUrl,
	CopyPassword,
}

impl Action {
	pub const ALL: [Action; 5] = [
		Action::PerformAutoType,
		Action::EditEntry,
		Action::ShowEntry,
		Action::OpenEntryUrl,
		Action::CopyPassword,
	];

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::PerformAutoType => "auto-type",
			Self::EditEntry => "edit",
			Self::ShowEntry => "show",
			Self::OpenEntryUrl => "open-url",
			Self::CopyPassword => "copy-password",
		}
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Action {
	type Err = ParseActionError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let wanted = value.trim();
		Self::ALL
			.into_iter()
			.find(|action| action.as_str().eq_ignore_ascii_case(wanted))
			.ok_or_else(|| ParseActionError(value.to_owned()))
	}
}

/// Capabilities the host application provides.
pub trait ActionHost {
	/// Type the entry's auto-type sequence into the target window.
	///
	/// Returns `false` when no sequence could be typed, for example because no
	/// window matched.
	fn auto_type(&mut self, entry: &Entry, collection: &Collection) -> bool;

	fn edit_entry(&mut self, entry: &Entry, collection: &Collection);

	/// Reveal the entry in the host's main window.
	fn show_entry(&mut self, entry: &Entry, collection: &Collection);

	fn open_url(&mut self, entry: &Entry, collection: &Collection);

	fn copy_password(&mut self, entry: &Entry, collection: &Collection);
}

/// Which action an accept keystroke performs, and the fallback used when
/// auto-type fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPolicy {
	pub default: Action,
	pub alternative: Action,
}

impl Default for ActionPolicy {
	fn default() -> Self {
		Self {
			default: Action::PerformAutoType,
			alternative: Action::EditEntry,
		}
	}
}

/// Result of [`perform_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
	Performed(Action),
	/// Auto-type failed and the alternative action ran instead.
	FellBack { failed: Action, performed: Action },
	/// Auto-type failed and no different alternative was configured.
	Failed(Action),
}

/// Run `action` on `entry` through `host`.
///
/// When auto-type reports failure, `policy.alternative` runs instead unless it
/// is auto-type itself.
pub fn perform_action(
	host: &mut dyn ActionHost,
	action: Action,
	policy: &ActionPolicy,
	entry: &Entry,
	collection: &Collection,
) -> ActionOutcome {
	if dispatch(host, action, entry, collection) {
		info!("{action} performed on entry '{}'", entry.id());
		return ActionOutcome::Performed(action);
	}

	if policy.alternative == Action::PerformAutoType {
		warn!("{action} failed on entry '{}'", entry.id());
		return ActionOutcome::Failed(action);
	}
	warn!(
		"{action} failed on entry '{}', falling back to {}",
		entry.id(),
		policy.alternative
	);
	dispatch(host, policy.alternative, entry, collection);
	ActionOutcome::FellBack {
		failed: action,
		performed: policy.alternative,
	}
}

fn dispatch(
	host: &mut dyn ActionHost,
	action: Action,
	entry: &Entry,
	collection: &Collection,
) -> bool {
	match action {
		Action::PerformAutoType => return host.auto_type(entry, collection),
		Action::EditEntry => host.edit_entry(entry, collection),
		Action::ShowEntry => host.show_entry(entry, collection),
		Action::OpenEntryUrl => host.open_url(entry, collection),
		Action::CopyPassword => host.copy_password(entry, collection),
	}
	true
}
