use ats_core::ActionHost;
use ats_core::model::{Collection, Entry, PASSWORD_FIELD, URL_FIELD, USER_NAME_FIELD};

/// Action host for a terminal: describes what each action would do instead
/// of driving another application.
#[derive(Debug, Default)]
pub(crate) struct ConsoleHost {
	messages: Vec<String>,
}

impl ConsoleHost {
	/// Descriptions recorded since the last call.
	pub(crate) fn take_messages(&mut self) -> Vec<String> {
		std::mem::take(&mut self.messages)
	}

	fn record(&mut self, message: String) {
		self.messages.push(message);
	}
}

fn label(entry: &Entry, collection: &Collection) -> String {
	format!("'{}' in {}", entry.title(), collection.name())
}

impl ActionHost for ConsoleHost {
	/// Succeeds when the entry has a user name or password to type.
	fn auto_type(&mut self, entry: &Entry, collection: &Collection) -> bool {
		let user_name = entry.field(USER_NAME_FIELD);
		let has_password = !entry.field(PASSWORD_FIELD).is_empty();
		if user_name.is_empty() && !has_password {
			self.record(format!(
				"auto-type: nothing to type for {}",
				label(entry, collection)
			));
			return false;
		}
		let mut sequence = Vec::new();
		if !user_name.is_empty() {
			sequence.push(format!("'{user_name}'"));
		}
		if has_password {
			sequence.push("<password>".to_owned());
		}
		self.record(format!(
			"auto-type: would type {} for {}",
			sequence.join(" {TAB} "),
			label(entry, collection)
		));
		true
	}

	fn edit_entry(&mut self, entry: &Entry, collection: &Collection) {
		self.record(format!("edit: would open {}", label(entry, collection)));
	}

	fn show_entry(&mut self, entry: &Entry, collection: &Collection) {
		let path: Vec<&str> = entry.group_path().iter().map(AsRef::as_ref).collect();
		self.record(format!(
			"show: {} located at {}",
			label(entry, collection),
			path.join(" / ")
		));
	}

	fn open_url(&mut self, entry: &Entry, collection: &Collection) {
		let url = entry.field(URL_FIELD);
		if url.is_empty() {
			self.record(format!("open-url: {} has no URL", label(entry, collection)));
		} else {
			self.record(format!("open-url: would open {url}"));
		}
	}

	fn copy_password(&mut self, entry: &Entry, collection: &Collection) {
		self.record(format!(
			"copy-password: would copy the password of {}",
			label(entry, collection)
		));
	}
}
