//! JSON representation of a collection file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use super::{Collection, Entry, FieldValue, Group, PASSWORD_FIELD};
use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct RawCollection {
	#[serde(default)]
	name: Option<String>,
	root: RawGroup,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
	name: String,
	#[serde(default)]
	enable_searching: Option<bool>,
	#[serde(default)]
	groups: Vec<RawGroup>,
	#[serde(default)]
	entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
	#[serde(default)]
	id: Option<String>,
	#[serde(default)]
	fields: IndexMap<String, RawField>,
	#[serde(default)]
	tags: Vec<String>,
	#[serde(default)]
	expires: Option<DateTime<Utc>>,
	#[serde(default)]
	custom_icon: Option<String>,
}

/// Fields may be written as a bare string or with an explicit protection flag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
	Plain(String),
	Detailed(FieldValue),
}

struct Assembler<'a> {
	collection: &'a str,
	seen: HashSet<String>,
	next_id: usize,
}

impl Assembler<'_> {
	fn group(&mut self, raw: RawGroup) -> Result<Group, StoreError> {
		let mut group = Group::new(raw.name).searching(raw.enable_searching);
		for entry in raw.entries {
			group = group.with_entry(self.entry(entry)?);
		}
		for child in raw.groups {
			group = group.with_group(self.group(child)?);
		}
		Ok(group)
	}

	fn entry(&mut self, raw: RawEntry) -> Result<Entry, StoreError> {
		self.next_id += 1;
		let id = raw.id.unwrap_or_else(|| format!("{}#{}", self.collection, self.next_id));
		if !self.seen.insert(id.clone()) {
			return Err(StoreError::DuplicateEntryId {
				collection: self.collection.to_owned(),
				id,
			});
		}

		let mut entry = Entry::new(id).with_tags(raw.tags);
		for (name, field) in raw.fields {
			entry = match field {
				RawField::Plain(value) if name == PASSWORD_FIELD => {
					entry.with_protected_field(name, value)
				}
				RawField::Plain(value) => entry.with_field(name, value),
				RawField::Detailed(FieldValue {
					value,
					protected: true,
				}) => entry.with_protected_field(name, value),
				RawField::Detailed(FieldValue { value, .. }) => entry.with_field(name, value),
			};
		}
		if let Some(expiry) = raw.expires {
			entry = entry.expiring_at(expiry);
		}
		if let Some(icon) = raw.custom_icon {
			entry = entry.with_custom_icon(icon);
		}
		Ok(entry)
	}
}

impl Collection {
	/// Parse a collection from its JSON text.
	///
	/// `fallback_name` names the collection when the document does not, and is
	/// used in error messages.
	///
	/// # Errors
	///
	/// Returns [`StoreError::Parse`] for malformed JSON and
	/// [`StoreError::DuplicateEntryId`] when two entries share an id.
	pub fn from_json(fallback_name: &str, text: &str) -> Result<Self, StoreError> {
		let raw: RawCollection =
			serde_json::from_str(text).map_err(|source| StoreError::Parse {
				name: fallback_name.to_owned(),
				source,
			})?;
		let name = raw.name.unwrap_or_else(|| fallback_name.to_owned());
		let mut assembler = Assembler {
			collection: &name,
			seen: HashSet::new(),
			next_id: 0,
		};
		let root = assembler.group(raw.root)?;
		Ok(Collection::new(name, root))
	}

	/// Read and parse a collection file. The file stem is the fallback name.
	///
	/// # Errors
	///
	/// Returns [`StoreError::Io`] when the file cannot be read, otherwise the
	/// errors of [`Collection::from_json`].
	pub fn load(path: &Path) -> Result<Self, StoreError> {
		let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let fallback = path
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_else(|| "collection".to_owned());
		Self::from_json(&fallback, &text)
	}
}
