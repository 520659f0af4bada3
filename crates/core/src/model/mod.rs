//! In-memory record store searched by the engine.
//!
//! A [`Catalog`] holds one or more [`Collection`]s, each a tree of [`Group`]s
//! containing [`Entry`] records. Entries are shared through [`Arc`] so match
//! records can point back at them without copying field data.

mod raw;

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const TITLE_FIELD: &str = "Title";
pub const USER_NAME_FIELD: &str = "UserName";
pub const PASSWORD_FIELD: &str = "Password";
pub const URL_FIELD: &str = "URL";
pub const NOTES_FIELD: &str = "Notes";

/// Separator used when tags are joined for display and searching.
pub const TAG_SEPARATOR: &str = ", ";

/// Whether `name` is one of the five standard entry fields.
#[must_use]
pub fn is_standard_field(name: &str) -> bool {
	matches!(
		name,
		TITLE_FIELD | USER_NAME_FIELD | PASSWORD_FIELD | URL_FIELD | NOTES_FIELD
	)
}

/// A single stored field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
	pub value: String,
	#[serde(default)]
	pub protected: bool,
}

impl FieldValue {
	#[must_use]
	pub fn plain(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			protected: false,
		}
	}

	#[must_use]
	pub fn protected(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			protected: true,
		}
	}
}

/// A searchable record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
	id: String,
	fields: IndexMap<String, FieldValue>,
	tags: Vec<String>,
	expires: Option<DateTime<Utc>>,
	custom_icon: Option<String>,
	group_path: Vec<Arc<str>>,
}

impl Entry {
	#[must_use]
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			fields: IndexMap::new(),
			tags: Vec::new(),
			expires: None,
			custom_icon: None,
			group_path: Vec::new(),
		}
	}

	/// Add or replace an unprotected field. The password field is always
	/// stored protected.
	#[must_use]
	pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let name = name.into();
		let value = if name == PASSWORD_FIELD {
			FieldValue::protected(value)
		} else {
			FieldValue::plain(value)
		};
		self.fields.insert(name, value);
		self
	}

	#[must_use]
	pub fn with_protected_field(
		mut self,
		name: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.fields.insert(name.into(), FieldValue::protected(value));
		self
	}

	#[must_use]
	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn expiring_at(mut self, when: DateTime<Utc>) -> Self {
		self.expires = Some(when);
		self
	}

	#[must_use]
	pub fn with_custom_icon(mut self, icon: impl Into<String>) -> Self {
		self.custom_icon = Some(icon.into());
		self
	}

	#[must_use]
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Raw text of the named field, or an empty string when it is absent.
	#[must_use]
	pub fn field(&self, name: &str) -> &str {
		self.fields.get(name).map_or("", |field| field.value.as_str())
	}

	#[must_use]
	pub fn field_value(&self, name: &str) -> Option<&FieldValue> {
		self.fields.get(name)
	}

	/// Every stored field in its native order.
	pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.fields.iter().map(|(name, value)| (name.as_str(), value))
	}

	#[must_use]
	pub fn title(&self) -> &str {
		self.field(TITLE_FIELD)
	}

	#[must_use]
	pub fn tags(&self) -> &[String] {
		&self.tags
	}

	/// Tags joined into the single string searched as the tags pseudo-field.
	#[must_use]
	pub fn tags_display(&self) -> Cow<'_, str> {
		match self.tags.as_slice() {
			[] => Cow::Borrowed(""),
			[single] => Cow::Borrowed(single.as_str()),
			tags => Cow::Owned(tags.join(TAG_SEPARATOR)),
		}
	}

	#[must_use]
	pub fn expires(&self) -> Option<DateTime<Utc>> {
		self.expires
	}

	/// Whether the entry has an expiry time earlier than `now`.
	#[must_use]
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires.is_some_and(|expiry| now > expiry)
	}

	#[must_use]
	pub fn custom_icon(&self) -> Option<&str> {
		self.custom_icon.as_deref()
	}

	/// Names of the groups containing this entry, outermost first.
	#[must_use]
	pub fn group_path(&self) -> &[Arc<str>] {
		&self.group_path
	}

	/// Name of the group directly containing this entry.
	#[must_use]
	pub fn parent_group(&self) -> Option<&str> {
		self.group_path.last().map(AsRef::as_ref)
	}
}

/// A node of the collection tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
	name: String,
	enable_searching: Option<bool>,
	groups: Vec<Group>,
	entries: Vec<Arc<Entry>>,
}

impl Group {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			enable_searching: None,
			groups: Vec::new(),
			entries: Vec::new(),
		}
	}

	/// Set the searching flag. `None` inherits the parent group's setting.
	#[must_use]
	pub fn searching(mut self, enabled: Option<bool>) -> Self {
		self.enable_searching = enabled;
		self
	}

	#[must_use]
	pub fn with_entry(mut self, entry: Entry) -> Self {
		self.entries.push(Arc::new(entry));
		self
	}

	#[must_use]
	pub fn with_group(mut self, group: Group) -> Self {
		self.groups.push(group);
		self
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn enable_searching(&self) -> Option<bool> {
		self.enable_searching
	}

	/// Effective searching flag given the flag inherited from the parent.
	#[must_use]
	pub fn searching_enabled(&self, inherited: bool) -> bool {
		self.enable_searching.unwrap_or(inherited)
	}

	#[must_use]
	pub fn groups(&self) -> &[Group] {
		&self.groups
	}

	#[must_use]
	pub fn entries(&self) -> &[Arc<Entry>] {
		&self.entries
	}

	/// Number of entries in this group and all of its descendants.
	#[must_use]
	pub fn entry_count(&self) -> usize {
		self.entries.len() + self.groups.iter().map(Group::entry_count).sum::<usize>()
	}

	fn assign_paths(&mut self, parent: &[Arc<str>]) {
		let mut path = parent.to_vec();
		path.push(Arc::from(self.name.as_str()));
		for entry in &mut self.entries {
			Arc::make_mut(entry).group_path.clone_from(&path);
		}
		for group in &mut self.groups {
			group.assign_paths(&path);
		}
	}
}

/// A named tree of groups and entries, such as one open database.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
	name: String,
	root: Group,
}

impl Collection {
	/// Build a collection, recording every entry's ancestor group names.
	#[must_use]
	pub fn new(name: impl Into<String>, mut root: Group) -> Self {
		root.assign_paths(&[]);
		Self {
			name: name.into(),
			root,
		}
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn root(&self) -> &Group {
		&self.root
	}

	#[must_use]
	pub fn entry_count(&self) -> usize {
		self.root.entry_count()
	}

	/// Every entry in scan order, ignoring searching flags: a group's
	/// subgroups are walked before its own entries.
	pub fn entries(&self) -> Entries<'_> {
		Entries {
			pending: vec![Visit::Expand(&self.root)],
			current: std::slice::Iter::default(),
		}
	}

	/// First entry in traversal order satisfying `predicate`.
	pub fn find_entry(&self, mut predicate: impl FnMut(&Entry) -> bool) -> Option<&Arc<Entry>> {
		self.entries().find(|entry| predicate(entry))
	}
}

/// Iterator returned by [`Collection::entries`].
pub struct Entries<'a> {
	pending: Vec<Visit<'a>>,
	current: std::slice::Iter<'a, Arc<Entry>>,
}

enum Visit<'a> {
	/// Queue the group's subgroups, then its entries.
	Expand(&'a Group),
	Entries(&'a Group),
}

impl<'a> Iterator for Entries<'a> {
	type Item = &'a Arc<Entry>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(entry) = self.current.next() {
				return Some(entry);
			}
			match self.pending.pop()? {
				Visit::Expand(group) => {
					self.pending.push(Visit::Entries(group));
					self.pending.extend(group.groups.iter().rev().map(Visit::Expand));
				}
				Visit::Entries(group) => self.current = group.entries.iter(),
			}
		}
	}
}

/// Ordered set of collections searched together.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	collections: Vec<Arc<Collection>>,
}

impl Catalog {
	#[must_use]
	pub fn new(collections: Vec<Collection>) -> Self {
		Self {
			collections: collections.into_iter().map(Arc::new).collect(),
		}
	}

	#[must_use]
	pub fn single(collection: Collection) -> Self {
		Self::new(vec![collection])
	}

	pub fn push(&mut self, collection: Collection) {
		self.collections.push(Arc::new(collection));
	}

	#[must_use]
	pub fn collections(&self) -> &[Arc<Collection>] {
		&self.collections
	}

	/// Total number of entries across every collection.
	#[must_use]
	pub fn entry_count(&self) -> usize {
		self.collections.iter().map(|c| c.entry_count()).sum()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.collections.is_empty()
	}
}
