//! Per-entry match predicate.
//!
//! [`MatchEngine`] decides whether one entry contains a term and in which
//! field. It is pure and synchronous: the scan workers own the traversal and
//! the engine only looks at the entry it is handed.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use ats_stream::Sequenced;
use log::warn;

use crate::fold::{self, Folded, Span};
use crate::model::{
	Collection, Entry, NOTES_FIELD, PASSWORD_FIELD, TITLE_FIELD, URL_FIELD, USER_NAME_FIELD,
	is_standard_field,
};
use crate::options::SearchOptions;
use crate::resolve::PlaceholderResolver;

/// The field a match was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldId {
	Title,
	UserName,
	Password,
	Url,
	Notes,
	/// A non-standard field, by name.
	Custom(Arc<str>),
	/// The entry's tags joined into one string.
	Tags,
}

impl FieldId {
	/// Map a stored field name onto its identifier.
	#[must_use]
	pub fn from_name(name: &str) -> Self {
		match name {
			TITLE_FIELD => Self::Title,
			USER_NAME_FIELD => Self::UserName,
			PASSWORD_FIELD => Self::Password,
			URL_FIELD => Self::Url,
			NOTES_FIELD => Self::Notes,
			other => Self::Custom(Arc::from(other)),
		}
	}

	/// Name of the stored field, or `None` for the tags pseudo-field.
	#[must_use]
	pub fn storage_name(&self) -> Option<&str> {
		match self {
			Self::Title => Some(TITLE_FIELD),
			Self::UserName => Some(USER_NAME_FIELD),
			Self::Password => Some(PASSWORD_FIELD),
			Self::Url => Some(URL_FIELD),
			Self::Notes => Some(NOTES_FIELD),
			Self::Custom(name) => Some(name),
			Self::Tags => None,
		}
	}

	/// Human readable label for result lists.
	#[must_use]
	pub fn display_name(&self) -> &str {
		match self {
			Self::Title => "Title",
			Self::UserName => "User Name",
			Self::Password => "Password",
			Self::Url => "URL",
			Self::Notes => "Notes",
			Self::Custom(name) => name,
			Self::Tags => "Tags",
		}
	}

	#[must_use]
	pub fn is_title(&self) -> bool {
		matches!(self, Self::Title)
	}
}

impl fmt::Display for FieldId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.display_name())
	}
}

/// One match of a term inside one field of one entry.
///
/// Records are immutable. The field value is a snapshot, possibly with
/// placeholders expanded, and the span is measured in code points of it.
#[derive(Debug, Clone)]
pub struct MatchRecord {
	entry: Arc<Entry>,
	collection: Arc<Collection>,
	field: FieldId,
	value: Arc<str>,
	start: usize,
	length: usize,
	resolved: bool,
}

/// A match record stamped with its discovery position in a stream.
pub type SearchHit = Sequenced<MatchRecord>;

impl MatchRecord {
	/// Build a record, checking the span against the value.
	///
	/// # Panics
	///
	/// Panics in debug builds when the span does not fit the value, or when a
	/// zero-length span does not start at zero.
	#[must_use]
	pub fn new(
		entry: Arc<Entry>,
		collection: Arc<Collection>,
		field: FieldId,
		value: Arc<str>,
		span: Span,
	) -> Self {
		debug_assert!(
			span.length > 0 || span.start == 0,
			"zero-length match must start at zero"
		);
		debug_assert!(
			span.start + span.length <= value.chars().count(),
			"match span exceeds field value"
		);
		Self {
			entry,
			collection,
			field,
			value,
			start: span.start,
			length: span.length,
			resolved: false,
		}
	}

	fn resolved(mut self) -> Self {
		self.resolved = true;
		self
	}

	/// Same entry, field and value with a different span.
	#[must_use]
	pub fn with_span(&self, span: Span) -> Self {
		Self::new(
			Arc::clone(&self.entry),
			Arc::clone(&self.collection),
			self.field.clone(),
			Arc::clone(&self.value),
			span,
		)
		.with_resolved(self.resolved)
	}

	fn with_resolved(mut self, resolved: bool) -> Self {
		self.resolved = resolved;
		self
	}

	#[must_use]
	pub fn entry(&self) -> &Arc<Entry> {
		&self.entry
	}

	#[must_use]
	pub fn collection(&self) -> &Arc<Collection> {
		&self.collection
	}

	#[must_use]
	pub fn field(&self) -> &FieldId {
		&self.field
	}

	#[must_use]
	pub fn value(&self) -> &str {
		&self.value
	}

	#[must_use]
	pub fn start(&self) -> usize {
		self.start
	}

	#[must_use]
	pub fn length(&self) -> usize {
		self.length
	}

	#[must_use]
	pub fn span(&self) -> Span {
		Span {
			start: self.start,
			length: self.length,
		}
	}

	/// Whether the value is a placeholder-expanded variant of the raw field.
	#[must_use]
	pub fn is_resolved(&self) -> bool {
		self.resolved
	}

	/// Title of the owning entry.
	#[must_use]
	pub fn title(&self) -> &str {
		self.entry.title()
	}

	/// The value split around the matched span, for highlighting.
	#[must_use]
	pub fn highlight(&self) -> (&str, &str, &str) {
		let byte_at = |chars: usize| {
			self.value
				.char_indices()
				.nth(chars)
				.map_or(self.value.len(), |(offset, _)| offset)
		};
		let begin = byte_at(self.start);
		let end = byte_at(self.start + self.length);
		(
			&self.value[..begin],
			&self.value[begin..end],
			&self.value[end..],
		)
	}
}

/// Decides whether entries contain a term.
#[derive(Clone)]
pub struct MatchEngine {
	term: String,
	needle: Vec<char>,
	term_chars: usize,
	options: SearchOptions,
	resolver: Arc<dyn PlaceholderResolver>,
}

impl MatchEngine {
	#[must_use]
	pub fn new(
		term: impl Into<String>,
		options: SearchOptions,
		resolver: Arc<dyn PlaceholderResolver>,
	) -> Self {
		let term = term.into();
		let needle = Folded::new(&term, options.case_sensitive).chars().to_vec();
		let term_chars = term.chars().count();
		Self {
			term,
			needle,
			term_chars,
			options,
			resolver,
		}
	}

	#[must_use]
	pub fn term(&self) -> &str {
		&self.term
	}

	#[must_use]
	pub fn options(&self) -> &SearchOptions {
		&self.options
	}

	/// Locate the term in `value`.
	#[must_use]
	pub fn find_in(&self, value: &str) -> Option<Span> {
		if value.is_empty() {
			return None;
		}
		let folded = Folded::new(value, self.options.case_sensitive);
		if folded.is_empty() {
			return None;
		}
		folded.find(&self.needle)
	}

	/// Fields to try for `entry`, in priority order.
	#[must_use]
	pub fn candidate_fields(&self, entry: &Entry) -> Vec<FieldId> {
		let options = &self.options;
		let mut fields = Vec::new();
		if options.title {
			fields.push(FieldId::Title);
		}
		if options.user_name {
			fields.push(FieldId::UserName);
		}
		if options.url {
			fields.push(FieldId::Url);
		}
		if options.notes {
			fields.push(FieldId::Notes);
		}
		if options.custom_fields {
			fields.extend(
				entry
					.fields()
					.filter(|(name, value)| !value.protected && !is_standard_field(name))
					.map(|(name, _)| FieldId::Custom(Arc::from(name))),
			);
		}
		if options.tags {
			fields.push(FieldId::Tags);
		}
		fields
	}

	/// Match one entry, producing at most one record.
	///
	/// Fields are tried in priority order and the first hit wins. When no raw
	/// value matches and reference resolution is enabled, the fields holding
	/// placeholders are retried with their expanded values.
	#[must_use]
	pub fn match_entry(
		&self,
		entry: &Arc<Entry>,
		collection: &Arc<Collection>,
	) -> Option<MatchRecord> {
		let fields = self.candidate_fields(entry);
		self.match_raw(&fields, entry, collection).or_else(|| {
			if self.options.resolve_references {
				self.match_resolved(&fields, entry, collection)
			} else {
				None
			}
		})
	}

	fn match_raw(
		&self,
		fields: &[FieldId],
		entry: &Arc<Entry>,
		collection: &Arc<Collection>,
	) -> Option<MatchRecord> {
		fields.iter().find_map(|field| {
			let value = raw_value(entry, field);
			let span = self.find_in(&value)?;
			Some(MatchRecord::new(
				Arc::clone(entry),
				Arc::clone(collection),
				field.clone(),
				Arc::from(value.as_ref()),
				span,
			))
		})
	}

	fn match_resolved(
		&self,
		fields: &[FieldId],
		entry: &Arc<Entry>,
		collection: &Arc<Collection>,
	) -> Option<MatchRecord> {
		fields.iter().find_map(|field| {
			let name = field.storage_name()?;
			let raw = entry.field(name);
			if raw.is_empty() || !self.resolver.contains_placeholder(raw) {
				return None;
			}
			let resolved = match self.resolver.resolve(raw, entry, collection) {
				Ok(resolved) => resolved,
				Err(err) => {
					warn!(
						"skipping field '{}' of entry '{}' while searching for {:?}: {err}",
						field,
						entry.id(),
						self.term
					);
					return None;
				}
			};
			if fold::equivalent(&resolved, raw, self.options.case_sensitive) {
				return None;
			}
			let span = self.find_in(&resolved)?;
			Some(
				MatchRecord::new(
					Arc::clone(entry),
					Arc::clone(collection),
					field.clone(),
					Arc::from(resolved),
					span,
				)
				.resolved(),
			)
		})
	}

	/// Re-check a record that matched a shorter prefix of this term.
	///
	/// When the longer term still sits at the record's start offset, the
	/// record is re-anchored without searching. Otherwise only that record's
	/// field value is searched again; other fields of the entry are not.
	#[must_use]
	pub fn narrow(&self, candidate: &MatchRecord) -> Option<MatchRecord> {
		let value = candidate.value();
		if candidate.length() > 0
			&& fold::matches_at(
				value,
				candidate.start(),
				self.term_chars,
				&self.needle,
				self.options.case_sensitive,
			) {
			return Some(candidate.with_span(Span {
				start: candidate.start(),
				length: self.term_chars,
			}));
		}
		let span = self.find_in(value)?;
		Some(candidate.with_span(span))
	}
}

impl fmt::Debug for MatchEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MatchEngine")
			.field("term", &self.term)
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

fn raw_value<'a>(entry: &'a Entry, field: &FieldId) -> Cow<'a, str> {
	match field.storage_name() {
		Some(name) => Cow::Borrowed(entry.field(name)),
		None => entry.tags_display(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Group;
	use crate::resolve::FieldReferenceResolver;

	fn engine(term: &str, options: SearchOptions) -> MatchEngine {
		MatchEngine::new(term, options, Arc::new(FieldReferenceResolver))
	}

	fn single(entry: Entry) -> (Arc<Entry>, Arc<Collection>) {
		let collection = Arc::new(Collection::new("vault", Group::new("Root").with_entry(entry)));
		let entry = Arc::clone(&collection.root().entries()[0]);
		(entry, collection)
	}

	#[test]
	fn first_field_in_priority_order_wins() {
		let (entry, collection) = single(
			Entry::new("x")
				.with_field(NOTES_FIELD, "atlas notes")
				.with_field(TITLE_FIELD, "My Atlas"),
		);
		let record = engine("atlas", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(record.field(), &FieldId::Title);
		assert_eq!(record.span(), Span { start: 3, length: 5 });
		assert_eq!(record.highlight(), ("My ", "Atlas", ""));
	}

	#[test]
	fn disabled_fields_are_not_searched() {
		let (entry, collection) = single(
			Entry::new("x")
				.with_field(TITLE_FIELD, "Mail")
				.with_field(URL_FIELD, "https://atlas.example"),
		);
		assert!(
			engine("atlas", SearchOptions::titles_only())
				.match_entry(&entry, &collection)
				.is_none()
		);
		let record = engine("atlas", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(record.field(), &FieldId::Url);
	}

	#[test]
	fn protected_custom_fields_are_skipped() {
		let (entry, collection) = single(
			Entry::new("x")
				.with_protected_field("Secret", "atlas")
				.with_field("Branch", "atlas north")
				.with_tags(["atlas"]),
		);
		let record = engine("atlas", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(record.field(), &FieldId::Custom(Arc::from("Branch")));
	}

	#[test]
	fn tags_are_searched_last() {
		let (entry, collection) = single(
			Entry::new("x")
				.with_field(TITLE_FIELD, "Mail")
				.with_tags(["work", "atlas"]),
		);
		let record = engine("atlas", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(record.field(), &FieldId::Tags);
		assert_eq!(record.value(), "work, atlas");
		assert_eq!(record.start(), 6);
	}

	#[test]
	fn resolved_values_are_tried_after_raw_values() {
		let collection = Arc::new(Collection::new(
			"vault",
			Group::new("Root")
				.with_entry(Entry::new("bank").with_field(USER_NAME_FIELD, "atlas-user"))
				.with_entry(
					Entry::new("alias")
						.with_field(TITLE_FIELD, "Alias")
						.with_field(USER_NAME_FIELD, "{REF:U@I:bank}"),
				),
		));
		let alias = Arc::clone(&collection.root().entries()[1]);

		let record = engine("atlas", SearchOptions::default())
			.match_entry(&alias, &collection)
			.unwrap();
		assert_eq!(record.field(), &FieldId::UserName);
		assert_eq!(record.value(), "atlas-user");
		assert!(record.is_resolved());

		let without = SearchOptions {
			resolve_references: false,
			..SearchOptions::default()
		};
		assert!(engine("atlas", without).match_entry(&alias, &collection).is_none());
	}

	#[test]
	fn placeholder_text_itself_can_match_raw() {
		let (entry, collection) = single(Entry::new("x").with_field(NOTES_FIELD, "{REF:U@I:bank}"));
		let record = engine("ref", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert!(!record.is_resolved());
		assert_eq!(record.start(), 1);
	}

	#[test]
	fn resolution_failures_skip_the_field() {
		let (entry, collection) = single(
			Entry::new("loop")
				.with_field(TITLE_FIELD, "{REF:T@I:loop}")
				.with_field(NOTES_FIELD, "{TITLE}"),
		);
		assert!(
			engine("zz", SearchOptions::default())
				.match_entry(&entry, &collection)
				.is_none()
		);
	}

	#[test]
	fn narrowing_reanchors_at_the_same_offset() {
		let (entry, collection) = single(Entry::new("x").with_field(TITLE_FIELD, "Bank of Atlas"));
		let parent = engine("at", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(parent.start(), 8);

		let child = engine("atla", SearchOptions::default()).narrow(&parent).unwrap();
		assert_eq!(child.span(), Span { start: 8, length: 4 });
		assert!(Arc::ptr_eq(child.entry(), parent.entry()));
	}

	#[test]
	fn narrowing_falls_back_to_searching_the_same_value() {
		let (entry, collection) = single(Entry::new("x").with_field(TITLE_FIELD, "abx abc"));
		let parent = engine("ab", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(parent.start(), 0);

		let child = engine("abc", SearchOptions::default()).narrow(&parent).unwrap();
		assert_eq!(child.start(), 4);
		assert!(engine("abz", SearchOptions::default()).narrow(&parent).is_none());
	}

	#[test]
	fn narrowing_does_not_rescan_other_fields() {
		let (entry, collection) = single(
			Entry::new("x")
				.with_field(TITLE_FIELD, "atlas")
				.with_field(NOTES_FIELD, "atom"),
		);
		let parent = engine("at", SearchOptions::default())
			.match_entry(&entry, &collection)
			.unwrap();
		assert_eq!(parent.field(), &FieldId::Title);
		assert!(engine("ato", SearchOptions::default()).narrow(&parent).is_none());
	}
}
