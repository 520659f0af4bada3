//! Driver-side view of a result stream.
//!
//! A [`ResultsView`] polls the stream currently on screen, merges new records
//! into its rows, keeps duplicate titles distinguishable and re-sorts the rows
//! into display order after every tick.

mod session;
mod unique;

use std::sync::Arc;

use ats_stream::Cursor;

pub use session::SearchSession;
pub use unique::{GROUP_SEPARATOR, disambiguate_titles};

use crate::matcher::SearchHit;
use crate::ranking::precedence;
use crate::scan::SharedStream;

/// One displayed result.
#[derive(Debug, Clone)]
pub struct ResultRow {
	hit: SearchHit,
	unique_title: String,
	title_depth: usize,
}

impl ResultRow {
	#[must_use]
	pub fn new(hit: SearchHit) -> Self {
		let unique_title = hit.title().to_owned();
		Self {
			hit,
			unique_title,
			title_depth: 0,
		}
	}

	#[must_use]
	pub fn hit(&self) -> &SearchHit {
		&self.hit
	}

	/// Title with enough group names prepended to tell it apart from other
	/// rows sharing the same title.
	#[must_use]
	pub fn unique_title(&self) -> &str {
		&self.unique_title
	}

	/// Number of group names prepended to the title.
	#[must_use]
	pub fn title_depth(&self) -> usize {
		self.title_depth
	}

	/// Show `depth` ancestor group names, capped at the entry's real depth.
	/// Returns whether the displayed title changed.
	pub(crate) fn set_title_depth(&mut self, depth: usize) -> bool {
		let path = self.hit.entry().group_path();
		let depth = depth.min(path.len());
		if depth == self.title_depth {
			return false;
		}
		self.title_depth = depth;
		let mut title = String::new();
		for group in &path[path.len() - depth..] {
			title.push_str(group);
			title.push_str(GROUP_SEPARATOR);
		}
		title.push_str(self.hit.title());
		self.unique_title = title;
		true
	}
}

/// What a [`ResultsView::tick`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
	/// New records were merged into the rows.
	pub changed: bool,
	/// The stream on display will not produce more records.
	pub complete: bool,
	/// Number of rows after the tick.
	pub total: usize,
}

/// Rows of the stream currently on display.
#[derive(Debug, Default)]
pub struct ResultsView {
	stream: Option<SharedStream>,
	cursor: Cursor,
	rows: Vec<ResultRow>,
	complete: bool,
}

impl ResultsView {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Display `stream`. Rows of a previously shown stream are discarded.
	///
	/// Returns `false` when `stream` was already on display.
	pub fn show(&mut self, stream: SharedStream) -> bool {
		if self
			.stream
			.as_ref()
			.is_some_and(|current| Arc::ptr_eq(current, &stream))
		{
			return false;
		}
		self.rows.clear();
		self.cursor = Cursor::new();
		self.complete = false;
		self.stream = Some(stream);
		true
	}

	/// Stop displaying any stream.
	pub fn clear(&mut self) {
		self.stream = None;
		self.cursor = Cursor::new();
		self.rows.clear();
		self.complete = false;
	}

	/// Merge records committed since the previous tick.
	pub fn tick(&mut self) -> TickOutcome {
		let Some(stream) = &self.stream else {
			return TickOutcome {
				changed: false,
				complete: true,
				total: 0,
			};
		};
		let poll = stream.poll(&mut self.cursor);
		self.complete = poll.complete;
		let changed = !poll.records.is_empty();
		if changed {
			self.rows.extend(poll.records.into_iter().map(ResultRow::new));
			disambiguate_titles(&mut self.rows);
			self.rows.sort_by(|a, b| precedence(&a.hit, &b.hit));
		}
		TickOutcome {
			changed,
			complete: self.complete,
			total: self.rows.len(),
		}
	}

	#[must_use]
	pub fn stream(&self) -> Option<&SharedStream> {
		self.stream.as_ref()
	}

	#[must_use]
	pub fn cursor(&self) -> Cursor {
		self.cursor
	}

	#[must_use]
	pub fn rows(&self) -> &[ResultRow] {
		&self.rows
	}

	/// The highest ranked row, the one an accept keystroke acts on.
	#[must_use]
	pub fn top(&self) -> Option<&ResultRow> {
		self.rows.first()
	}

	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.stream.is_none() || self.complete
	}
}

#[cfg(test)]
mod tests {
	use ats_stream::ResultStream;

	use super::*;
	use crate::fold::Span;
	use crate::matcher::{FieldId, MatchRecord};
	use crate::model::{Collection, Entry, Group, TITLE_FIELD};

	fn collection() -> Arc<Collection> {
		Arc::new(Collection::new(
			"vault",
			Group::new("Root")
				.with_entry(Entry::new("home-mail").with_field(TITLE_FIELD, "Mail"))
				.with_group(
					Group::new("Work")
						.with_entry(Entry::new("work-mail").with_field(TITLE_FIELD, "Mail"))
						.with_group(
							Group::new("Archive")
								.with_entry(Entry::new("old-mail").with_field(TITLE_FIELD, "Mail")),
						),
				)
				.with_group(
					Group::new("Home")
						.with_group(
							Group::new("Archive")
								.with_entry(Entry::new("home-old").with_field(TITLE_FIELD, "Mail")),
						)
						.with_entry(Entry::new("bank").with_field(TITLE_FIELD, "Bank")),
				),
		))
	}

	fn record(collection: &Arc<Collection>, id: &str, start: usize) -> MatchRecord {
		let entry = collection.find_entry(|entry| entry.id() == id).unwrap();
		MatchRecord::new(
			Arc::clone(entry),
			Arc::clone(collection),
			FieldId::Title,
			Arc::from(entry.title()),
			Span { start, length: 1 },
		)
	}

	fn titles(view: &ResultsView) -> Vec<&str> {
		view.rows().iter().map(ResultRow::unique_title).collect()
	}

	#[test]
	fn tick_merges_and_sorts() {
		let collection = collection();
		let stream: SharedStream = Arc::new(ResultStream::new("a", 4));
		let mut view = ResultsView::new();
		assert!(view.show(Arc::clone(&stream)));

		stream.append(record(&collection, "bank", 1));
		let first = view.tick();
		assert_eq!(
			first,
			TickOutcome {
				changed: true,
				complete: false,
				total: 1
			}
		);

		stream.append(record(&collection, "work-mail", 0));
		stream.set_complete();
		let second = view.tick();
		assert!(second.changed && second.complete);
		assert_eq!(view.top().unwrap().hit().entry().id(), "work-mail");

		let idle = view.tick();
		assert!(!idle.changed);
		assert!(idle.complete);
	}

	#[test]
	fn showing_a_new_stream_discards_rows() {
		let collection = collection();
		let first: SharedStream = Arc::new(ResultStream::new("ma", 1));
		first.append(record(&collection, "bank", 0));
		let mut view = ResultsView::new();
		view.show(Arc::clone(&first));
		view.tick();
		assert_eq!(view.rows().len(), 1);

		assert!(!view.show(Arc::clone(&first)));
		assert_eq!(view.rows().len(), 1);

		view.show(Arc::new(ResultStream::new("mai", 1)));
		assert!(view.rows().is_empty());
		assert!(!view.is_complete());

		view.clear();
		assert!(view.is_complete());
		assert!(!view.tick().changed);
	}

	#[test]
	fn duplicate_titles_gain_group_names() {
		let collection = collection();
		let stream: SharedStream = Arc::new(ResultStream::new("ma", 4));
		for id in ["home-mail", "work-mail", "old-mail", "home-old", "bank"] {
			stream.append(record(&collection, id, 0));
		}
		let mut view = ResultsView::new();
		view.show(stream);
		view.tick();
		assert_eq!(
			titles(&view),
			[
				"Root / Mail",
				"Work / Mail",
				"Work / Archive / Mail",
				"Home / Archive / Mail",
				"Bank",
			]
		);
		assert_eq!(view.rows()[2].title_depth(), 2);
		assert_eq!(view.rows()[4].title_depth(), 0);
	}
}
