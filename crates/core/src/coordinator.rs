//! Term-keyed registry of result streams.
//!
//! The coordinator is the entry point for typed input. Each distinct term gets
//! exactly one stream. A term extending a registered one is answered by
//! narrowing that stream instead of scanning the whole catalog again.

use std::sync::Arc;

use ats_stream::{Cursor, Poll, ResultStream};
use indexmap::IndexMap;
use log::{debug, trace};
use parking_lot::Mutex;

use crate::error::SearchError;
use crate::matcher::{MatchEngine, MatchRecord};
use crate::model::Catalog;
use crate::options::SearchOptions;
use crate::resolve::{FieldReferenceResolver, PlaceholderResolver};
use crate::scan::{SharedStream, spawn_narrowing_scan, spawn_root_scan};

/// Shortest term, in characters, that starts a search.
pub const MIN_TERM_CHARS: usize = 2;

/// Number of streams kept registered by default.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 64;

/// Streams ordered from least to most recently used.
struct Registry {
	streams: IndexMap<String, SharedStream>,
	capacity: usize,
}

impl Registry {
	fn touch(&mut self, term: &str) -> Option<SharedStream> {
		let stream = self.streams.shift_remove(term)?;
		self.streams.insert(term.to_owned(), Arc::clone(&stream));
		Some(stream)
	}

	fn get(&self, term: &str) -> Option<SharedStream> {
		self.streams.get(term).cloned()
	}

	fn insert(&mut self, stream: SharedStream) {
		self.streams.insert(stream.term().to_owned(), stream);
		while self.streams.len() > self.capacity {
			if let Some((term, _)) = self.streams.shift_remove_index(0) {
				trace!("evicted result stream for {term:?}");
			}
		}
	}
}

/// Hands out one result stream per term, reusing prefix results.
pub struct SearchCoordinator {
	catalog: Arc<Catalog>,
	options: SearchOptions,
	resolver: Arc<dyn PlaceholderResolver>,
	registry: Mutex<Registry>,
}

impl SearchCoordinator {
	/// Coordinator over `catalog` with default options and the field
	/// reference resolver.
	#[must_use]
	pub fn new(catalog: Catalog) -> Self {
		Self {
			catalog: Arc::new(catalog),
			options: SearchOptions::default(),
			resolver: Arc::new(FieldReferenceResolver),
			registry: Mutex::new(Registry {
				streams: IndexMap::new(),
				capacity: DEFAULT_REGISTRY_CAPACITY,
			}),
		}
	}

	#[must_use]
	pub fn with_options(mut self, options: SearchOptions) -> Self {
		self.options = options;
		self
	}

	#[must_use]
	pub fn with_resolver(mut self, resolver: Arc<dyn PlaceholderResolver>) -> Self {
		self.resolver = resolver;
		self
	}

	/// Bound the number of registered streams. At least one is always kept.
	#[must_use]
	pub fn with_registry_capacity(self, capacity: usize) -> Self {
		self.registry.lock().capacity = capacity.max(1);
		self
	}

	#[must_use]
	pub fn catalog(&self) -> &Arc<Catalog> {
		&self.catalog
	}

	#[must_use]
	pub fn options(&self) -> &SearchOptions {
		&self.options
	}

	/// Return the stream for `term`, starting a search if none is registered.
	///
	/// The call never blocks on matching. If a stream for a shorter prefix of
	/// `term` is registered, the longest such prefix is forked and narrowed;
	/// otherwise the whole catalog is scanned. Repeated calls with the same
	/// term return the same stream.
	///
	/// # Errors
	///
	/// Returns [`SearchError::InvalidArgument`] when `term` is shorter than
	/// [`MIN_TERM_CHARS`] characters, and [`SearchError::Spawn`] when no
	/// worker thread could be started.
	pub fn search(&self, term: &str) -> Result<SharedStream, SearchError> {
		let length = term.chars().count();
		if length < MIN_TERM_CHARS {
			return Err(SearchError::InvalidArgument {
				min: MIN_TERM_CHARS,
				actual: length,
			});
		}

		let mut registry = self.registry.lock();
		if let Some(existing) = registry.touch(term) {
			trace!("reusing result stream for {term:?}");
			return Ok(existing);
		}

		let engine = MatchEngine::new(term, self.options, Arc::clone(&self.resolver));
		let stream = match longest_registered_prefix(&registry, term) {
			Some(parent) => {
				let child: SharedStream = Arc::new(parent.fork(term));
				debug!(
					"narrowing {:?} into {term:?} (capacity {})",
					parent.term(),
					child.capacity()
				);
				spawn_narrowing_scan(parent, Arc::clone(&child), engine)?;
				child
			}
			None => {
				let stream: SharedStream =
					Arc::new(ResultStream::new(term, self.catalog.entry_count()));
				debug!("scanning catalog for {term:?}");
				spawn_root_scan(Arc::clone(&self.catalog), Arc::clone(&stream), engine)?;
				stream
			}
		};
		registry.insert(Arc::clone(&stream));
		Ok(stream)
	}

	/// Records committed to `stream` since `cursor`, without blocking.
	pub fn poll(
		&self,
		stream: &ResultStream<MatchRecord>,
		cursor: &mut Cursor,
	) -> Poll<MatchRecord> {
		stream.poll(cursor)
	}

	/// The registered stream for exactly `term`, if any.
	#[must_use]
	pub fn cached(&self, term: &str) -> Option<SharedStream> {
		self.registry.lock().get(term)
	}

	/// Drop the registration for `term`.
	///
	/// Readers still holding the stream keep it alive. Once none do, its
	/// worker stops at the next candidate.
	pub fn forget(&self, term: &str) -> bool {
		self.registry.lock().streams.shift_remove(term).is_some()
	}

	/// Drop every registration.
	pub fn clear(&self) {
		self.registry.lock().streams.clear();
	}

	/// Registered terms from least to most recently used.
	#[must_use]
	pub fn registered_terms(&self) -> Vec<String> {
		self.registry.lock().streams.keys().cloned().collect()
	}
}

impl std::fmt::Debug for SearchCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SearchCoordinator")
			.field("collections", &self.catalog.collections().len())
			.field("options", &self.options)
			.field("registered", &self.registered_terms())
			.finish_non_exhaustive()
	}
}

/// Longest registered proper prefix of `term` that still starts a search.
fn longest_registered_prefix(registry: &Registry, term: &str) -> Option<SharedStream> {
	let mut prefix = term;
	loop {
		let (cut, _) = prefix.char_indices().next_back()?;
		prefix = &prefix[..cut];
		if prefix.chars().count() < MIN_TERM_CHARS {
			return None;
		}
		if let Some(stream) = registry.get(prefix) {
			return Some(stream);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Collection, Entry, Group, TITLE_FIELD};

	fn coordinator() -> SearchCoordinator {
		SearchCoordinator::new(Catalog::single(Collection::new(
			"vault",
			Group::new("Root")
				.with_entry(Entry::new("a").with_field(TITLE_FIELD, "Atlas"))
				.with_entry(Entry::new("b").with_field(TITLE_FIELD, "Atom")),
		)))
	}

	#[test]
	fn rejects_short_terms() {
		let err = coordinator().search("a").unwrap_err();
		assert!(matches!(err, SearchError::InvalidArgument { min: 2, actual: 1 }));
		assert!(coordinator().search("").is_err());
		// Length is counted in characters, not bytes.
		assert!(coordinator().search("é").is_err());
	}

	#[test]
	fn same_term_returns_the_same_stream() {
		let coordinator = coordinator();
		let first = coordinator.search("at").unwrap();
		let second = coordinator.search("at").unwrap();
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn extensions_fork_the_longest_registered_prefix() {
		let coordinator = coordinator();
		coordinator.search("at").unwrap();
		coordinator.search("atl").unwrap();
		let child = coordinator.search("atla").unwrap();
		assert_eq!(child.origin(), Some("atl"));

		let fresh = coordinator.search("mo").unwrap();
		assert_eq!(fresh.origin(), None);
		assert_eq!(fresh.capacity(), 2);
	}

	#[test]
	fn registry_evicts_least_recently_used() {
		let coordinator = coordinator().with_registry_capacity(2);
		coordinator.search("at").unwrap();
		coordinator.search("to").unwrap();
		coordinator.search("at").unwrap();
		coordinator.search("om").unwrap();
		assert_eq!(coordinator.registered_terms(), ["at", "om"]);
		assert!(coordinator.cached("to").is_none());
	}

	#[test]
	fn forget_and_clear_drop_registrations() {
		let coordinator = coordinator();
		let kept = coordinator.search("at").unwrap();
		assert!(coordinator.forget("at"));
		assert!(!coordinator.forget("at"));
		let again = coordinator.search("at").unwrap();
		assert!(!Arc::ptr_eq(&kept, &again));

		coordinator.clear();
		assert!(coordinator.registered_terms().is_empty());
	}

	#[test]
	fn polling_reaches_completion() {
		let coordinator = coordinator();
		let stream = coordinator.search("at").unwrap();
		let mut cursor = Cursor::new();
		let mut titles = Vec::new();
		loop {
			let poll = coordinator.poll(&stream, &mut cursor);
			titles.extend(poll.records.iter().map(|hit| hit.title().to_owned()));
			if poll.complete {
				break;
			}
			stream.wait_beyond(cursor.position(), None);
		}
		assert_eq!(titles, ["Atlas", "Atom"]);
	}
}
