//! Background producers that fill result streams.
//!
//! A root scan walks every searchable entry of the catalog. A narrowing scan
//! reads the records of a stream for a shorter prefix and re-checks each of
//! them against the longer term. Both stop early once nobody but the worker
//! itself still holds the stream they are filling.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;

use ats_stream::{CompletionGuard, ResultStream};
use chrono::{DateTime, Utc};
use log::debug;

use crate::error::SearchError;
use crate::matcher::{MatchEngine, MatchRecord};
use crate::model::{Catalog, Collection, Group};

/// A result stream shared between its producer, the registry and readers.
pub type SharedStream = Arc<ResultStream<MatchRecord>>;

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
	/// Every candidate was examined.
	Completed { matched: usize },
	/// The scan stopped early because its stream was no longer wanted.
	Abandoned { matched: usize },
}

impl ScanOutcome {
	#[must_use]
	pub fn matched(self) -> usize {
		match self {
			Self::Completed { matched } | Self::Abandoned { matched } => matched,
		}
	}
}

struct RootScan<'a, F> {
	stream: &'a ResultStream<MatchRecord>,
	engine: &'a MatchEngine,
	should_abort: F,
	now: DateTime<Utc>,
	matched: usize,
}

impl<F: Fn() -> bool> RootScan<'_, F> {
	fn visit_group(
		&mut self,
		group: &Group,
		collection: &Arc<Collection>,
		inherited: bool,
	) -> ControlFlow<()> {
		let enabled = group.searching_enabled(inherited);
		if !enabled {
			return ControlFlow::Continue(());
		}

		for child in group.groups() {
			self.visit_group(child, collection, enabled)?;
		}
		for entry in group.entries() {
			if (self.should_abort)() {
				return ControlFlow::Break(());
			}
			if self.engine.options().exclude_expired && entry.is_expired_at(self.now) {
				continue;
			}
			if let Some(record) = self.engine.match_entry(entry, collection) {
				self.stream.append(record);
				self.matched += 1;
			}
		}
		ControlFlow::Continue(())
	}
}

/// Match every searchable entry of `catalog` into `stream`.
///
/// Collections are visited in catalog order; within a collection the entries
/// of a group's subgroups come before the group's own entries. Groups with
/// searching disabled are skipped together with their descendants. The stream
/// is completed when the scan returns, whatever the outcome.
pub fn root_scan(
	catalog: &Catalog,
	stream: &ResultStream<MatchRecord>,
	engine: &MatchEngine,
	should_abort: impl Fn() -> bool,
) -> ScanOutcome {
	let _guard = CompletionGuard::new(stream);
	let mut scan = RootScan {
		stream,
		engine,
		should_abort,
		now: Utc::now(),
		matched: 0,
	};
	for collection in catalog.collections() {
		if scan.visit_group(collection.root(), collection, true).is_break() {
			return ScanOutcome::Abandoned {
				matched: scan.matched,
			};
		}
	}
	ScanOutcome::Completed {
		matched: scan.matched,
	}
}

/// Narrow the records of `parent` into `child`.
///
/// Records are consumed in the parent's sequence order, blocking while the
/// parent is still being filled, so the child preserves the parent's relative
/// order. The child is completed when the scan returns.
pub fn narrowing_scan(
	parent: &ResultStream<MatchRecord>,
	child: &ResultStream<MatchRecord>,
	engine: &MatchEngine,
	should_abort: impl Fn() -> bool,
) -> ScanOutcome {
	let _guard = CompletionGuard::new(child);
	let mut matched = 0;
	for hit in parent.drain() {
		if should_abort() {
			return ScanOutcome::Abandoned { matched };
		}
		if let Some(record) = engine.narrow(&hit) {
			child.append(record);
			matched += 1;
		}
	}
	ScanOutcome::Completed { matched }
}

/// Start a root scan for `stream` on a worker thread.
pub(crate) fn spawn_root_scan(
	catalog: Arc<Catalog>,
	stream: SharedStream,
	engine: MatchEngine,
) -> Result<(), SearchError> {
	let term = stream.term().to_owned();
	thread::Builder::new()
		.name(format!("ats-root:{term}"))
		.spawn(move || {
			let outcome = root_scan(&catalog, &stream, &engine, || abandoned(&stream));
			debug!("root scan for {:?} finished: {outcome:?}", stream.term());
		})
		.map(drop)
		.map_err(|source| SearchError::Spawn { term, source })
}

/// Start narrowing `parent` into `child` on a worker thread.
pub(crate) fn spawn_narrowing_scan(
	parent: SharedStream,
	child: SharedStream,
	engine: MatchEngine,
) -> Result<(), SearchError> {
	let term = child.term().to_owned();
	thread::Builder::new()
		.name(format!("ats-narrow:{term}"))
		.spawn(move || {
			let outcome = narrowing_scan(&parent, &child, &engine, || abandoned(&child));
			debug!(
				"narrowing {:?} into {:?} finished: {outcome:?}",
				parent.term(),
				child.term()
			);
		})
		.map(drop)
		.map_err(|source| SearchError::Spawn { term, source })
}

/// Whether the worker holds the only remaining handle to its stream.
fn abandoned(stream: &SharedStream) -> bool {
	Arc::strong_count(stream) == 1
}
