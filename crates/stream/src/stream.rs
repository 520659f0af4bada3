use std::time::Duration;

use log::trace;
use parking_lot::{Condvar, Mutex};

use crate::{Drain, Sequenced};

/// Upper bound on the slots reserved up front, whatever the capacity hint says.
const MAX_PREALLOCATION: usize = 4_096;

/// Append-only buffer of records produced by a single search job.
///
/// The stream is identified by the term it was created for. Exactly one
/// producer appends records and eventually calls [`set_complete`]; any number
/// of readers observe the committed prefix through [`poll`] or [`drain`].
///
/// [`set_complete`]: ResultStream::set_complete
/// [`poll`]: ResultStream::poll
/// [`drain`]: ResultStream::drain
pub struct ResultStream<T> {
	term: String,
	origin: Option<String>,
	capacity: usize,
	state: Mutex<StreamState<T>>,
	updated: Condvar,
}

struct StreamState<T> {
	records: Vec<Sequenced<T>>,
	complete: bool,
}

/// Per-reader position into a stream's committed records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
	position: usize,
}

impl Cursor {
	/// A cursor positioned before the first record.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of records this cursor has already consumed.
	#[must_use]
	pub fn position(&self) -> usize {
		self.position
	}
}

/// Records returned by a single [`ResultStream::poll`] call.
#[derive(Debug, Clone)]
pub struct Poll<T> {
	/// Records committed since the cursor's previous position, in append order.
	pub records: Vec<Sequenced<T>>,
	/// Whether the producer had finished when the records were read.
	pub complete: bool,
}

/// Committed count and completion flag read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
	pub committed: usize,
	pub complete: bool,
}

impl<T> ResultStream<T> {
	/// Create an empty stream for `term`.
	///
	/// `capacity` is an allocation hint only; the stream grows past it if the
	/// producer appends more records.
	#[must_use]
	pub fn new(term: impl Into<String>, capacity: usize) -> Self {
		Self::with_origin(term.into(), None, capacity)
	}

	fn with_origin(term: String, origin: Option<String>, capacity: usize) -> Self {
		Self {
			term,
			origin,
			capacity,
			state: Mutex::new(StreamState {
				records: Vec::with_capacity(capacity.min(MAX_PREALLOCATION)),
				complete: false,
			}),
			updated: Condvar::new(),
		}
	}

	/// The term this stream collects results for.
	#[must_use]
	pub fn term(&self) -> &str {
		&self.term
	}

	/// Term of the stream this one was forked from, if any.
	#[must_use]
	pub fn origin(&self) -> Option<&str> {
		self.origin.as_deref()
	}

	/// Capacity hint fixed at creation.
	#[must_use]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Append a record and wake blocked readers. Returns its sequence index.
	///
	/// # Panics
	///
	/// Panics if the stream has already been completed. Only the stream's
	/// producer may append, and it must not do so after completing.
	pub fn append(&self, value: T) -> u64 {
		let index = {
			let mut state = self.state.lock();
			assert!(
				!state.complete,
				"result stream for {:?} received a record after completion",
				self.term
			);
			let index = state.records.len() as u64;
			state.records.push(Sequenced::new(index, value));
			index
		};
		self.updated.notify_all();
		index
	}

	/// Mark the stream complete and wake blocked readers.
	///
	/// Completion is a monotonic flag, so repeated calls have no further effect.
	pub fn set_complete(&self) {
		{
			let mut state = self.state.lock();
			if !state.complete {
				trace!(
					"result stream for {:?} completed with {} record(s)",
					self.term,
					state.records.len()
				);
			}
			state.complete = true;
		}
		self.updated.notify_all();
	}

	/// Read the committed count and the completion flag atomically.
	#[must_use]
	pub fn snapshot(&self) -> Snapshot {
		let state = self.state.lock();
		Snapshot {
			committed: state.records.len(),
			complete: state.complete,
		}
	}

	/// Whether the producer has finished.
	#[must_use]
	pub fn is_complete(&self) -> bool {
		self.state.lock().complete
	}

	/// Number of committed records.
	#[must_use]
	pub fn len(&self) -> usize {
		self.state.lock().records.len()
	}

	/// Whether no record has been committed yet.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Capacity for a stream forked from this one.
	///
	/// A completed stream will never hold more than its committed records, so
	/// that count bounds any narrower search; otherwise the original hint does.
	#[must_use]
	pub fn child_capacity(&self) -> usize {
		let state = self.state.lock();
		if state.complete {
			state.records.len()
		} else {
			self.capacity
		}
	}

	/// Create an empty child stream for the narrower `term`.
	///
	/// No records are copied. The child is filled by whichever worker narrows
	/// this stream's records down to the child's term.
	#[must_use]
	pub fn fork(&self, term: impl Into<String>) -> Self {
		Self::with_origin(term.into(), Some(self.term.clone()), self.child_capacity())
	}

	/// Block until more than `position` records are committed or the stream
	/// completes, giving up after `timeout` when one is supplied.
	pub fn wait_beyond(&self, position: usize, timeout: Option<Duration>) -> Snapshot {
		let mut state = self.state.lock();
		while state.records.len() <= position && !state.complete {
			match timeout {
				Some(limit) => {
					if self.updated.wait_for(&mut state, limit).timed_out() {
						break;
					}
				}
				None => self.updated.wait(&mut state),
			}
		}
		Snapshot {
			committed: state.records.len(),
			complete: state.complete,
		}
	}
}

impl<T: Clone> ResultStream<T> {
	/// Return every record committed since `cursor` without blocking.
	///
	/// The cursor is advanced past the returned records. The completion flag is
	/// read under the same lock as the records, so a reader that observes
	/// `complete` has also received everything appended before completion.
	pub fn poll(&self, cursor: &mut Cursor) -> Poll<T> {
		let state = self.state.lock();
		let committed = state.records.len();
		let records = state
			.records
			.get(cursor.position..)
			.map(<[Sequenced<T>]>::to_vec)
			.unwrap_or_default();
		cursor.position = cursor.position.max(committed);
		Poll {
			records,
			complete: state.complete,
		}
	}

	/// Iterate over every record ever appended, blocking while the producer is
	/// still running and nothing new is available.
	pub fn drain(&self) -> Drain<'_, T> {
		Drain::new(self)
	}

	pub(crate) fn take_from(&self, position: usize) -> (Vec<Sequenced<T>>, bool) {
		let mut state = self.state.lock();
		loop {
			if position < state.records.len() {
				return (state.records[position..].to_vec(), state.complete);
			}
			if state.complete {
				return (Vec::new(), true);
			}
			self.updated.wait(&mut state);
		}
	}
}

impl<T> std::fmt::Debug for ResultStream<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let snapshot = self.snapshot();
		f.debug_struct("ResultStream")
			.field("term", &self.term)
			.field("origin", &self.origin)
			.field("capacity", &self.capacity)
			.field("committed", &snapshot.committed)
			.field("complete", &snapshot.complete)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;

	use super::*;

	#[test]
	fn assigns_sequence_indices_in_append_order() {
		let stream = ResultStream::new("ab", 4);
		assert_eq!(stream.append('a'), 0);
		assert_eq!(stream.append('b'), 1);

		let mut cursor = Cursor::new();
		let poll = stream.poll(&mut cursor);
		let indices: Vec<u64> = poll.records.iter().map(Sequenced::index).collect();
		assert_eq!(indices, [0, 1]);
		assert_eq!(*poll.records[1], 'b');
	}

	#[test]
	fn poll_only_returns_new_records() {
		let stream = ResultStream::new("ab", 4);
		let mut cursor = Cursor::new();
		stream.append(1);
		stream.append(2);
		assert_eq!(stream.poll(&mut cursor).records.len(), 2);
		assert_eq!(cursor.position(), 2);

		let empty = stream.poll(&mut cursor);
		assert!(empty.records.is_empty());
		assert!(!empty.complete);

		stream.append(3);
		let next = stream.poll(&mut cursor);
		assert_eq!(next.records.len(), 1);
		assert_eq!(next.records[0].index(), 2);
	}

	#[test]
	fn completion_is_terminal() {
		let stream = ResultStream::<u8>::new("ab", 0);
		let mut cursor = Cursor::new();
		assert!(!stream.poll(&mut cursor).complete);
		stream.set_complete();
		stream.set_complete();
		for _ in 0..3 {
			assert!(stream.poll(&mut cursor).complete);
		}
	}

	#[test]
	#[should_panic(expected = "after completion")]
	fn append_after_completion_panics() {
		let stream = ResultStream::new("ab", 1);
		stream.set_complete();
		stream.append(1);
	}

	#[test]
	fn child_capacity_follows_parent_state() {
		let parent = ResultStream::new("ab", 10);
		parent.append(1);
		parent.append(2);
		assert_eq!(parent.fork("abc").capacity(), 10);

		parent.set_complete();
		let child = parent.fork("abc");
		assert_eq!(child.capacity(), 2);
		assert_eq!(child.origin(), Some("ab"));
		assert!(child.is_empty());
	}

	#[test]
	fn wait_beyond_times_out_without_progress() {
		let stream = ResultStream::<u8>::new("ab", 0);
		let snapshot = stream.wait_beyond(0, Some(Duration::from_millis(10)));
		assert_eq!(
			snapshot,
			Snapshot {
				committed: 0,
				complete: false
			}
		);
	}

	#[test]
	fn concurrent_pollers_see_every_record_once() {
		let stream = Arc::new(ResultStream::new("ab", 0));
		let producer = Arc::clone(&stream);
		let worker = thread::spawn(move || {
			for value in 0..500u32 {
				producer.append(value);
			}
			producer.set_complete();
		});

		let mut cursor = Cursor::new();
		let mut seen = Vec::new();
		loop {
			let poll = stream.poll(&mut cursor);
			seen.extend(poll.records.into_iter().map(Sequenced::into_value));
			if poll.complete {
				break;
			}
			stream.wait_beyond(cursor.position(), Some(Duration::from_millis(5)));
		}
		worker.join().unwrap();

		assert_eq!(seen, (0..500).collect::<Vec<_>>());
	}
}
