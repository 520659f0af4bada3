use std::collections::VecDeque;

use crate::{ResultStream, Sequenced};

/// Blocking, single-pass iterator over a [`ResultStream`].
///
/// Created by [`ResultStream::drain`]. Each call to `next` either returns a
/// buffered record, or takes every record committed since the last batch,
/// parking the thread while the stream is empty and still running. The
/// iterator ends once the stream is complete and all records were yielded.
pub struct Drain<'a, T> {
	stream: &'a ResultStream<T>,
	position: usize,
	buffered: VecDeque<Sequenced<T>>,
	finished: bool,
}

impl<'a, T: Clone> Drain<'a, T> {
	pub(crate) fn new(stream: &'a ResultStream<T>) -> Self {
		Self {
			stream,
			position: 0,
			buffered: VecDeque::new(),
			finished: false,
		}
	}

	/// Number of records yielded or buffered so far.
	#[must_use]
	pub fn position(&self) -> usize {
		self.position
	}
}

impl<T: Clone> Iterator for Drain<'_, T> {
	type Item = Sequenced<T>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(record) = self.buffered.pop_front() {
			return Some(record);
		}
		if self.finished {
			return None;
		}

		let (batch, _) = self.stream.take_from(self.position);
		if batch.is_empty() {
			self.finished = true;
			return None;
		}
		self.position += batch.len();
		self.buffered.extend(batch);
		self.buffered.pop_front()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::mpsc;
	use std::thread;
	use std::time::Duration;

	use super::*;

	#[test]
	fn drain_blocks_until_records_arrive() {
		let stream = Arc::new(ResultStream::<&str>::new("ab", 2));
		let consumer_stream = Arc::clone(&stream);
		let (tx, rx) = mpsc::channel();
		let consumer = thread::spawn(move || {
			for record in consumer_stream.drain() {
				tx.send(record.into_value()).unwrap();
			}
		});

		assert!(rx.recv_timeout(Duration::from_millis(20)).is_err());
		stream.append("first");
		assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "first");
		stream.append("second");
		stream.set_complete();
		consumer.join().unwrap();
		assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["second"]);
	}

	#[test]
	fn drain_of_completed_empty_stream_ends_immediately() {
		let stream = ResultStream::<u8>::new("ab", 0);
		stream.set_complete();
		assert_eq!(stream.drain().count(), 0);
	}

	#[test]
	fn guard_releases_readers_when_producer_stops() {
		let stream = Arc::new(ResultStream::new("ab", 0));
		let producer = Arc::clone(&stream);
		let worker = thread::spawn(move || {
			let _guard = crate::CompletionGuard::new(&producer);
			producer.append(7u8);
		});
		let values: Vec<u8> = stream.drain().map(Sequenced::into_value).collect();
		worker.join().unwrap();
		assert_eq!(values, [7]);
		assert!(stream.is_complete());
	}
}
