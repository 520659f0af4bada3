//! Append-only result streams shared between one producer thread and any
//! number of readers.
//!
//! A [`ResultStream`] is written by exactly one background worker and read by
//! pollers that each keep their own [`Cursor`]. Every appended value is wrapped
//! in a [`Sequenced`] record carrying its discovery position, which doubles as
//! the cursor unit and as a stable tie-break for consumers that re-sort.
//!
//! Readers pick one of two access styles:
//!
//! - [`ResultStream::poll`] never blocks and returns whatever was committed
//!   since the cursor, together with the completion flag observed in the same
//!   critical section.
//! - [`ResultStream::drain`] yields every record once, parking the calling
//!   thread until more data arrives or the producer completes the stream.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use ats_stream::{Cursor, ResultStream};
//!
//! let stream = Arc::new(ResultStream::new("ab", 8));
//! let producer = Arc::clone(&stream);
//! let worker = thread::spawn(move || {
//!     producer.append("abc".to_string());
//!     producer.append("cab".to_string());
//!     producer.set_complete();
//! });
//!
//! let drained: Vec<_> = stream.drain().map(|record| record.into_value()).collect();
//! worker.join().unwrap();
//! assert_eq!(drained, ["abc", "cab"]);
//!
//! let mut cursor = Cursor::new();
//! let poll = stream.poll(&mut cursor);
//! assert_eq!(poll.records.len(), 2);
//! assert!(poll.complete);
//! ```

mod drain;
mod guard;
mod sequenced;
mod stream;

pub use drain::Drain;
pub use guard::CompletionGuard;
pub use sequenced::Sequenced;
pub use stream::{Cursor, Poll, ResultStream, Snapshot};
