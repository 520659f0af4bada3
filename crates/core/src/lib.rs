//! Incremental substring search over entry collections.
//!
//! Typing into a search box issues one [`SearchCoordinator::search`] call per
//! keystroke. Each distinct term gets its own [`ResultStream`] filled by a
//! background worker, and a term that extends an earlier one narrows the
//! earlier stream's matches instead of rescanning every entry. The driver
//! polls the stream it displays on a short interval, usually through a
//! [`ResultsView`], and ranks the hits with [`ranking::precedence`].
//!
//! ```
//! use ats_core::model::{Catalog, Collection, Entry, Group, TITLE_FIELD};
//! use ats_core::{Cursor, SearchCoordinator};
//!
//! let coordinator = SearchCoordinator::new(Catalog::single(Collection::new(
//! 	"vault",
//! 	Group::new("Root").with_entry(Entry::new("bank").with_field(TITLE_FIELD, "Bank of Atlas")),
//! )));
//! let stream = coordinator.search("atlas").unwrap();
//! let hits: Vec<_> = stream.drain().collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].start(), 8);
//!
//! let poll = coordinator.poll(&stream, &mut Cursor::new());
//! assert!(poll.complete);
//! ```
//!
//! [`ResultStream`]: ats_stream::ResultStream

pub mod actions;
pub mod coordinator;
mod error;
mod fold;
pub mod matcher;
pub mod model;
pub mod options;
pub mod presentation;
pub mod ranking;
pub mod resolve;
pub mod scan;

pub use ats_stream::{Cursor, Poll, ResultStream, Sequenced};

pub use crate::actions::{Action, ActionHost, ActionOutcome, ActionPolicy, perform_action};
pub use crate::coordinator::{DEFAULT_REGISTRY_CAPACITY, MIN_TERM_CHARS, SearchCoordinator};
pub use crate::error::{ParseActionError, ResolveError, SearchError, StoreError};
pub use crate::fold::Span;
pub use crate::matcher::{FieldId, MatchEngine, MatchRecord, SearchHit};
pub use crate::options::SearchOptions;
pub use crate::presentation::{ResultRow, ResultsView, SearchSession, TickOutcome};
pub use crate::resolve::{FieldReferenceResolver, PlaceholderResolver};
pub use crate::scan::{ScanOutcome, SharedStream};
