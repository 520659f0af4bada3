use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned synchronously by [`SearchCoordinator::search`](crate::SearchCoordinator::search).
#[derive(Debug, Error)]
pub enum SearchError {
	/// The term is too short to be worth scanning for.
	#[error("search term must be at least {min} characters long, got {actual}")]
	InvalidArgument { min: usize, actual: usize },

	/// The operating system refused to start a scan worker.
	#[error("failed to start search worker for '{term}'")]
	Spawn {
		term: String,
		#[source]
		source: io::Error,
	},
}

/// Errors raised while loading or assembling a collection.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("failed to read collection file {}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("collection '{name}' is not valid JSON")]
	Parse {
		name: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("entry id '{id}' appears more than once in collection '{collection}'")]
	DuplicateEntryId { collection: String, id: String },
}

/// Errors produced while expanding placeholders in a field value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
	#[error("placeholders nest deeper than {limit} levels")]
	TooDeep { limit: usize },
}

/// Error returned when an action name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown action '{0}' (expected one of: auto-type, edit, show, open-url, copy-password)")]
pub struct ParseActionError(pub String);
