use std::time::Duration;

use super::{ResultsView, TickOutcome};
use crate::coordinator::{MIN_TERM_CHARS, SearchCoordinator};
use crate::error::SearchError;

/// Search box state: the typed text and the results shown for it.
#[derive(Debug)]
pub struct SearchSession {
	coordinator: SearchCoordinator,
	view: ResultsView,
	text: String,
}

impl SearchSession {
	#[must_use]
	pub fn new(coordinator: SearchCoordinator) -> Self {
		Self {
			coordinator,
			view: ResultsView::new(),
			text: String::new(),
		}
	}

	/// Replace the search text.
	///
	/// Text shorter than the minimum term length clears the results. Anything
	/// longer issues a search and polls it once straight away.
	///
	/// # Errors
	///
	/// Propagates [`SearchError`] from the coordinator.
	pub fn type_text(&mut self, text: &str) -> Result<TickOutcome, SearchError> {
		text.clone_into(&mut self.text);
		if text.chars().count() < MIN_TERM_CHARS {
			self.view.clear();
			return Ok(self.view.tick());
		}
		let stream = self.coordinator.search(text)?;
		self.view.show(stream);
		Ok(self.view.tick())
	}

	/// Poll the displayed stream.
	pub fn tick(&mut self) -> TickOutcome {
		self.view.tick()
	}

	/// Wait up to `interval` for new records, then poll.
	///
	/// Returns as soon as records arrive or the stream completes, so a caller
	/// ticking on a fixed interval does not add latency to fast searches.
	pub fn tick_after(&mut self, interval: Duration) -> TickOutcome {
		if !self.view.is_complete() {
			if let Some(stream) = self.view.stream() {
				stream.wait_beyond(self.view.cursor().position(), Some(interval));
			}
		}
		self.view.tick()
	}

	/// Poll on `interval` until the displayed stream completes.
	pub fn settle(&mut self, interval: Duration) -> TickOutcome {
		let mut outcome = self.tick();
		while !outcome.complete {
			outcome = self.tick_after(interval);
		}
		outcome
	}

	#[must_use]
	pub fn text(&self) -> &str {
		&self.text
	}

	#[must_use]
	pub fn view(&self) -> &ResultsView {
		&self.view
	}

	#[must_use]
	pub fn coordinator(&self) -> &SearchCoordinator {
		&self.coordinator
	}
}
