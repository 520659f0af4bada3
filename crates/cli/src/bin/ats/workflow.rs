use std::time::Duration;

use anyhow::{Context, Result, bail};
use ats_core::model::{Catalog, Collection};
use ats_core::{
	ActionOutcome, ActionPolicy, ResultRow, SearchCoordinator, SearchSession, perform_action,
};
use log::{debug, info};

use crate::console_host::ConsoleHost;
use crate::settings::ResolvedConfig;

/// One displayed result, detached from the engine's shared records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportRow {
	pub(crate) title: String,
	pub(crate) unique_title: String,
	pub(crate) collection: String,
	pub(crate) entry_id: String,
	pub(crate) field: String,
	pub(crate) value: String,
	pub(crate) start: usize,
	pub(crate) length: usize,
	pub(crate) resolved: bool,
}

impl ReportRow {
	fn from_row(row: &ResultRow) -> Self {
		let hit = row.hit();
		Self {
			title: hit.title().to_owned(),
			unique_title: row.unique_title().to_owned(),
			collection: hit.collection().name().to_owned(),
			entry_id: hit.entry().id().to_owned(),
			field: hit.field().display_name().to_owned(),
			value: hit.value().to_owned(),
			start: hit.start(),
			length: hit.length(),
			resolved: hit.is_resolved(),
		}
	}

	/// Field value with the matched span bracketed.
	pub(crate) fn highlighted(&self) -> String {
		let mut out = String::with_capacity(self.value.len() + 2);
		for (index, ch) in self.value.chars().enumerate() {
			if index == self.start && self.length > 0 {
				out.push('[');
			}
			out.push(ch);
			if self.length > 0 && index + 1 == self.start + self.length {
				out.push(']');
			}
		}
		out
	}
}

/// What accepting the top result did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AcceptReport {
	pub(crate) outcome: ActionOutcome,
	pub(crate) messages: Vec<String>,
}

/// Results for one typed term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TermReport {
	pub(crate) term: String,
	pub(crate) total: usize,
	pub(crate) complete: bool,
	pub(crate) rows: Vec<ReportRow>,
	pub(crate) accepted: Option<AcceptReport>,
}

/// Per-run choices that do not come from configuration files.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunOptions {
	pub(crate) accept: bool,
	pub(crate) limit: Option<usize>,
}

/// Types terms into a search session and collects the ranked results.
pub(crate) struct SearchWorkflow {
	session: SearchSession,
	poll_interval: Duration,
	policy: ActionPolicy,
	run: RunOptions,
	host: ConsoleHost,
}

impl SearchWorkflow {
	pub(crate) fn from_config(config: ResolvedConfig, run: RunOptions) -> Result<Self> {
		if config.collections.is_empty() {
			bail!("no collections to search; pass --collection FILE or set store.collections");
		}
		let collections = config
			.collections
			.iter()
			.map(|path| {
				Collection::load(path)
					.with_context(|| format!("failed to load collection {}", path.display()))
			})
			.collect::<Result<Vec<_>>>()?;
		let catalog = Catalog::new(collections);
		info!(
			"loaded {} entries from {} collection(s)",
			catalog.entry_count(),
			catalog.collections().len()
		);
		Ok(Self::new(catalog, &config, run))
	}

	pub(crate) fn new(catalog: Catalog, config: &ResolvedConfig, run: RunOptions) -> Self {
		let coordinator = SearchCoordinator::new(catalog)
			.with_options(config.options)
			.with_registry_capacity(config.registry_capacity);
		Self {
			session: SearchSession::new(coordinator),
			poll_interval: config.poll_interval,
			policy: config.policy,
			run,
			host: ConsoleHost::default(),
		}
	}

	/// Type `term` one character at a time, wait for its results and
	/// optionally accept the top one.
	pub(crate) fn run_term(&mut self, term: &str) -> Result<TermReport> {
		let mut typed = String::with_capacity(term.len());
		for ch in term.chars() {
			typed.push(ch);
			self.session
				.type_text(&typed)
				.with_context(|| format!("search for '{typed}' failed"))?;
		}
		let outcome = self.session.settle(self.poll_interval);
		debug!("{term:?} settled with {} result(s)", outcome.total);

		let view = self.session.view();
		let limit = self.run.limit.unwrap_or(usize::MAX);
		let rows = view.rows().iter().take(limit).map(ReportRow::from_row).collect();

		let accepted = match (self.run.accept, view.top()) {
			(true, Some(top)) => {
				let hit = top.hit();
				let outcome = perform_action(
					&mut self.host,
					self.policy.default,
					&self.policy,
					hit.entry(),
					hit.collection(),
				);
				Some(AcceptReport {
					outcome,
					messages: self.host.take_messages(),
				})
			}
			_ => None,
		};

		Ok(TermReport {
			term: term.to_owned(),
			total: outcome.total,
			complete: outcome.complete,
			rows,
			accepted,
		})
	}
}

#[cfg(test)]
mod tests {
	use ats_core::model::{Entry, Group, TITLE_FIELD, USER_NAME_FIELD};
	use ats_core::{Action, SearchOptions};

	use super::*;

	fn config() -> ResolvedConfig {
		ResolvedConfig {
			options: SearchOptions::default(),
			registry_capacity: 16,
			poll_interval: Duration::from_millis(20),
			policy: ActionPolicy::default(),
			collections: Vec::new(),
		}
	}

	fn catalog() -> Catalog {
		Catalog::single(Collection::new(
			"vault",
			Group::new("Root")
				.with_entry(
					Entry::new("bank")
						.with_field(TITLE_FIELD, "Bank of Atlas")
						.with_field(USER_NAME_FIELD, "jo"),
				)
				.with_entry(Entry::new("corp").with_field(TITLE_FIELD, "Atlas Corp")),
		))
	}

	#[test]
	fn typed_term_reports_ranked_rows() {
		let mut workflow = SearchWorkflow::new(catalog(), &config(), RunOptions::default());
		let report = workflow.run_term("atlas").unwrap();
		assert!(report.complete);
		assert_eq!(report.total, 2);
		assert_eq!(report.rows[0].entry_id, "corp");
		assert_eq!(report.rows[0].value, "Atlas Corp");
		assert_eq!(report.rows[0].field, "Title");
		assert_eq!(report.rows[1].highlighted(), "Bank of [Atlas]");
		assert!(report.accepted.is_none());
	}

	#[test]
	fn limit_and_accept_apply_to_the_top_row() {
		let run = RunOptions {
			accept: true,
			limit: Some(1),
		};
		let mut workflow = SearchWorkflow::new(catalog(), &config(), run);
		let report = workflow.run_term("bank").unwrap();
		assert_eq!(report.rows.len(), 1);
		let accepted = report.accepted.unwrap();
		assert_eq!(accepted.outcome, ActionOutcome::Performed(Action::PerformAutoType));
		assert_eq!(accepted.messages.len(), 1);
	}

	#[test]
	fn single_character_terms_report_nothing() {
		let mut workflow = SearchWorkflow::new(catalog(), &config(), RunOptions::default());
		let report = workflow.run_term("a").unwrap();
		assert_eq!(report.total, 0);
		assert!(report.rows.is_empty());
	}

	#[test]
	fn missing_collections_are_an_error() {
		assert!(SearchWorkflow::from_config(config(), RunOptions::default()).is_err());
	}
}
