use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use ats_core::{Action, ActionPolicy, DEFAULT_REGISTRY_CAPACITY, SearchOptions};
use serde::Deserialize;

use crate::app_dirs;
use crate::cli::CliArgs;

use super::resolved::ResolvedConfig;

const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
	search: SearchSection,
	engine: EngineSection,
	actions: ActionsSection,
	store: StoreSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SearchSection {
	case_sensitive: Option<bool>,
	title: Option<bool>,
	user_name: Option<bool>,
	url: Option<bool>,
	notes: Option<bool>,
	custom_fields: Option<bool>,
	tags: Option<bool>,
	resolve_references: Option<bool>,
	exclude_expired: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EngineSection {
	registry_capacity: Option<usize>,
	poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ActionsSection {
	default: Option<String>,
	alternative: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StoreSection {
	collections: Option<Vec<PathBuf>>,
}

impl RawConfig {
	/// Apply CLI overrides on top of the raw configuration values.
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		let search = &mut self.search;
		for (target, value) in [
			(&mut search.case_sensitive, cli.case_sensitive),
			(&mut search.title, cli.title),
			(&mut search.user_name, cli.user_name),
			(&mut search.url, cli.url),
			(&mut search.notes, cli.notes),
			(&mut search.custom_fields, cli.custom_fields),
			(&mut search.tags, cli.tags),
			(&mut search.resolve_references, cli.resolve_references),
			(&mut search.exclude_expired, cli.exclude_expired),
		] {
			if value.is_some() {
				*target = value;
			}
		}

		if let Some(capacity) = cli.registry_capacity {
			self.engine.registry_capacity = Some(capacity);
		}
		if let Some(interval) = cli.poll_interval_ms {
			self.engine.poll_interval_ms = Some(interval);
		}
		if let Some(action) = cli.action.clone() {
			self.actions.default = Some(action);
		}
		if let Some(action) = cli.alternative_action.clone() {
			self.actions.alternative = Some(action);
		}
		if !cli.collections.is_empty() {
			self.store.collections = Some(cli.collections.clone());
		}
	}

	/// Convert the raw configuration into a [`ResolvedConfig`], validating and
	/// filling defaults where required.
	pub(super) fn resolve(self) -> Result<ResolvedConfig> {
		let defaults = SearchOptions::default();
		let search = self.search;
		let options = SearchOptions {
			case_sensitive: search.case_sensitive.unwrap_or(defaults.case_sensitive),
			title: search.title.unwrap_or(defaults.title),
			user_name: search.user_name.unwrap_or(defaults.user_name),
			url: search.url.unwrap_or(defaults.url),
			notes: search.notes.unwrap_or(defaults.notes),
			custom_fields: search.custom_fields.unwrap_or(defaults.custom_fields),
			tags: search.tags.unwrap_or(defaults.tags),
			resolve_references: search
				.resolve_references
				.unwrap_or(defaults.resolve_references),
			exclude_expired: search.exclude_expired.unwrap_or(defaults.exclude_expired),
		};

		let registry_capacity = self
			.engine
			.registry_capacity
			.unwrap_or(DEFAULT_REGISTRY_CAPACITY);
		ensure!(
			registry_capacity > 0,
			"engine.registry_capacity must be at least 1"
		);
		let poll_interval_ms = self
			.engine
			.poll_interval_ms
			.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
		ensure!(
			poll_interval_ms > 0,
			"engine.poll_interval_ms must be at least 1"
		);

		let mut policy = ActionPolicy::default();
		if let Some(name) = self.actions.default {
			policy.default = parse_action(&name, "actions.default")?;
		}
		if let Some(name) = self.actions.alternative {
			policy.alternative = parse_action(&name, "actions.alternative")?;
		}

		let collections = self
			.store
			.collections
			.unwrap_or_default()
			.into_iter()
			.map(locate_collection)
			.collect::<Result<Vec<_>>>()?;

		Ok(ResolvedConfig {
			options,
			registry_capacity,
			poll_interval: Duration::from_millis(poll_interval_ms),
			policy,
			collections,
		})
	}
}

fn parse_action(name: &str, key: &str) -> Result<Action> {
	name.parse::<Action>()
		.with_context(|| format!("invalid value for {key}"))
}

/// Resolve a relative collection path against the working directory, falling
/// back to the data directory when the file only exists there.
fn locate_collection(path: PathBuf) -> Result<PathBuf> {
	if path.is_absolute() {
		return Ok(path);
	}
	let current = env::current_dir().context("failed to determine working directory")?;
	let local = current.join(&path);
	if local.exists() {
		return Ok(local);
	}
	if let Ok(data_dir) = app_dirs::get_data_dir() {
		let stored = data_dir.join(&path);
		if stored.exists() {
			return Ok(stored);
		}
	}
	Ok(local)
}
