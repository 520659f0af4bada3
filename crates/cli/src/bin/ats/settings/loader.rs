use anyhow::{Result, anyhow};

use super::raw::RawConfig;
use super::resolved::ResolvedConfig;
use super::sources::build_config;
use crate::cli::CliArgs;

/// Load configuration by combining CLI arguments, config files and environment
/// variables.
pub(crate) fn load(cli: &CliArgs) -> Result<ResolvedConfig> {
	let builder = build_config(cli)?;
	let mut raw: RawConfig = builder
		.try_deserialize()
		.map_err(|err| anyhow!("failed to deserialize configuration: {err}"))?;
	raw.apply_cli_overrides(cli);
	raw.resolve()
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use ats_core::Action;
	use clap::Parser;

	use super::*;

	#[test]
	fn config_file_values_are_layered_under_flags() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(
			file,
			"[search]\ncase_sensitive = true\nnotes = false\n\n[engine]\nregistry_capacity = 8\n\n[actions]\ndefault = \"show\""
		)
		.unwrap();
		let path = file.path().to_string_lossy().into_owned();

		let cli = CliArgs::parse_from([
			"ats",
			"--no-config",
			"--config",
			&path,
			"--case-sensitive",
			"false",
		]);
		let resolved = load(&cli).unwrap();

		assert!(!resolved.options.case_sensitive);
		assert!(!resolved.options.notes);
		assert!(resolved.options.title);
		assert_eq!(resolved.registry_capacity, 8);
		assert_eq!(resolved.policy.default, Action::ShowEntry);
		assert_eq!(resolved.policy.alternative, Action::EditEntry);
	}

	#[test]
	fn missing_explicit_config_is_an_error() {
		let cli =
			CliArgs::parse_from(["ats", "--no-config", "--config", "/nonexistent/ats-config.toml"]);
		assert!(load(&cli).is_err());
	}

	#[test]
	fn invalid_values_are_reported() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(file, "[engine]\nregistry_capacity = 0").unwrap();
		let path = file.path().to_string_lossy().into_owned();
		let cli = CliArgs::parse_from(["ats", "--no-config", "--config", &path]);
		let err = load(&cli).unwrap_err();
		assert!(err.to_string().contains("registry_capacity"));
	}
}
