mod app_dirs;
mod cli;
mod console_host;
mod logging;
mod settings;
mod workflow;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use cli::{CliArgs, OutputFormat, parse_cli, print_json, print_plain};
use workflow::{RunOptions, SearchWorkflow, TermReport};

fn main() -> Result<()> {
	let cli = parse_cli();
	logging::initialize(cli.verbose)?;

	let resolved = settings::load(&cli)?;

	if cli.print_config {
		resolved.print_summary();
	}

	let run = RunOptions {
		accept: cli.accept,
		limit: cli.limit,
	};
	let mut workflow = SearchWorkflow::from_config(resolved, run)?;
	run_terms(&cli, &mut workflow)
}

/// Type every term from the command line, or from stdin when none were given.
fn run_terms(cli: &CliArgs, workflow: &mut SearchWorkflow) -> Result<()> {
	if !cli.terms.is_empty() {
		for term in &cli.terms {
			emit(cli.output, &workflow.run_term(term)?)?;
		}
		return Ok(());
	}

	for line in io::stdin().lock().lines() {
		let line = line.context("failed to read term from stdin")?;
		let term = line.trim();
		if term.is_empty() {
			continue;
		}
		emit(cli.output, &workflow.run_term(term)?)?;
	}
	Ok(())
}

fn emit(format: OutputFormat, report: &TermReport) -> Result<()> {
	match format {
		OutputFormat::Plain => print_plain(report),
		OutputFormat::Json => print_json(report)?,
	}
	Ok(())
}
