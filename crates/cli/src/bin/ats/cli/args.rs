use std::fmt::Write;
use std::path::PathBuf;

use clap::{
	ArgAction, ColorChoice, CommandFactory, FromArgMatches, Parser, ValueEnum,
	builder::{
		BoolishValueParser, Styles,
		styling::{AnsiColor, Effects},
	},
};

use crate::app_dirs;

/// Produce the full version banner including config and data directories.
fn long_version() -> &'static str {
	let config_dir = match app_dirs::get_config_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};
	let data_dir = match app_dirs::get_data_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};

	let mut details = format!("ats {}", env!("CARGO_PKG_VERSION"));
	let _ = writeln!(details);
	let _ = writeln!(details, "config directory: {config_dir}");
	let _ = writeln!(details, "data directory: {data_dir}");

	Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub(crate) fn parse_cli() -> CliArgs {
	let mut matches = CliArgs::command().get_matches();
	CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

#[derive(Parser, Debug)]
#[command(
	name = "ats",
	version,
	long_version = long_version(),
	about = "Incremental search over entry collections, as typed into an auto-type search box",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
/// Command-line arguments accepted by the `ats` binary.
pub(crate) struct CliArgs {
	#[arg(
		value_name = "TERM",
		help = "Terms to type, one keystroke at a time (default: read one term per line from stdin)"
	)]
	pub(crate) terms: Vec<String>,
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "ATS_CONFIG",
		action = ArgAction::Append,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short = 'f',
		long = "collection",
		value_name = "FILE",
		action = ArgAction::Append,
		help = "JSON collection file to search, repeatable (default: store.collections)"
	)]
	pub(crate) collections: Vec<PathBuf>,
	#[arg(
		short = 's',
		long = "case-sensitive",
		value_parser = BoolishValueParser::new(),
		help = "Match case exactly (default: disabled)"
	)]
	pub(crate) case_sensitive: Option<bool>,
	#[arg(
		long = "search-title",
		value_parser = BoolishValueParser::new(),
		help = "Search entry titles (default: enabled)"
	)]
	pub(crate) title: Option<bool>,
	#[arg(
		long = "search-user-name",
		value_parser = BoolishValueParser::new(),
		help = "Search user names (default: enabled)"
	)]
	pub(crate) user_name: Option<bool>,
	#[arg(
		long = "search-url",
		value_parser = BoolishValueParser::new(),
		help = "Search URLs (default: enabled)"
	)]
	pub(crate) url: Option<bool>,
	#[arg(
		long = "search-notes",
		value_parser = BoolishValueParser::new(),
		help = "Search notes (default: enabled)"
	)]
	pub(crate) notes: Option<bool>,
	#[arg(
		long = "search-custom-fields",
		value_parser = BoolishValueParser::new(),
		help = "Search unprotected custom fields (default: enabled)"
	)]
	pub(crate) custom_fields: Option<bool>,
	#[arg(
		long = "search-tags",
		value_parser = BoolishValueParser::new(),
		help = "Search tags (default: enabled)"
	)]
	pub(crate) tags: Option<bool>,
	#[arg(
		long = "resolve-references",
		value_parser = BoolishValueParser::new(),
		help = "Retry fields with placeholders expanded (default: enabled)"
	)]
	pub(crate) resolve_references: Option<bool>,
	#[arg(
		short = 'x',
		long = "exclude-expired",
		value_parser = BoolishValueParser::new(),
		help = "Skip entries whose expiry time has passed (default: disabled)"
	)]
	pub(crate) exclude_expired: Option<bool>,
	#[arg(
		long = "registry-capacity",
		value_name = "NUM",
		help = "Number of result streams kept for reuse (default: 64)"
	)]
	pub(crate) registry_capacity: Option<usize>,
	#[arg(
		long = "poll-interval",
		value_name = "MS",
		help = "Milliseconds between result polls (default: 250)"
	)]
	pub(crate) poll_interval_ms: Option<u64>,
	#[arg(
		long = "action",
		value_name = "ACTION",
		help = "Action performed on accept: auto-type, edit, show, open-url, copy-password (default: auto-type)"
	)]
	pub(crate) action: Option<String>,
	#[arg(
		long = "alternative-action",
		value_name = "ACTION",
		help = "Action performed when auto-type fails (default: edit)"
	)]
	pub(crate) alternative_action: Option<String>,
	#[arg(
		short = 'a',
		long = "accept",
		help = "Perform the configured action on the top result of each term (default: disabled)"
	)]
	pub(crate) accept: bool,
	#[arg(
		short = 'l',
		long = "limit",
		value_name = "NUM",
		help = "Print at most NUM results per term (default: all)"
	)]
	pub(crate) limit: Option<usize>,
	#[arg(
		short = 'p',
		long = "print-config",
		help = "Print the resolved configuration before running (default: disabled)"
	)]
	pub(crate) print_config: bool,
	#[arg(
		short = 'v',
		long = "verbose",
		help = "Log search activity to stderr; ATS_LOG takes precedence (default: disabled)"
	)]
	pub(crate) verbose: bool,
	#[arg(
		short = 'o',
		long = "output",
		value_enum,
		default_value_t = OutputFormat::Plain,
		help = "Choose how to print results"
	)]
	pub(crate) output: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
/// Output formats supported by the CLI utility.
pub(crate) enum OutputFormat {
	Plain,
	Json,
}
