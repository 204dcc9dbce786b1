use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate repetitive code from comment-tagged template blocks.",
	long_about = "tmplgen expands template blocks written in ordinary source comments.\n\nA \
	              `<tmpl Keys=\"...\">` block declares a table of rows and every following \
	              `<tmpl>` block is repeated once per row with the column names replaced by \
	              the row's values.\n\nQuick start:\n  tmplgen generate Settings.tmpl.cs  \
	              Write Settings.cs\n  tmplgen check Settings.tmpl.cs     Verify Settings.cs \
	              is up to date\n  tmplgen list Settings.tmpl.cs      Show the blocks of a \
	              template"
)]
pub struct TmplgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to a config file. Overrides config discovery.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Directory searched for `tmplgen.toml`. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Generate output files from templates.
	///
	/// Each template is processed on its own. A file whose generation fails is
	/// reported and left untouched, and the command exits with status 2 once
	/// every file has been tried. Output files whose content would not change
	/// are not rewritten.
	Generate {
		/// Template files to expand.
		#[arg(required = true)]
		files: Vec<PathBuf>,

		/// Write the output here instead of the derived path. Only valid with
		/// a single template.
		#[arg(long, short)]
		out: Option<PathBuf>,

		/// Print which files would change without writing them.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Check that generated files are up to date.
	///
	/// Exits with status 1 when any output file is stale or missing. Ideal for
	/// CI pipelines.
	Check {
		/// Template files to check.
		#[arg(required = true)]
		files: Vec<PathBuf>,

		/// Show a line diff for each stale output file.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the segments of a template.
	///
	/// Shows every passthrough and tagged segment in document order, with the
	/// directive and line numbers of each tagged block.
	List {
		/// Template file to inspect.
		file: PathBuf,

		/// Output format for the segment list.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
