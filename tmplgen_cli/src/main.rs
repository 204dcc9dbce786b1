use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tmplgen_cli::Commands;
use tmplgen_cli::OutputFormat;
use tmplgen_cli::TmplgenCli;
use tmplgen_core::AnyEmptyResult;
use tmplgen_core::AnyResult;
use tmplgen_core::Directive;
use tmplgen_core::Segment;
use tmplgen_core::TmplConfig;
use tmplgen_core::TmplError;
use tmplgen_core::files::CheckOutcome;
use tmplgen_core::files::FileOutcome;
use tmplgen_core::files::SourceFile;
use tmplgen_core::files::check_file;
use tmplgen_core::files::output_path;
use tmplgen_core::files::render_file;
use tmplgen_core::files::write_rendered;
use tmplgen_core::parse;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TmplgenCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	// Logs go to stderr so generated output on stdout stays clean.
	let filter = if args.verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.init();

	let result = match &args.command {
		Some(Commands::Generate {
			files,
			out,
			dry_run,
		}) => run_generate(&args, files, out.as_deref(), *dry_run),
		Some(Commands::Check {
			files,
			diff,
			format,
		}) => run_check(&args, files, *diff, *format),
		Some(Commands::List { file, format }) => run_list(&args, file, *format),
		None => {
			eprintln!("No subcommand specified. Run `tmplgen --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		report_error(e);
		process::exit(2);
	}
}

/// Render through miette when the error carries diagnostic codes and help.
fn report_error(error: Box<dyn std::error::Error>) {
	match error.downcast::<TmplError>() {
		Ok(tmpl_err) => {
			let report: miette::Report = (*tmpl_err).into();
			eprintln!("{report:?}");
		}
		Err(e) => {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn report_file_error(file: &Path, error: TmplError) {
	eprintln!("{} {}", colored!("failed:", red), file.display());
	let report: miette::Report = error.into();
	eprintln!("{report:?}");
}

fn resolve_root(args: &TmplgenCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(args: &TmplgenCli) -> AnyResult<TmplConfig> {
	if let Some(path) = &args.config {
		debug!(path = %path.display(), "loading explicit config");
		return Ok(TmplConfig::load_file(path)?);
	}

	let root = resolve_root(args);
	let config = TmplConfig::load(&root)?;
	debug!(root = %root.display(), found = config.is_some(), "resolved config");
	Ok(config.unwrap_or_default())
}

fn run_generate(
	args: &TmplgenCli,
	files: &[PathBuf],
	out: Option<&Path>,
	dry_run: bool,
) -> AnyEmptyResult {
	if out.is_some() && files.len() > 1 {
		return Err("`--out` can only be used with a single template".into());
	}

	let config = load_config(args)?;
	let mut failed = 0;

	for file in files {
		let output = out.map_or_else(|| output_path(file, &config.output), Path::to_path_buf);
		let rendered = match render_file(file, &output, &config) {
			Ok(rendered) => rendered,
			Err(error) => {
				report_file_error(file, error);
				failed += 1;
				continue;
			}
		};

		if dry_run {
			let current = std::fs::read_to_string(&output).ok();
			if current.as_deref() == Some(rendered.contents.as_str()) {
				println!("Unchanged: {}", output.display());
			} else {
				println!("Would write: {}", output.display());
			}
			continue;
		}

		match write_rendered(&rendered) {
			Ok(FileOutcome::Written) => {
				println!("{} {}", colored!("Wrote", green), output.display());
			}
			Ok(FileOutcome::Unchanged) => println!("Unchanged: {}", output.display()),
			Err(error) => {
				report_file_error(file, error);
				failed += 1;
			}
		}
	}

	if failed > 0 {
		eprintln!(
			"{} {failed} of {} template(s) failed",
			colored!("error:", red),
			files.len()
		);
		process::exit(2);
	}

	Ok(())
}

fn status_label(outcome: &CheckOutcome) -> &'static str {
	match outcome {
		CheckOutcome::UpToDate => "up_to_date",
		CheckOutcome::Stale { .. } => "stale",
		CheckOutcome::Missing => "missing",
	}
}

fn run_check(
	args: &TmplgenCli,
	files: &[PathBuf],
	show_diff: bool,
	format: OutputFormat,
) -> AnyEmptyResult {
	let config = load_config(args)?;
	let mut results = Vec::with_capacity(files.len());
	let mut failed = 0;

	for file in files {
		let output = output_path(file, &config.output);
		match check_file(file, &output, &config) {
			Ok(outcome) => results.push((file, output, outcome)),
			Err(error) => {
				report_file_error(file, error);
				failed += 1;
			}
		}
	}

	let outdated = results
		.iter()
		.filter(|(_, _, outcome)| !outcome.is_ok())
		.count();

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = results
				.iter()
				.map(|(file, output, outcome)| {
					serde_json::json!({
						"file": file.display().to_string(),
						"output": output.display().to_string(),
						"status": status_label(outcome),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": outdated == 0 && failed == 0,
				"files": entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			for (_, output, outcome) in &results {
				match outcome {
					CheckOutcome::UpToDate => {}
					CheckOutcome::Missing => {
						eprintln!("{} {}", colored!("missing:", yellow), output.display());
					}
					CheckOutcome::Stale { expected, current } => {
						eprintln!("{} {}", colored!("stale:", yellow), output.display());
						if show_diff {
							print_diff(current, expected);
						}
					}
				}
			}

			if outdated == 0 && failed == 0 {
				println!("Check passed: all generated files are up to date.");
			} else if outdated > 0 {
				eprintln!();
				eprintln!(
					"{outdated} generated file(s) out of date. Run `tmplgen generate` to update them."
				);
			}
		}
	}

	if failed > 0 {
		process::exit(2);
	}
	if outdated > 0 {
		process::exit(1);
	}

	Ok(())
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

fn directive_label(directive: Directive<'_>) -> String {
	match directive {
		Directive::Keys(header) => format!("keys ({header})"),
		other => other.to_string(),
	}
}

fn run_list(args: &TmplgenCli, file: &Path, format: OutputFormat) -> AnyEmptyResult {
	let config = load_config(args)?;
	let source = SourceFile::read(file)?;
	let segments = parse(&source.content, &config.tag)?;

	match format {
		OutputFormat::Json => {
			let entries: Vec<serde_json::Value> = segments
				.iter()
				.map(|segment| {
					match segment {
						Segment::Passthrough { text } => {
							serde_json::json!({
								"kind": "passthrough",
								"bytes": text.len(),
							})
						}
						Segment::Tagged(block) => {
							serde_json::json!({
								"kind": "tagged",
								"directive": block.directive().to_string(),
								"style": block.style,
								"attributes": block.attributes,
								"opening_line": block.opening_line,
								"body_line": block.body_line,
								"closing_line": block.closing_line,
								"bytes": block.body.len(),
							})
						}
					}
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&entries)?);
		}
		OutputFormat::Text => {
			let mut tagged = 0;
			for segment in &segments {
				match segment {
					Segment::Passthrough { text } if text.is_empty() => {}
					Segment::Passthrough { text } => {
						println!("passthrough  {} bytes", text.len());
					}
					Segment::Tagged(block) => {
						tagged += 1;
						println!(
							"tagged       lines {}-{}  {}  ({} comments, {} bytes)",
							block.opening_line,
							block.closing_line,
							directive_label(block.directive()),
							block.style,
							block.body.len()
						);
					}
				}
			}
			println!();
			println!("{tagged} tagged block(s) in {}", file.display());
		}
	}

	Ok(())
}
