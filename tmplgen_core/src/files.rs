//! Reading templates from disk and writing the generated files next to them.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::OutputConfig;
use crate::TmplConfig;
use crate::TmplError;
use crate::TmplResult;
use crate::generate;

/// The UTF-8 byte order mark.
pub const BOM: char = '\u{feff}';

/// Derive the generated file path for a template.
///
/// The name is rewritten by the first rule that applies:
///
/// 1. `name.<template_marker>.<ext>` → `name.<ext>`
/// 2. `name.<ext>` → `name.<generated_marker>.<ext>`
/// 3. `name` → `name.<default_extension>`
pub fn output_path(input: &Path, output: &OutputConfig) -> PathBuf {
	let Some(file_name) = input.file_name().and_then(|name| name.to_str()) else {
		return input.to_path_buf();
	};

	let renamed = match file_name.rsplit_once('.') {
		Some((stem, extension)) if !stem.is_empty() => {
			let marker = format!(".{}", output.template_marker);
			match stem.strip_suffix(&marker) {
				Some(base) if !base.is_empty() => format!("{base}.{extension}"),
				_ => format!("{stem}.{}.{extension}", output.generated_marker),
			}
		}
		_ => format!("{file_name}.{}", output.default_extension),
	};

	input.with_file_name(renamed)
}

/// A template read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
	pub path: PathBuf,
	/// The file content without its byte order mark.
	pub content: String,
	/// Whether the file started with a byte order mark.
	pub has_bom: bool,
}

impl SourceFile {
	/// Read a UTF-8 template, stripping a leading byte order mark.
	pub fn read(path: &Path) -> TmplResult<Self> {
		let raw = std::fs::read_to_string(path)?;
		let (content, has_bom) = match raw.strip_prefix(BOM) {
			Some(rest) => (rest.to_string(), true),
			None => (raw, false),
		};

		Ok(Self {
			path: path.to_path_buf(),
			content,
			has_bom,
		})
	}
}

/// A generated document and the path it belongs at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
	pub input: PathBuf,
	pub output: PathBuf,
	/// The exact text to write, byte order mark included.
	pub contents: String,
}

/// What [`generate_file`] did with the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
	/// The output file was created or its content replaced.
	Written,
	/// The output file already held the generated content and was left alone.
	Unchanged,
}

/// The state of an output file compared with a fresh generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
	UpToDate,
	Stale { expected: String, current: String },
	Missing,
}

impl CheckOutcome {
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::UpToDate)
	}
}

fn same_file(input: &Path, output: &Path) -> bool {
	if input == output {
		return true;
	}

	match (input.canonicalize(), output.canonicalize()) {
		(Ok(input), Ok(output)) => input == output,
		_ => false,
	}
}

/// Generate the document for `input` in memory. Nothing is written.
pub fn render_file(input: &Path, output: &Path, config: &TmplConfig) -> TmplResult<Rendered> {
	if same_file(input, output) {
		return Err(TmplError::OutputConflict(output.display().to_string()));
	}

	let source = SourceFile::read(input)?;
	let generated = generate(&source.content, config)?;
	let mut contents = String::with_capacity(generated.len() + BOM.len_utf8());
	if config.output.bom.writes_bom(source.has_bom) {
		contents.push(BOM);
	}
	contents.push_str(&generated);

	debug!(
		input = %input.display(),
		bytes = contents.len(),
		"rendered template"
	);

	Ok(Rendered {
		input: input.to_path_buf(),
		output: output.to_path_buf(),
		contents,
	})
}

/// Generate `input` and write the result to `output`.
///
/// The output is only touched once the whole document was generated, and only
/// when its content differs from what is already on disk.
pub fn generate_file(input: &Path, output: &Path, config: &TmplConfig) -> TmplResult<FileOutcome> {
	let rendered = render_file(input, output, config)?;
	write_rendered(&rendered)
}

/// Write a rendered document unless the output already matches it.
pub fn write_rendered(rendered: &Rendered) -> TmplResult<FileOutcome> {
	if let Ok(current) = std::fs::read_to_string(&rendered.output) {
		if current == rendered.contents {
			debug!(output = %rendered.output.display(), "output unchanged");
			return Ok(FileOutcome::Unchanged);
		}
	}

	std::fs::write(&rendered.output, &rendered.contents)?;
	info!(
		input = %rendered.input.display(),
		output = %rendered.output.display(),
		"wrote generated file"
	);

	Ok(FileOutcome::Written)
}

/// Compare the existing `output` with what `input` would generate.
pub fn check_file(input: &Path, output: &Path, config: &TmplConfig) -> TmplResult<CheckOutcome> {
	let rendered = render_file(input, output, config)?;

	let current = match std::fs::read_to_string(output) {
		Ok(current) => current,
		Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
			return Ok(CheckOutcome::Missing);
		}
		Err(error) => return Err(error.into()),
	};

	if current == rendered.contents {
		Ok(CheckOutcome::UpToDate)
	} else {
		Ok(CheckOutcome::Stale {
			expected: rendered.contents,
			current,
		})
	}
}
