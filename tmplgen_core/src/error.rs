use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TmplError {
	#[error(transparent)]
	#[diagnostic(code(tmplgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("missing closing tag for `<{tag}>` block opened on line {line}")]
	#[diagnostic(
		code(tmplgen::malformed_block),
		help("add a `</{tag}>` comment in the same comment style after the block body")
	)]
	MalformedBlock { tag: String, line: usize },

	#[error("invalid `<{tag}>` tag on line {line}: {reason}")]
	#[diagnostic(
		code(tmplgen::invalid_marker),
		help("attributes must be written as `name=\"value\"`, separated by whitespace")
	)]
	InvalidMarker {
		tag: String,
		line: usize,
		reason: String,
	},

	#[error("unmatched quote in keys row on line {line}")]
	#[diagnostic(
		code(tmplgen::unmatched_quote),
		help("close the quoted field or escape the quote as `\\\"`")
	)]
	UnmatchedQuote { line: usize },

	#[error("keys row on line {line} has {got} field(s), the header declares {expected}")]
	#[diagnostic(
		code(tmplgen::arity_mismatch),
		help("separate fields with `;` and quote any field that contains a `;`")
	)]
	ArityMismatch {
		line: usize,
		expected: usize,
		got: usize,
	},

	#[error("empty column name in keys header on line {line}")]
	#[diagnostic(
		code(tmplgen::empty_column_name),
		help("remove the stray `;` from the `Keys` attribute")
	)]
	EmptyColumnName { line: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tmplgen::config_parse),
		help("check that tmplgen.toml is valid TOML with top-level keys and an optional [output] section")
	)]
	ConfigParse(String),

	#[error("refusing to overwrite the template `{0}`")]
	#[diagnostic(
		code(tmplgen::output_conflict),
		help("pass `--out` with a different path or rename the template")
	)]
	OutputConflict(String),
}

pub type TmplResult<T> = Result<T, TmplError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
