use tracing::debug;

use crate::Directive;
use crate::KeysTable;
use crate::Segment;
use crate::TableLines;
use crate::TaggedBlock;
use crate::TmplConfig;
use crate::TmplResult;
use crate::parse;

/// Replace every whole-word occurrence of `word` in `haystack`.
///
/// An occurrence only counts when the characters on both sides of it are not
/// ASCII letters or digits, so `X` matches in `X_1` and `(X)` but not in `XY`
/// or `aX`. Matches are found left to right without overlap and the
/// replacement text is never rescanned. Both `word` and `replacement` are
/// literal text.
pub fn replace_word(haystack: &str, word: &str, replacement: &str) -> String {
	if word.is_empty() {
		return haystack.to_string();
	}

	let bytes = haystack.as_bytes();
	let mut result = String::with_capacity(haystack.len());
	let mut copied = 0;
	let mut search_from = 0;

	while let Some(offset) = haystack[search_from..].find(word) {
		let start = search_from + offset;
		let end = start + word.len();
		let free_before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
		let free_after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();

		if free_before && free_after {
			result.push_str(&haystack[copied..start]);
			result.push_str(replacement);
			copied = end;
			search_from = end;
		} else {
			search_from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
		}
	}

	result.push_str(&haystack[copied..]);
	result
}

/// Expand `template` once per row of `table` and concatenate the results.
///
/// For row `i`, every column name is replaced by that row's value in header
/// order, then `index_token` is replaced by `i`. Later columns see the values
/// substituted for earlier ones. An empty table expands to an empty string.
pub fn expand(table: &KeysTable, template: &str, index_token: &str) -> String {
	let mut output = String::new();

	for (index, row) in table.rows().iter().enumerate() {
		let mut expansion = template.to_string();
		for (column, value) in table.header().iter().zip(row.iter()) {
			expansion = replace_word(&expansion, column, value);
		}
		expansion = replace_word(&expansion, index_token, &index.to_string());
		output.push_str(&expansion);
	}

	output
}

/// Reassembles a document from its segments, one run per document.
///
/// The active keys table is owned here. It starts empty, is replaced by each
/// `Keys` block and is dropped with the assembler, so separate documents can
/// never observe each other's tables.
#[derive(Debug)]
pub struct Assembler<'c> {
	index_token: &'c str,
	table: Option<KeysTable>,
	output: String,
}

impl<'c> Assembler<'c> {
	pub fn new(index_token: &'c str) -> Self {
		Self {
			index_token,
			table: None,
			output: String::new(),
		}
	}

	/// The table installed by the most recent `Keys` block, if any.
	pub fn active_table(&self) -> Option<&KeysTable> {
		self.table.as_ref()
	}

	/// Process the next segment in document order.
	pub fn push(&mut self, segment: &Segment<'_>) -> TmplResult<()> {
		match segment {
			Segment::Passthrough { text } => self.output.push_str(text),
			Segment::Tagged(block) => self.push_block(block)?,
		}

		Ok(())
	}

	fn push_block(&mut self, block: &TaggedBlock<'_>) -> TmplResult<()> {
		match block.directive() {
			Directive::Keys(header) => {
				let lines = TableLines {
					header: block.opening_line,
					body: block.body_line,
				};
				let table = KeysTable::parse_at(header, block.body, lines)?;
				debug!(
					line = block.opening_line,
					columns = table.header().len(),
					rows = table.len(),
					"loaded keys table"
				);
				self.table = Some(table);
			}
			Directive::Ignore => {
				debug!(line = block.opening_line, "ignored tagged block");
			}
			Directive::Template => {
				let Some(table) = &self.table else {
					debug!(
						line = block.opening_line,
						"skipped template block without an active keys table"
					);
					return Ok(());
				};
				self.output
					.push_str(&expand(table, block.body, self.index_token));
			}
		}

		Ok(())
	}

	/// The generated document.
	pub fn finish(self) -> String {
		self.output
	}
}

/// Generate the expanded document for `content`.
///
/// Either the whole document is produced or an error is returned; there is
/// no partial output.
pub fn generate(content: &str, config: &TmplConfig) -> TmplResult<String> {
	let segments = parse(content, &config.tag)?;
	let mut assembler = Assembler::new(&config.index_token);

	for segment in &segments {
		assembler.push(segment)?;
	}

	Ok(assembler.finish())
}
