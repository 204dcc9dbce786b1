use derive_more::Deref;
use serde::Serialize;

use crate::TmplError;
use crate::TmplResult;

/// One row of a keys table. Values are in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deref)]
pub struct Row(Vec<String>);

impl Row {
	pub fn into_inner(self) -> Vec<String> {
		self.0
	}
}

/// Source lines used in error messages: the line holding the `Keys`
/// attribute and the line where the table body starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLines {
	pub header: usize,
	pub body: usize,
}

impl Default for TableLines {
	fn default() -> Self {
		Self { header: 1, body: 1 }
	}
}

/// The substitution table declared by a `<tmpl Keys="...">` block.
///
/// ```text
/// // <tmpl Keys="Type_; Name_; help_">
/// // bool; Enabled; "Turn it on; or off"
/// // int; Level; "Brightness level"
/// // </tmpl>
/// ```
///
/// Each body line is a row of `;`-separated fields. Fields are trimmed of
/// spaces and tabs. A double-quoted substring protects `;` characters and
/// keeps its quotes in the value; `\"` does not start or end a quote. Text
/// before the first word character or quote of a line is dropped, which
/// skips indentation and comment leaders such as `// `.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeysTable {
	header: Vec<String>,
	rows: Vec<Row>,
}

impl KeysTable {
	/// Parse a header string and table body, numbering lines from 1.
	pub fn parse(header: &str, body: &str) -> TmplResult<Self> {
		Self::parse_at(header, body, TableLines::default())
	}

	/// Parse a header string and table body. `lines` places the table in the
	/// surrounding document for error messages.
	pub fn parse_at(header: &str, body: &str, lines: TableLines) -> TmplResult<Self> {
		let header: Vec<String> = header.split(';').map(|name| trim_field(name).to_string()).collect();
		if header.iter().any(String::is_empty) {
			return Err(TmplError::EmptyColumnName { line: lines.header });
		}

		let mut rows = Vec::new();
		for (index, line) in body.lines().enumerate() {
			let number = lines.body + index;
			let Some(row) = parse_row(line, number)? else {
				continue;
			};

			if row.len() != header.len() {
				return Err(TmplError::ArityMismatch {
					line: number,
					expected: header.len(),
					got: row.len(),
				});
			}

			rows.push(row);
		}

		Ok(Self { header, rows })
	}

	/// Column names in declaration order.
	pub fn header(&self) -> &[String] {
		&self.header
	}

	pub fn rows(&self) -> &[Row] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}

fn trim_field(field: &str) -> &str {
	field.trim_matches([' ', '\t'])
}

/// Split one body line into fields. Lines without any word character or
/// quote are blank and yield `None`.
fn parse_row(line: &str, number: usize) -> TmplResult<Option<Row>> {
	let Some(start) = line.find(|ch: char| ch.is_alphanumeric() || ch == '_' || ch == '"') else {
		return Ok(None);
	};
	let line = &line[start..];

	let quotes = quote_offsets(line);
	if quotes.len() % 2 != 0 {
		return Err(TmplError::UnmatchedQuote { line: number });
	}

	let mut fields = Vec::new();
	let mut field_start = 0;
	let mut quotes = quotes.into_iter().peekable();
	let mut quoted = false;

	for (offset, byte) in line.bytes().enumerate() {
		if quotes.peek() == Some(&offset) {
			quotes.next();
			quoted = !quoted;
		} else if byte == b';' && !quoted {
			fields.push(trim_field(&line[field_start..offset]).to_string());
			field_start = offset + 1;
		}
	}
	fields.push(trim_field(&line[field_start..]).to_string());

	Ok(Some(Row(fields)))
}

/// Byte offsets of the `"` characters that are not escaped by a backslash.
fn quote_offsets(line: &str) -> Vec<usize> {
	let mut offsets = Vec::new();
	let mut previous = None;

	for (offset, ch) in line.char_indices() {
		if ch == '"' && previous != Some('\\') {
			offsets.push(offset);
		}
		previous = Some(ch);
	}

	offsets
}
