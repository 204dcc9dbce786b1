/// Pre-computed table of line-start byte offsets. Built once per document
/// (O(n)) and queried with binary search (O(log n)) per lookup.
#[derive(Debug, Clone)]
pub struct LineTable {
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl LineTable {
	pub fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	fn line_index(&self, offset: usize) -> usize {
		match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		}
	}

	/// 1-indexed line number of the byte at `offset`.
	pub fn line(&self, offset: usize) -> usize {
		self.line_index(offset) + 1
	}

	/// Byte offset where the line containing `offset` begins.
	pub fn line_start(&self, offset: usize) -> usize {
		self.line_starts[self.line_index(offset)]
	}
}
