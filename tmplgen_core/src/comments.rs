use std::ops::Range;

use serde::Serialize;

/// The two comment syntaxes that can carry template markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
	/// `// comment` running to the end of the line. Any run of two or more
	/// slashes opens the comment, so `///` doc comments count too.
	Line,
	/// `/* comment */`, possibly spanning several lines.
	Block,
}

impl std::fmt::Display for CommentStyle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Line => write!(f, "line"),
			Self::Block => write!(f, "block"),
		}
	}
}

/// A comment found in the raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
	pub style: CommentStyle,
	/// Byte range of the comment, delimiters included. Line comments end at
	/// their last visible character, before any trailing whitespace.
	pub span: Range<usize>,
	/// Byte range of the visible content with surrounding whitespace removed.
	pub content: Range<usize>,
}

impl Comment {
	pub fn text<'a>(&self, source: &'a str) -> &'a str {
		&source[self.content.clone()]
	}
}

/// Iterator over the comments of one style, in document order, starting at a
/// byte offset.
pub struct Comments<'a> {
	source: &'a str,
	cursor: usize,
	style: CommentStyle,
}

/// Scan `source` for comments of the given `style`, starting at `from`.
pub fn scan_comments(source: &str, from: usize, style: CommentStyle) -> Comments<'_> {
	Comments {
		source,
		cursor: from.min(source.len()),
		style,
	}
}

impl Iterator for Comments<'_> {
	type Item = Comment;

	fn next(&mut self) -> Option<Self::Item> {
		match self.style {
			CommentStyle::Line => self.next_line_comment(),
			CommentStyle::Block => self.next_block_comment(),
		}
	}
}

impl Comments<'_> {
	fn next_line_comment(&mut self) -> Option<Comment> {
		let bytes = self.source.as_bytes();
		let open = self.cursor + memstr(&bytes[self.cursor..], b"//")?;
		let line_end = bytes[open..]
			.iter()
			.position(|&byte| byte == b'\n')
			.map_or(bytes.len(), |offset| open + offset);

		let slashes_end = open
			+ bytes[open..line_end]
				.iter()
				.take_while(|&&byte| byte == b'/')
				.count();

		let mut content_end = line_end;
		while content_end > slashes_end && matches!(bytes[content_end - 1], b' ' | b'\t' | b'\r') {
			content_end -= 1;
		}

		let mut content_start = slashes_end;
		while content_start < content_end && matches!(bytes[content_start], b' ' | b'\t') {
			content_start += 1;
		}

		// A line holds at most one line comment.
		self.cursor = line_end;

		Some(Comment {
			style: CommentStyle::Line,
			span: open..content_end,
			content: content_start..content_end,
		})
	}

	fn next_block_comment(&mut self) -> Option<Comment> {
		let bytes = self.source.as_bytes();
		let Some(offset) = memstr(&bytes[self.cursor..], b"/*") else {
			self.cursor = bytes.len();
			return None;
		};
		let open = self.cursor + offset;
		let interior_start = open + 2;

		let Some(offset) = memstr(&bytes[interior_start..], b"*/") else {
			// An unterminated block comment hides the rest of the document.
			self.cursor = bytes.len();
			return None;
		};
		let interior_end = interior_start + offset;
		let close = interior_end + 2;

		let mut content_start = interior_start;
		let mut content_end = interior_end;
		while content_start < content_end && bytes[content_start].is_ascii_whitespace() {
			content_start += 1;
		}
		while content_end > content_start && bytes[content_end - 1].is_ascii_whitespace() {
			content_end -= 1;
		}

		self.cursor = close;

		Some(Comment {
			style: CommentStyle::Block,
			span: open..close,
			content: content_start..content_end,
		})
	}
}

pub fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}
