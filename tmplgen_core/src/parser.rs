use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;
use tracing::debug;

use crate::CommentStyle;
use crate::LineTable;
use crate::TmplError;
use crate::TmplResult;
use crate::comments::Comment;
use crate::comments::scan_comments;
use crate::lexer::Marker;
use crate::lexer::MarkerError;
use crate::lexer::lex_marker;

/// Attribute naming the columns of a keys table, e.g. `Keys="Type_; Name_"`.
pub const KEYS_ATTRIBUTE: &str = "Keys";
/// Attribute that suppresses a block's output when set to `"true"`.
pub const IGNORE_ATTRIBUTE: &str = "Ignore";

/// A unit of the split input document. Concatenating the passthrough text
/// with the processed bodies of the tagged blocks, in order, yields the
/// generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment<'a> {
	/// Text copied to the output unchanged.
	Passthrough { text: &'a str },
	/// A block delimited by an opening and a closing marker comment.
	Tagged(TaggedBlock<'a>),
}

/// A region of the document between `<tmpl ...>` and `</tmpl>` marker
/// comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedBlock<'a> {
	/// Comment style of both markers.
	pub style: CommentStyle,
	/// Attributes of the opening tag.
	pub attributes: BTreeMap<String, String>,
	/// Text between the markers, without the marker lines themselves.
	pub body: &'a str,
	/// 1-indexed line of the opening marker.
	pub opening_line: usize,
	/// 1-indexed line where the body starts.
	pub body_line: usize,
	/// 1-indexed line of the closing marker.
	pub closing_line: usize,
}

/// What a tagged block asks the assembler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'b> {
	/// Load the body as a keys table with the given header.
	Keys(&'b str),
	/// Drop the block.
	Ignore,
	/// Expand the body once per row of the active keys table.
	Template,
}

impl TaggedBlock<'_> {
	/// `Keys` wins over `Ignore`; `Ignore` only counts when it is `"true"`.
	pub fn directive(&self) -> Directive<'_> {
		if let Some(header) = self.attributes.get(KEYS_ATTRIBUTE) {
			return Directive::Keys(header.as_str());
		}

		match self.attributes.get(IGNORE_ATTRIBUTE) {
			Some(value) if value == "true" => Directive::Ignore,
			_ => Directive::Template,
		}
	}
}

impl std::fmt::Display for Directive<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Keys(_) => write!(f, "keys"),
			Self::Ignore => write!(f, "ignore"),
			Self::Template => write!(f, "template"),
		}
	}
}

/// Byte ranges of the next tagged block found by [`locate_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBlock {
	pub style: CommentStyle,
	pub attributes: BTreeMap<String, String>,
	/// The opening marker comment, plus its indentation when it starts the
	/// line.
	pub opening: Range<usize>,
	pub body: Range<usize>,
	/// The closing marker comment, plus its indentation when it starts the
	/// line.
	pub closing: Range<usize>,
	/// Where scanning resumes: after the closing marker and its line break.
	pub resume: usize,
}

/// The first comment of a style whose content opens a block. The attributes
/// are only validated once the style has been chosen.
struct OpeningCandidate {
	comment: Comment,
	attributes: Result<BTreeMap<String, String>, MarkerError>,
}

fn first_opening(
	content: &str,
	from: usize,
	style: CommentStyle,
	tag: &str,
) -> Option<OpeningCandidate> {
	scan_comments(content, from, style).find_map(|comment| {
		match lex_marker(comment.text(content), tag) {
			Ok(Some(Marker::Open(attributes))) => {
				Some(OpeningCandidate {
					comment,
					attributes: Ok(attributes),
				})
			}
			Ok(Some(Marker::Close) | None) => None,
			Err(error) => {
				Some(OpeningCandidate {
					comment,
					attributes: Err(error),
				})
			}
		}
	})
}

/// Find the next tagged block starting at byte offset `from`.
///
/// Both comment styles are scanned for their first opening marker and the
/// earlier one wins. The closing marker is the next comment of the same
/// style whose whole content is `</tag>`; comments of the other style are
/// not considered. Returns `Ok(None)` when no opening marker remains.
pub fn locate_block(
	content: &str,
	from: usize,
	tag: &str,
	lines: &LineTable,
) -> TmplResult<Option<LocatedBlock>> {
	let line = first_opening(content, from, CommentStyle::Line, tag);
	let block = first_opening(content, from, CommentStyle::Block, tag);

	let opening = match (line, block) {
		(Some(line), Some(block)) => {
			if block.comment.span.start < line.comment.span.start {
				block
			} else {
				line
			}
		}
		(Some(candidate), None) | (None, Some(candidate)) => candidate,
		(None, None) => return Ok(None),
	};

	let OpeningCandidate {
		comment: opening,
		attributes,
	} = opening;
	let opening_line = lines.line(opening.span.start);
	let attributes = attributes.map_err(|error| {
		TmplError::InvalidMarker {
			tag: tag.to_string(),
			line: opening_line,
			reason: error.to_string(),
		}
	})?;

	let closing = scan_comments(content, opening.span.end, opening.style)
		.find(|comment| {
			matches!(
				lex_marker(comment.text(content), tag),
				Ok(Some(Marker::Close))
			)
		})
		.ok_or_else(|| {
			TmplError::MalformedBlock {
				tag: tag.to_string(),
				line: opening_line,
			}
		})?;

	let opening_start = chunk_start(content, opening.span.start, from, lines);
	let body_start = after_marker_line(content, opening.span.end);
	let closing_start = chunk_start(content, closing.span.start, body_start, lines);
	let resume = after_marker_line(content, closing.span.end);

	Ok(Some(LocatedBlock {
		style: opening.style,
		attributes,
		opening: opening_start..opening.span.end,
		body: body_start..closing_start,
		closing: closing_start..closing.span.end,
		resume,
	}))
}

/// Extend a marker comment back over its indentation when nothing but
/// spaces and tabs precede it on its line. Never reaches before `floor`.
fn chunk_start(content: &str, comment_start: usize, floor: usize, lines: &LineTable) -> usize {
	let line_start = lines.line_start(comment_start).max(floor);
	if line_start <= comment_start
		&& content.as_bytes()[line_start..comment_start]
			.iter()
			.all(|byte| matches!(byte, b' ' | b'\t'))
	{
		line_start
	} else {
		comment_start
	}
}

/// Skip trailing spaces and one line break after a marker comment, when the
/// marker is the last thing on its line. Otherwise the text after the marker
/// is kept.
fn after_marker_line(content: &str, marker_end: usize) -> usize {
	let bytes = content.as_bytes();
	let mut cursor = marker_end;
	while cursor < bytes.len() && matches!(bytes[cursor], b' ' | b'\t') {
		cursor += 1;
	}

	let rest = &bytes[cursor..];
	if rest.starts_with(b"\r\n") {
		cursor + 2
	} else if rest.starts_with(b"\n") {
		cursor + 1
	} else if rest.is_empty() {
		cursor
	} else {
		marker_end
	}
}

/// Split a document into passthrough and tagged segments, in document order.
///
/// A document without markers is a single passthrough segment. Fails when a
/// block is never closed or an opening tag is malformed.
pub fn parse<'a>(content: &'a str, tag: &str) -> TmplResult<Vec<Segment<'a>>> {
	let lines = LineTable::new(content);
	let mut segments = Vec::new();
	let mut cursor = 0;

	while let Some(block) = locate_block(content, cursor, tag, &lines)? {
		let opening_line = lines.line(block.opening.start);
		debug!(
			line = opening_line,
			style = %block.style,
			"located tagged block"
		);

		segments.push(Segment::Passthrough {
			text: &content[cursor..block.opening.start],
		});
		segments.push(Segment::Tagged(TaggedBlock {
			style: block.style,
			attributes: block.attributes,
			body: &content[block.body.clone()],
			opening_line,
			body_line: lines.line(block.body.start),
			closing_line: lines.line(block.closing.start),
		}));

		cursor = block.resume;
	}

	segments.push(Segment::Passthrough {
		text: &content[cursor..],
	});

	Ok(segments)
}
