use std::collections::BTreeMap;
use std::ops::Range;

use logos::Logos;
use thiserror::Error;

/// Raw tokens produced by logos for the visible content of one comment.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
	#[token("</")]
	EndTagOpen,
	#[token("<")]
	TagOpen,
	#[token("/>")]
	EmptyTagClose,
	#[token(">")]
	TagClose,
	#[token("=")]
	Equals,
	#[regex(r"[ \t\r\n]+")]
	Whitespace,
	#[regex(r"[A-Za-z_:][A-Za-z0-9_.:\-]*")]
	Name,
	#[regex(r#""[^"]*""#)]
	DoubleQuotedString,
	#[regex(r"'[^']*'")]
	SingleQuotedString,
}

/// A template marker recognized as the whole content of a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
	/// `<tmpl Keys="A;B">` with its attributes. An opening tag without
	/// attributes carries an empty map.
	Open(BTreeMap<String, String>),
	/// `</tmpl>`
	Close,
}

/// Why a comment that starts like an opening tag could not be read as one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MarkerError {
	#[error("unexpected `{0}`")]
	UnexpectedToken(String),
	#[error("attribute `{0}` has no quoted value")]
	MissingValue(String),
	#[error("attribute `{0}` is given more than once")]
	DuplicateAttribute(String),
	#[error("unknown entity `&{0};`")]
	InvalidEntity(String),
}

/// Walks the logos token stream of one comment's content.
struct MarkerWalker<'a> {
	/// The visible content of the comment.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
}

impl<'a> MarkerWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
		}
	}

	fn peek(&self) -> Option<Result<RawToken, ()>> {
		self.raw_tokens.get(self.cursor).map(|(token, _)| *token)
	}

	/// Text slice of the current token. Empty at the end of the stream.
	fn current_slice(&self) -> &'a str {
		self.raw_tokens
			.get(self.cursor)
			.map_or("", |(_, span)| &self.source[span.clone()])
	}

	/// Advance past the current token and return its text.
	fn bump(&mut self) -> &'a str {
		let slice = self.current_slice();
		self.cursor += 1;
		slice
	}

	/// Consume a whitespace run, returning whether there was one.
	fn skip_whitespace(&mut self) -> bool {
		let mut skipped = false;
		while let Some(Ok(RawToken::Whitespace)) = self.peek() {
			self.cursor += 1;
			skipped = true;
		}
		skipped
	}

	/// Consume `token` if it is next, followed by `name` equal to `tag`.
	fn eat_tag(&mut self, token: RawToken, tag: &str) -> bool {
		let Some((Ok(RawToken::Name), span)) = self.raw_tokens.get(self.cursor + 1) else {
			return false;
		};
		if self.peek() != Some(Ok(token)) || &self.source[span.clone()] != tag {
			return false;
		}

		self.cursor += 2;
		true
	}

	fn at_end(&self) -> bool {
		self.cursor >= self.raw_tokens.len()
	}

	fn closing(&mut self) -> Option<Marker> {
		self.skip_whitespace();
		if self.peek() != Some(Ok(RawToken::TagClose)) {
			return None;
		}
		self.cursor += 1;
		self.at_end().then_some(Marker::Close)
	}

	fn opening(&mut self) -> Result<Option<Marker>, MarkerError> {
		// `<tmplate>` lexes as a different name; `<tmpl/>` is not an
		// opening tag.
		if !matches!(
			self.peek(),
			Some(Ok(RawToken::Whitespace | RawToken::TagClose))
		) {
			return Ok(None);
		}

		let mut attributes = BTreeMap::new();

		loop {
			let separated = self.skip_whitespace();

			match self.peek() {
				Some(Ok(RawToken::TagClose)) => {
					self.cursor += 1;
					// Text after the tag makes the comment prose.
					return Ok(self.at_end().then_some(Marker::Open(attributes)));
				}
				Some(Ok(RawToken::Name)) if separated => {
					let name = self.bump().to_string();
					let value = self.attribute_value(&name)?;
					if attributes.insert(name.clone(), value).is_some() {
						return Err(MarkerError::DuplicateAttribute(name));
					}
				}
				Some(_) => {
					return Err(MarkerError::UnexpectedToken(self.current_slice().to_string()));
				}
				None => return Ok(None),
			}
		}
	}

	/// Parse `= "value"` after an attribute name.
	fn attribute_value(&mut self, name: &str) -> Result<String, MarkerError> {
		self.skip_whitespace();
		if self.peek() != Some(Ok(RawToken::Equals)) {
			return Err(MarkerError::MissingValue(name.to_string()));
		}
		self.cursor += 1;
		self.skip_whitespace();

		match self.peek() {
			Some(Ok(RawToken::DoubleQuotedString | RawToken::SingleQuotedString)) => {
				let slice = self.bump();
				decode_entities(&slice[1..slice.len() - 1])
			}
			_ => Err(MarkerError::MissingValue(name.to_string())),
		}
	}
}

/// Read the visible content of a comment as a template marker for `tag`.
///
/// Returns `Ok(None)` when the content is not a marker at all (ordinary
/// comment text, another tag, prose around a tag) and an error when it opens
/// with `<tag`, ends with `>` and the attribute list between them is
/// malformed.
pub fn lex_marker(content: &str, tag: &str) -> Result<Option<Marker>, MarkerError> {
	let mut walker = MarkerWalker::new(content);

	if walker.eat_tag(RawToken::EndTagOpen, tag) {
		return Ok(walker.closing());
	}

	// Only a comment shaped like a whole tag can be a malformed one; any
	// other text after `<tag` is prose.
	if walker.eat_tag(RawToken::TagOpen, tag) && content.ends_with('>') {
		return walker.opening();
	}

	Ok(None)
}

/// Decode the XML predefined entities and numeric character references in an
/// attribute value.
fn decode_entities(raw: &str) -> Result<String, MarkerError> {
	if !raw.contains('&') {
		return Ok(raw.to_string());
	}

	let mut decoded = String::with_capacity(raw.len());
	let mut rest = raw;

	while let Some(amp) = rest.find('&') {
		decoded.push_str(&rest[..amp]);
		let after = &rest[amp + 1..];
		let Some(semi) = after.find(';') else {
			return Err(MarkerError::InvalidEntity(after.to_string()));
		};
		let entity = &after[..semi];

		let ch = match entity {
			"amp" => '&',
			"lt" => '<',
			"gt" => '>',
			"quot" => '"',
			"apos" => '\'',
			_ => {
				let code = if let Some(hex) = entity.strip_prefix("#x") {
					u32::from_str_radix(hex, 16).ok()
				} else if let Some(dec) = entity.strip_prefix('#') {
					dec.parse::<u32>().ok()
				} else {
					None
				};
				code.and_then(char::from_u32)
					.ok_or_else(|| MarkerError::InvalidEntity(entity.to_string()))?
			}
		};

		decoded.push(ch);
		rest = &after[semi + 1..];
	}

	decoded.push_str(rest);
	Ok(decoded)
}
