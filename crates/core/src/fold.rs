//! Comparison folding for culture-aware substring search.
//!
//! Text is folded one code point at a time: full-width ASCII forms become
//! ASCII, hiragana becomes katakana, characters are canonically decomposed and
//! their combining marks dropped, and, unless case-sensitive, lowercased.
//! Every folded character remembers the code point it came from so a match in
//! folded text can be reported as a span of the original value.

use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// A span measured in code points of the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	pub start: usize,
	pub length: usize,
}

/// Folded text with a map back to original code point positions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Folded {
	chars: Vec<char>,
	origins: Vec<usize>,
}

impl Folded {
	pub(crate) fn new(text: &str, case_sensitive: bool) -> Self {
		let mut folded = Self {
			chars: Vec::with_capacity(text.len()),
			origins: Vec::with_capacity(text.len()),
		};
		for (index, ch) in text.chars().enumerate() {
			decompose_canonical(fold_kana(fold_width(ch)), |part| {
				if is_combining_mark(part) {
					return;
				}
				if case_sensitive {
					folded.push(part, index);
				} else {
					for lower in part.to_lowercase() {
						folded.push(lower, index);
					}
				}
			});
		}
		folded
	}

	fn push(&mut self, ch: char, origin: usize) {
		self.chars.push(ch);
		self.origins.push(origin);
	}

	pub(crate) fn chars(&self) -> &[char] {
		&self.chars
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.chars.is_empty()
	}

	/// First occurrence of `needle`, as a span of the original text.
	pub(crate) fn find(&self, needle: &[char]) -> Option<Span> {
		if needle.is_empty() || needle.len() > self.chars.len() {
			return None;
		}
		let position = self
			.chars
			.windows(needle.len())
			.position(|window| window == needle)?;
		let start = self.origins[position];
		let end = self.origins[position + needle.len() - 1] + 1;
		Some(Span {
			start,
			length: end - start,
		})
	}
}

/// Whether `text` folds to exactly `needle` over the `count` code points that
/// begin at `start`.
pub(crate) fn matches_at(
	text: &str,
	start: usize,
	count: usize,
	needle: &[char],
	case_sensitive: bool,
) -> bool {
	let slice: String = text.chars().skip(start).take(count).collect();
	if slice.chars().count() != count {
		return false;
	}
	Folded::new(&slice, case_sensitive).chars() == needle
}

/// Whether two strings compare equal under the same folding rules.
pub(crate) fn equivalent(a: &str, b: &str, case_sensitive: bool) -> bool {
	a == b || Folded::new(a, case_sensitive).chars() == Folded::new(b, case_sensitive).chars()
}

fn fold_width(ch: char) -> char {
	match ch {
		'\u{FF01}'..='\u{FF5E}' => char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch),
		'\u{3000}' => ' ',
		_ => ch,
	}
}

fn fold_kana(ch: char) -> char {
	match ch {
		'\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309E}' => {
			char::from_u32(ch as u32 + 0x60).unwrap_or(ch)
		}
		_ => ch,
	}
}
