//! Display order of search hits.

use std::cmp::Ordering;

use crate::matcher::SearchHit;

/// Compare two hits for display.
///
/// Hits whose match starts at the beginning of the field come first, then
/// hits found in the title, and otherwise discovery order decides.
#[must_use]
pub fn precedence(a: &SearchHit, b: &SearchHit) -> Ordering {
	let at_start = |hit: &SearchHit| hit.start() == 0;
	let in_title = |hit: &SearchHit| hit.field().is_title();
	at_start(b)
		.cmp(&at_start(a))
		.then_with(|| in_title(b).cmp(&in_title(a)))
		.then_with(|| a.index().cmp(&b.index()))
}

/// Sort `hits` into display order.
pub fn sort_by_precedence(hits: &mut [SearchHit]) {
	hits.sort_by(precedence);
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use ats_stream::{Cursor, ResultStream};

	use super::*;
	use crate::fold::Span;
	use crate::matcher::{FieldId, MatchRecord};
	use crate::model::{Collection, Entry, Group};

	fn hits(layout: &[(&str, FieldId, usize)]) -> Vec<SearchHit> {
		let collection = Arc::new(Collection::new("vault", Group::new("Root")));
		let stream = ResultStream::new("ab", layout.len());
		for (id, field, start) in layout {
			stream.append(MatchRecord::new(
				Arc::new(Entry::new(*id)),
				Arc::clone(&collection),
				field.clone(),
				Arc::from("0123456789"),
				Span {
					start: *start,
					length: 2,
				},
			));
		}
		stream.poll(&mut Cursor::new()).records
	}

	fn order(hits: &[SearchHit]) -> Vec<&str> {
		hits.iter().map(|hit| hit.entry().id()).collect()
	}

	#[test]
	fn prefix_matches_outrank_title_matches() {
		let mut hits = hits(&[
			("a", FieldId::Notes, 3),
			("b", FieldId::Title, 0),
			("c", FieldId::Title, 5),
		]);
		sort_by_precedence(&mut hits);
		assert_eq!(order(&hits), ["b", "c", "a"]);
	}

	#[test]
	fn start_of_field_beats_title() {
		let mut hits = hits(&[("a", FieldId::Title, 4), ("b", FieldId::UserName, 0)]);
		sort_by_precedence(&mut hits);
		assert_eq!(order(&hits), ["b", "a"]);
	}

	#[test]
	fn ties_keep_discovery_order() {
		let mut hits = hits(&[
			("a", FieldId::Url, 2),
			("b", FieldId::Notes, 1),
			("c", FieldId::Tags, 0),
			("d", FieldId::Url, 0),
		]);
		sort_by_precedence(&mut hits);
		assert_eq!(order(&hits), ["c", "d", "a", "b"]);
	}

	#[test]
	fn ordering_is_reflexive() {
		let hits = hits(&[("a", FieldId::Title, 0)]);
		assert_eq!(precedence(&hits[0], &hits[0]), Ordering::Equal);
	}
}
