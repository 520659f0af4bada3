//! Placeholder expansion for field values.
//!
//! Field values may embed placeholders such as `{USERNAME}` or references to
//! other entries like `{REF:U@I:bank}`. The matcher only expands them when a
//! plain match failed, and only for values that contain a placeholder marker.

use crate::error::ResolveError;
use crate::model::{Collection, Entry, NOTES_FIELD, TITLE_FIELD, URL_FIELD, USER_NAME_FIELD};

/// Maximum nesting of placeholders expanded inside other placeholders.
pub const MAX_RESOLVE_DEPTH: usize = 12;

/// Text-resolution collaborator consulted by the matcher.
///
/// Implementations must not mutate the store, and resolving text that was
/// already resolved must return it unchanged.
pub trait PlaceholderResolver: Send + Sync {
	/// Cheap test for whether `text` could contain a placeholder at all.
	fn contains_placeholder(&self, text: &str) -> bool {
		text.contains('{')
	}

	/// Expand the placeholders in `text` in the context of `entry`.
	///
	/// # Errors
	///
	/// Returns [`ResolveError`] when the value cannot be expanded.
	fn resolve(&self, text: &str, entry: &Entry, collection: &Collection)
	-> Result<String, ResolveError>;
}

/// Resolver for entry field placeholders and cross-entry references.
///
/// Supported forms are `{TITLE}`, `{USERNAME}`, `{URL}`, `{NOTES}`,
/// `{S:<field>}` and `{REF:<wanted>@<search-in>:<text>}` where `wanted` is
/// one of `T`, `U`, `A`, `N` and `search-in` one of `I` (entry id), `T`, `U`,
/// `A`, `N`. Password references are never dereferenced. Anything else is left
/// verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldReferenceResolver;

impl PlaceholderResolver for FieldReferenceResolver {
	fn resolve(
		&self,
		text: &str,
		entry: &Entry,
		collection: &Collection,
	) -> Result<String, ResolveError> {
		expand(text, entry, collection, 0)
	}
}

fn expand(
	text: &str,
	entry: &Entry,
	collection: &Collection,
	depth: usize,
) -> Result<String, ResolveError> {
	if depth > MAX_RESOLVE_DEPTH {
		return Err(ResolveError::TooDeep {
			limit: MAX_RESOLVE_DEPTH,
		});
	}

	let mut output = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(open) = rest.find('{') {
		output.push_str(&rest[..open]);
		let after = &rest[open + 1..];
		let Some(close) = after.find('}') else {
			rest = &rest[open..];
			break;
		};
		let token = &after[..close];
		match lookup(token, entry, collection) {
			Some((value, context)) => {
				output.push_str(&expand(&value, context, collection, depth + 1)?);
			}
			None => {
				output.push('{');
				output.push_str(token);
				output.push('}');
			}
		}
		rest = &after[close + 1..];
	}
	output.push_str(rest);
	Ok(output)
}

/// Value substituted for `token` and the entry it should be expanded against.
fn lookup<'a>(
	token: &str,
	entry: &'a Entry,
	collection: &'a Collection,
) -> Option<(String, &'a Entry)> {
	let upper = token.to_ascii_uppercase();
	let own = |name: &str| Some((entry.field(name).to_owned(), entry));
	match upper.as_str() {
		"TITLE" => own(TITLE_FIELD),
		"USERNAME" => own(USER_NAME_FIELD),
		"URL" => own(URL_FIELD),
		"NOTES" => own(NOTES_FIELD),
		_ if upper.starts_with("S:") => {
			match entry.field_value(&token[2..]) {
				Some(field) if field.protected => None,
				Some(field) => Some((field.value.clone(), entry)),
				None => Some((String::new(), entry)),
			}
		}
		_ if upper.starts_with("REF:") => reference(&token[4..], collection),
		_ => None,
	}
}

fn reference<'a>(target: &str, collection: &'a Collection) -> Option<(String, &'a Entry)> {
	let (wanted, search) = target.split_once('@')?;
	let (search_in, needle) = search.split_once(':')?;
	let wanted = reference_field(wanted)?;
	let needle = needle.to_lowercase();

	let target = match search_in.to_ascii_uppercase().as_str() {
		"I" => collection.find_entry(|candidate| candidate.id().to_lowercase() == needle),
		other => {
			let field = reference_field(other)?;
			collection.find_entry(|candidate| {
				candidate.field(field).to_lowercase().contains(&needle)
			})
		}
	}?;
	Some((target.field(wanted).to_owned(), target.as_ref()))
}

fn reference_field(code: &str) -> Option<&'static str> {
	match code.to_ascii_uppercase().as_str() {
		"T" => Some(TITLE_FIELD),
		"U" => Some(USER_NAME_FIELD),
		"A" => Some(URL_FIELD),
		"N" => Some(NOTES_FIELD),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Group, PASSWORD_FIELD};

	fn collection() -> Collection {
		Collection::new(
			"vault",
			Group::new("Root")
				.with_entry(
					Entry::new("bank")
						.with_field(TITLE_FIELD, "Bank of Atlas")
						.with_field(USER_NAME_FIELD, "atlas-user")
						.with_field(PASSWORD_FIELD, "hunter2")
						.with_field("Branch", "North"),
				)
				.with_entry(
					Entry::new("alias")
						.with_field(TITLE_FIELD, "Alias")
						.with_field(USER_NAME_FIELD, "{REF:U@I:bank}")
						.with_field(NOTES_FIELD, "{REF:T@U:atlas-user} in {S:Branch}"),
				)
				.with_entry(Entry::new("loop").with_field(NOTES_FIELD, "{REF:N@I:loop}")),
		)
	}

	fn resolve(id: &str, field: &str) -> Result<String, ResolveError> {
		let collection = collection();
		let entry = collection.find_entry(|entry| entry.id() == id).unwrap();
		FieldReferenceResolver.resolve(entry.field(field), entry, &collection)
	}

	#[test]
	fn resolves_references_by_id() {
		assert_eq!(resolve("alias", USER_NAME_FIELD).unwrap(), "atlas-user");
	}

	#[test]
	fn resolves_references_by_field_search() {
		// {S:Branch} is looked up on the referencing entry, which has no such field.
		assert_eq!(resolve("alias", NOTES_FIELD).unwrap(), "Bank of Atlas in ");
	}

	#[test]
	fn own_field_placeholders_expand() {
		let collection = collection();
		let bank = collection.find_entry(|entry| entry.id() == "bank").unwrap();
		let text = FieldReferenceResolver
			.resolve("{title} / {S:Branch} / {PASSWORD}", bank, &collection)
			.unwrap();
		assert_eq!(text, "Bank of Atlas / North / {PASSWORD}");
	}

	#[test]
	fn resolution_is_idempotent() {
		let once = resolve("alias", NOTES_FIELD).unwrap();
		let collection = collection();
		let alias = collection.find_entry(|entry| entry.id() == "alias").unwrap();
		assert_eq!(FieldReferenceResolver.resolve(&once, alias, &collection).unwrap(), once);
	}

	#[test]
	fn self_reference_is_bounded() {
		assert_eq!(
			resolve("loop", NOTES_FIELD),
			Err(ResolveError::TooDeep {
				limit: MAX_RESOLVE_DEPTH
			})
		);
	}

	#[test]
	fn unterminated_placeholder_is_kept() {
		let collection = collection();
		let bank = collection.find_entry(|entry| entry.id() == "bank").unwrap();
		let text = FieldReferenceResolver.resolve("x {TITLE", bank, &collection).unwrap();
		assert_eq!(text, "x {TITLE");
	}
}
