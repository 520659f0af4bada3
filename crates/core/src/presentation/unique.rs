use indexmap::IndexMap;

use super::ResultRow;

/// Separator placed between group names and the title.
pub const GROUP_SEPARATOR: &str = " / ";

/// Make titles shared by several rows distinguishable.
///
/// Rows sharing a display title get the name of their nearest group
/// prepended, then the next group out, and so on until the titles differ or
/// no further ancestor exists. Depths are recomputed from scratch each call.
pub fn disambiguate_titles(rows: &mut [ResultRow]) {
	for row in rows.iter_mut() {
		row.set_title_depth(0);
	}
	let members: Vec<usize> = (0..rows.len()).collect();
	disambiguate(rows, &members, 1);
}

fn disambiguate(rows: &mut [ResultRow], members: &[usize], depth: usize) {
	let mut by_title: IndexMap<&str, Vec<usize>> = IndexMap::new();
	for &index in members {
		by_title
			.entry(rows[index].unique_title())
			.or_default()
			.push(index);
	}
	let shared: Vec<Vec<usize>> = by_title
		.into_values()
		.filter(|sharing| sharing.len() > 1)
		.collect();

	for sharing in shared {
		let mut modified = false;
		for &index in &sharing {
			modified |= rows[index].set_title_depth(depth);
		}
		if modified {
			disambiguate(rows, &sharing, depth + 1);
		}
	}
}
