use std::ops::Deref;

/// A value stamped with its discovery position inside a [`ResultStream`].
///
/// The index is assigned by the stream at append time and cannot be changed
/// afterwards, so a record never carries two different positions.
///
/// [`ResultStream`]: crate::ResultStream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequenced<T> {
	index: u64,
	value: T,
}

impl<T> Sequenced<T> {
	pub(crate) fn new(index: u64, value: T) -> Self {
		Self { index, value }
	}

	/// Position of the record within its stream, starting at zero.
	#[must_use]
	pub fn index(&self) -> u64 {
		self.index
	}

	/// Borrow the wrapped value.
	#[must_use]
	pub fn get(&self) -> &T {
		&self.value
	}

	/// Unwrap the value, discarding the sequence index.
	pub fn into_value(self) -> T {
		self.value
	}

	/// Split the record into its index and value.
	pub fn into_parts(self) -> (u64, T) {
		(self.index, self.value)
	}
}

impl<T> Deref for Sequenced<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.value
	}
}
