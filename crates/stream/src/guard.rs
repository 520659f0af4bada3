use crate::ResultStream;

/// Completes a stream when dropped.
///
/// Producers hold one for the lifetime of their scan so that readers blocked
/// in [`ResultStream::drain`] are released even if the producer bails out
/// early or unwinds from a panic.
pub struct CompletionGuard<'a, T> {
	stream: &'a ResultStream<T>,
}

impl<'a, T> CompletionGuard<'a, T> {
	/// Arm a guard for `stream`.
	#[must_use]
	pub fn new(stream: &'a ResultStream<T>) -> Self {
		Self { stream }
	}
}

impl<T> Drop for CompletionGuard<'_, T> {
	fn drop(&mut self) {
		self.stream.set_complete();
	}
}
