// self
use crate::{_prelude::*, config::TagRange};

/// Identifier binding a started login attempt to its eventual result.
///
/// Tags double as platform request codes for the in-process result channel, which
/// is why [`TagRange`] keeps them within the positive `i32` space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationTag(u32);
impl CorrelationTag {
	/// Wraps a raw tag value.
	pub const fn new(value: u32) -> Self {
		Self(value)
	}

	/// Raw tag value.
	pub const fn get(self) -> u32 {
		self.0
	}

	/// Request code to hand to the platform's in-process result channel.
	pub fn request_code(self) -> i32 {
		i32::try_from(self.0).unwrap_or(i32::MAX)
	}

	/// Maps a platform request code back to a tag; non-positive codes are never tags.
	pub fn from_request_code(code: i32) -> Option<Self> {
		u32::try_from(code).ok().filter(|value| *value > 0).map(Self)
	}
}
impl Debug for CorrelationTag {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CorrelationTag({})", self.0)
	}
}
impl Display for CorrelationTag {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.0)
	}
}

/// Monotonic tag counter that wraps inside a [`TagRange`].
///
/// Tags still pending are skipped, so a tag is only reused once its previous
/// attempt has completed or been abandoned and the counter has come all the way
/// around.
#[derive(Clone, Debug)]
pub struct TagAllocator {
	range: TagRange,
	next: u32,
}
impl TagAllocator {
	/// Creates an allocator starting at the bottom of `range`.
	pub fn new(range: TagRange) -> Self {
		Self { range, next: range.min() }
	}

	/// Range tags are drawn from.
	pub fn range(&self) -> TagRange {
		self.range
	}

	/// Returns `true` if `tag` could have been produced by this allocator.
	pub fn owns(&self, tag: CorrelationTag) -> bool {
		self.range.contains(tag.get())
	}

	/// Hands out the next tag for which `in_use` is `false`.
	///
	/// Returns `None` when every tag in the range is in use.
	pub fn allocate<F>(&mut self, in_use: F) -> Option<CorrelationTag>
	where
		F: Fn(CorrelationTag) -> bool,
	{
		for _ in 0..self.range.capacity() {
			let candidate = CorrelationTag(self.next);

			self.next = if self.next >= self.range.max() { self.range.min() } else { self.next + 1 };

			if !in_use(candidate) {
				return Some(candidate);
			}
		}

		None
	}
}
