use std::fmt;

const WORDS: usize = 4;
const BITS: usize = 64;

/// A fixed-width 256 bit set over small type ids.
///
/// Archetype identity and query matching are expressed as whole-word
/// superset/disjoint tests over [BitSet] pairs. Equality compares every word,
/// so two distinct sets never alias even when their hashes collide.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BitSet {
	words: [u64; WORDS],
}

impl BitSet {
	/// The maximum id a [BitSet] can hold.
	pub const CAPACITY: usize = WORDS * BITS;

	/// Create an empty [BitSet].
	pub const fn new() -> Self {
		Self { words: [0; WORDS] }
	}

	/// Create a [BitSet] containing the specified ids.
	pub fn from_ids(ids: &[usize]) -> Self {
		let mut set = Self::new();
		for id in ids {
			set.set(*id);
		}
		set
	}

	/// Get the value of the bit at index `i`.
	#[inline(always)]
	pub fn get(&self, i: usize) -> bool {
		debug_assert!(i < Self::CAPACITY);
		self.words[i / BITS] & (1 << (i % BITS)) != 0
	}

	/// Set the bit at index `i`.
	#[inline(always)]
	pub fn set(&mut self, i: usize) {
		debug_assert!(i < Self::CAPACITY);
		self.words[i / BITS] |= 1 << (i % BITS);
	}

	/// Clear the bit at index `i`.
	#[inline(always)]
	pub fn clear(&mut self, i: usize) {
		debug_assert!(i < Self::CAPACITY);
		self.words[i / BITS] &= !(1 << (i % BITS));
	}

	/// Check whether every bit of `other` is also set in `self`.
	#[inline]
	pub fn is_superset_of(&self, other: &BitSet) -> bool {
		self.words
			.iter()
			.zip(other.words.iter())
			.all(|(word, mask)| word & mask == *mask)
	}

	/// Check whether `self` and `other` share no set bit.
	#[inline]
	pub fn is_disjoint_from(&self, other: &BitSet) -> bool {
		self.words.iter().zip(other.words.iter()).all(|(a, b)| a & b == 0)
	}

	/// Set every bit that is set in `other`.
	pub fn union_with(&mut self, other: &BitSet) {
		for (word, mask) in self.words.iter_mut().zip(other.words.iter()) {
			*word |= mask;
		}
	}

	/// Clear every bit that is set in `other`.
	pub fn difference_with(&mut self, other: &BitSet) {
		for (word, mask) in self.words.iter_mut().zip(other.words.iter()) {
			*word &= !mask;
		}
	}

	/// The number of set bits.
	pub fn count(&self) -> usize {
		self.words.iter().map(|w| w.count_ones() as usize).sum()
	}

	/// Check whether no bit is set.
	pub fn is_empty(&self) -> bool {
		self.words.iter().all(|w| *w == 0)
	}

	/// Iterate over the indices of all set bits in ascending order.
	pub fn iter(&self) -> BitSetIter {
		BitSetIter {
			word_index: 0,
			word: self.words[0],
			words: self.words,
		}
	}
}

impl fmt::Debug for BitSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

/// Iterates over the set bit indices of a [BitSet].
pub struct BitSetIter {
	word_index: usize,
	word: u64,
	words: [u64; WORDS],
}

impl Iterator for BitSetIter {
	type Item = usize;

	fn next(&mut self) -> Option<Self::Item> {
		while self.word == 0 {
			self.word_index += 1;
			if self.word_index >= WORDS {
				return None;
			}
			self.word = self.words[self.word_index];
		}

		let bit = self.word.trailing_zeros() as usize;
		self.word &= self.word - 1;
		Some(self.word_index * BITS + bit)
	}
}
