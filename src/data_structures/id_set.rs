/// A small set of entity ids backed by an [IdSetPool].
///
/// The common case of zero or one id is stored inline; larger sets live in a
/// power-of-two sized bucket drawn from the pool's size classes. Growth
/// re-buckets into the next class, shrinking re-buckets into a smaller one, so
/// no dedicated allocation is ever made for a single set.
///
/// The set does not deduplicate; callers keep ids unique.
#[derive(Default, Copy, Clone, Debug)]
pub struct IdSet {
	start: u32,
	len: u32,
}

/// Pooled bucket storage for [IdSet]s, one free-list per power-of-two size class.
#[derive(Default)]
pub struct IdSetPool {
	classes: Vec<SizeClass>,
}

struct SizeClass {
	bucket_size: usize,
	ids: Vec<u32>,
	free_starts: Vec<u32>,
}

impl IdSet {
	pub const fn new() -> Self {
		Self { start: 0, len: 0 }
	}

	pub fn len(&self) -> usize {
		self.len as usize
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// View the stored ids. Order is not specified; removal swaps.
	pub fn as_slice<'a>(&'a self, pool: &'a IdSetPool) -> &'a [u32] {
		match self.len {
			0 => &[],
			1 => std::slice::from_ref(&self.start),
			len => {
				let class = &pool.classes[class_of(len as usize)];
				let start = self.start as usize;
				&class.ids[start..start + len as usize]
			},
		}
	}

	pub fn contains(&self, pool: &IdSetPool, id: u32) -> bool {
		self.as_slice(pool).contains(&id)
	}

	/// Append an id, re-bucketing into the next size class when the current
	/// bucket is full.
	pub fn add(&mut self, pool: &mut IdSetPool, id: u32) {
		match self.len {
			0 => {
				self.start = id;
			},
			1 => {
				let first = self.start;
				let start = pool.create_bucket(1);
				let class = &mut pool.classes[1];
				class.ids[start as usize] = first;
				class.ids[start as usize + 1] = id;
				self.start = start;
			},
			len => {
				let class_index = class_of(len as usize);
				let bucket_size = pool.classes[class_index].bucket_size;

				if len as usize == bucket_size {
					// Full; move the ids into a bucket of the next class.
					let next_start = pool.create_bucket(class_index + 1);
					let (current, next) = pool.class_pair(class_index, class_index + 1);
					let src = self.start as usize..self.start as usize + len as usize;
					next.ids[next_start as usize..next_start as usize + len as usize]
						.copy_from_slice(&current.ids[src]);
					current.free_starts.push(self.start);

					next.ids[next_start as usize + len as usize] = id;
					self.start = next_start;
				} else {
					let class = &mut pool.classes[class_index];
					class.ids[self.start as usize + len as usize] = id;
				}
			},
		}
		self.len += 1;
	}

	/// Remove an id by swapping the last stored id into its place.
	/// Returns false if the id is not present.
	pub fn remove(&mut self, pool: &mut IdSetPool, id: u32) -> bool {
		match self.len {
			0 => false,
			1 => {
				if self.start != id {
					return false;
				}
				self.start = 0;
				self.len = 0;
				true
			},
			len => {
				let class_index = class_of(len as usize);
				let start = self.start as usize;
				let count = len as usize;

				{
					let class = &mut pool.classes[class_index];
					let bucket = &mut class.ids[start..start + count];
					match bucket.iter().position(|i| *i == id) {
						None => return false,
						Some(position) => bucket[position] = bucket[count - 1],
					}
				}

				self.len -= 1;
				let remaining = count - 1;

				if remaining == 1 {
					let class = &mut pool.classes[class_index];
					let survivor = class.ids[start];
					class.free_starts.push(self.start);
					self.start = survivor;
				} else if class_of(remaining) < class_index {
					// Shrunk past the class boundary; move down one class.
					let next_start = pool.create_bucket(class_index - 1);
					let (smaller, current) = pool.class_pair(class_index - 1, class_index);
					smaller.ids[next_start as usize..next_start as usize + remaining]
						.copy_from_slice(&current.ids[start..start + remaining]);
					current.free_starts.push(self.start);
					self.start = next_start;
				}
				true
			},
		}
	}

	/// Drop the backing bucket, leaving the set empty.
	pub fn clear(&mut self, pool: &mut IdSetPool) {
		if self.len > 1 {
			pool.classes[class_of(self.len as usize)].free_starts.push(self.start);
		}
		self.start = 0;
		self.len = 0;
	}
}

impl IdSetPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of live buckets in the specified size class.
	#[cfg(test)]
	pub(crate) fn bucket_count(&self, class_index: usize) -> usize {
		match self.classes.get(class_index) {
			None => 0,
			Some(class) => {
				class.ids.len() / class.bucket_size - class.free_starts.len()
			},
		}
	}

	fn create_bucket(&mut self, class_index: usize) -> u32 {
		while self.classes.len() <= class_index {
			let bucket_size = 1 << self.classes.len();
			self.classes.push(SizeClass {
				bucket_size,
				ids: Vec::new(),
				free_starts: Vec::new(),
			});
		}

		let class = &mut self.classes[class_index];
		match class.free_starts.pop() {
			Some(start) => start,
			None => {
				let start = class.ids.len();
				class.ids.resize(start + class.bucket_size, 0);
				start as u32
			},
		}
	}

	fn class_pair(&mut self, a: usize, b: usize) -> (&mut SizeClass, &mut SizeClass) {
		debug_assert!(a < b);
		let (head, tail) = self.classes.split_at_mut(b);
		(&mut head[a], &mut tail[0])
	}
}

/// The size class whose buckets hold `len` ids: the smallest `c` with `2^c >= len`.
#[inline]
fn class_of(len: usize) -> usize {
	debug_assert!(len >= 2);
	(usize::BITS - (len - 1).leading_zeros()) as usize
}
