use crate::data_structures::{IdSet, IdSetPool};
use crate::entities::EntityId;
use crate::errors::EcsError;
use crate::schema::{IndexOps, IndexedComponent, LinkComponent};
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::{Bound, RangeBounds};

type Erased = dyn Any + Send + Sync;

/// A secondary index from component key to the entities carrying that key.
///
/// Entity sets are pooled [IdSet]s, so single-entity keys (the common case)
/// cost no allocation. Range lookups go through an ascending key snapshot
/// rebuilt lazily after key insertions or removals.
pub struct ValueIndex<T: IndexedComponent> {
	entries: HashMap<T::Key, IdSet>,
	pool: IdSetPool,
	sorted: Vec<T::Key>,
	dirty: bool,
}

impl<T: IndexedComponent> ValueIndex<T> {
	pub(crate) fn new() -> Self {
		Self {
			entries: HashMap::new(),
			pool: IdSetPool::new(),
			sorted: Vec::new(),
			dirty: false,
		}
	}

	/// The number of distinct keys currently indexed.
	pub fn key_count(&self) -> usize {
		self.entries.len()
	}

	/// The entities carrying exactly this key. Order is not specified.
	pub fn entities_with(&self, key: &T::Key) -> &[u32] {
		match self.entries.get(key) {
			None => &[],
			Some(set) => set.as_slice(&self.pool),
		}
	}

	/// The single entity carrying this key.
	pub fn find_unique(&self, key: &T::Key) -> Result<u32, EcsError> {
		let ids = self.entities_with(key);
		match ids.len() {
			0 => Err(EcsError::NotFound),
			1 => Ok(ids[0]),
			n => Err(EcsError::NotUnique(n)),
		}
	}

	/// The entities whose key falls within the range, ascending by key.
	pub fn entities_in_range(&mut self, range: impl RangeBounds<T::Key>) -> Vec<u32> {
		if self.dirty {
			self.sorted = self.entries.keys().cloned().collect();
			self.sorted.sort_unstable();
			self.dirty = false;
		}

		let start = match range.start_bound() {
			Bound::Unbounded => 0,
			Bound::Included(key) => self.sorted.partition_point(|k| k < key),
			Bound::Excluded(key) => self.sorted.partition_point(|k| k <= key),
		};
		let end = match range.end_bound() {
			Bound::Unbounded => self.sorted.len(),
			Bound::Included(key) => self.sorted.partition_point(|k| k <= key),
			Bound::Excluded(key) => self.sorted.partition_point(|k| k < key),
		};

		let mut ids = Vec::new();
		for key in &self.sorted[start..end] {
			ids.extend_from_slice(self.entries[key].as_slice(&self.pool));
		}
		ids
	}

	pub(crate) fn insert(&mut self, id: u32, key: T::Key) {
		match self.entries.entry(key) {
			Entry::Occupied(mut occupied) => occupied.get_mut().add(&mut self.pool, id),
			Entry::Vacant(vacant) => {
				let mut set = IdSet::new();
				set.add(&mut self.pool, id);
				vacant.insert(set);
				self.dirty = true;
			},
		}
	}

	pub(crate) fn remove(&mut self, id: u32, key: &T::Key) {
		if let Some(set) = self.entries.get_mut(key) {
			set.remove(&mut self.pool, id);
			if set.is_empty() {
				self.entries.remove(key);
				self.dirty = true;
			}
		}
	}
}

/// Index factory registered with a component's
/// [ComponentType](crate::schema::ComponentType).
pub(crate) fn make_value_index<T: IndexedComponent>() -> Box<Erased> {
	Box::new(ValueIndex::<T>::new())
}

/// Maintenance vtable for a plain indexed component.
pub(crate) fn index_ops<T: IndexedComponent>() -> IndexOps {
	IndexOps {
		insert: |index, id, heap, row| {
			let index = index.downcast_mut::<ValueIndex<T>>().unwrap();
			index.insert(id, heap.as_slice::<T>()[row].key());
		},
		remove: |index, id, heap, row| {
			let index = index.downcast_mut::<ValueIndex<T>>().unwrap();
			index.remove(id, &heap.as_slice::<T>()[row].key());
		},
		link_target: None,
		contains_target: None,
		sources_of: None,
	}
}

/// Maintenance vtable for a link component. The key is the target id, so the
/// same index doubles as the reverse target -> sources map.
pub(crate) fn link_index_ops<T: LinkComponent>() -> IndexOps {
	IndexOps {
		insert: |index, id, heap, row| {
			let index = index.downcast_mut::<ValueIndex<T>>().unwrap();
			index.insert(id, heap.as_slice::<T>()[row].key());
		},
		remove: |index, id, heap, row| {
			let index = index.downcast_mut::<ValueIndex<T>>().unwrap();
			index.remove(id, &heap.as_slice::<T>()[row].key());
		},
		link_target: Some(|heap, row| heap.as_slice::<T>()[row].target().value()),
		contains_target: Some(|index, target| {
			let index = index.downcast_ref::<ValueIndex<T>>().unwrap();
			!index.entities_with(&EntityId::new(target)).is_empty()
		}),
		sources_of: Some(|index, target| {
			let index = index.downcast_ref::<ValueIndex<T>>().unwrap();
			index.entities_with(&EntityId::new(target)).to_vec()
		}),
	}
}
