use crate::archetypes::ComponentHeap;
use crate::data_structures::BitSet;
use crate::entities::EntityId;
use crate::schema::{Component, ComponentId, TypeRegistry};

const NO_HEAP: u16 = u16::MAX;

/// A handle to an archetype within an
/// [EntityStore](crate::entities::EntityStore). Index 0 is the empty archetype.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ArchetypeId {
	pub(crate) index: u32,
}

/// Columnar storage for all entities sharing one exact set of component types
/// and tags.
///
/// One growable heap per owned component type plus a parallel entity-id
/// array; `entity_ids[row]` owns the values at `row` of every heap. Removal
/// swaps the last row into the vacated slot, so the caller must re-point the
/// moved entity's node at its new row.
pub(crate) struct ArchetypeInstance {
	id: ArchetypeId,
	components: BitSet,
	tags: BitSet,
	heaps: Vec<ComponentHeap>,
	/// Component id -> position in `heaps`; `NO_HEAP` when not owned.
	heap_map: Vec<u16>,
	entity_ids: Vec<EntityId>,
}

impl ArchetypeInstance {
	pub fn new(
		id: ArchetypeId, components: BitSet, tags: BitSet, registry: &TypeRegistry,
	) -> Self {
		let mut heap_map = vec![NO_HEAP; registry.component_count() + 1];
		let mut heaps = Vec::with_capacity(components.count());

		for component_id in components.iter() {
			let meta = &registry.components()[component_id - 1];
			heap_map[component_id] = heaps.len() as u16;
			heaps.push((meta.make_heap)(meta.id()));
		}

		Self {
			id,
			components,
			tags,
			heaps,
			heap_map,
			entity_ids: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn id(&self) -> ArchetypeId {
		self.id
	}

	pub fn components(&self) -> &BitSet {
		&self.components
	}

	pub fn tags(&self) -> &BitSet {
		&self.tags
	}

	pub fn len(&self) -> usize {
		self.entity_ids.len()
	}

	pub fn entity_ids(&self) -> &[EntityId] {
		&self.entity_ids
	}

	pub fn has_component(&self, component: ComponentId) -> bool {
		self.components.get(component.value())
	}

	pub fn heap(&self, component: ComponentId) -> Option<&ComponentHeap> {
		match self.heap_map[component.value()] {
			NO_HEAP => None,
			index => Some(&self.heaps[index as usize]),
		}
	}

	pub fn heap_mut(&mut self, component: ComponentId) -> Option<&mut ComponentHeap> {
		match self.heap_map[component.value()] {
			NO_HEAP => None,
			index => Some(&mut self.heaps[index as usize]),
		}
	}

	/// Append a new default row for `entity`. Returns the row index.
	pub fn add_entity(&mut self, entity: EntityId) -> usize {
		for heap in &mut self.heaps {
			heap.push_default();
		}
		self.entity_ids.push(entity);
		self.entity_ids.len() - 1
	}

	/// Swap the last row into `row` and shrink by one.
	///
	/// Returns the id of the entity that moved into `row`, if any; its node's
	/// row index must be updated in the same operation.
	pub fn swap_remove(&mut self, row: usize) -> Option<EntityId> {
		for heap in &mut self.heaps {
			heap.swap_remove(row);
		}
		self.entity_ids.swap_remove(row);

		if row < self.entity_ids.len() {
			Some(self.entity_ids[row])
		} else {
			None
		}
	}

	/// Copy the shared component values of `src`'s `row` into a new row of
	/// `dst`. Component types missing in `src` keep their default value;
	/// types missing in `dst` are discarded. Returns the new row.
	///
	/// The source row is left in place; the caller swap-removes it afterwards.
	pub fn move_entity_to(src: &Self, dst: &mut Self, row: usize) -> usize {
		let dst_row = dst.add_entity(src.entity_ids[row]);
		for heap in &src.heaps {
			if let Some(dst_heap) = dst.heap_mut(heap.component()) {
				heap.copy_row_to(dst_heap, row, dst_row);
			}
		}
		dst_row
	}

	pub fn get<T: Component>(&self, component: ComponentId, row: usize) -> Option<&T> {
		Some(&self.heap(component)?.as_slice::<T>()[row])
	}

	pub fn get_mut<T: Component>(&mut self, component: ComponentId, row: usize) -> Option<&mut T> {
		Some(&mut self.heap_mut(component)?.as_mut_slice::<T>()[row])
	}
}
