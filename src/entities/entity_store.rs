use crate::archetypes::{ArchetypeId, ArchetypeInstance, ArchetypeStore};
use crate::data_structures::IdSetPool;
use crate::entities::{ChangeEvent, ChangeHook, Entity, EntityId, EntityNode, NO_ARCHETYPE};
use crate::errors::EcsError;
use crate::index::{RelationStore, ValueIndex};
use crate::schema::{
	Component, ComponentId, IndexedComponent, Relation, RelationId, Tag, TagId, TypeRegistry,
};
use std::any::Any;
use std::ops::RangeBounds;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use log::trace;

type Erased = dyn Any + Send + Sync;

/// Which kind of entry an index slot's bit stands for.
#[derive(Copy, Clone)]
enum SlotOwner {
	Component(ComponentId),
	Relation(RelationId),
}

/// The entity container: node table, archetypes, secondary indexes, relation
/// stores and the tree, behind a single-writer API.
///
/// All structural changes go through `&mut self`; there are no internal locks.
/// Ids are recycled through a free list, and every deletion bumps the slot's
/// revision so stale [Entity] handles are rejected in O(1).
pub struct EntityStore {
	pub(crate) store_id: u32,
	pub(crate) registry: Arc<TypeRegistry>,
	pub(crate) nodes: Vec<EntityNode>,
	pub(crate) free_ids: Vec<u32>,
	pub(crate) next_id: u32,
	pub(crate) entity_count: usize,
	pub(crate) archetypes: ArchetypeStore,
	/// One boxed [ValueIndex] per indexed component, addressed by component id.
	pub(crate) indexes: Vec<Option<Box<Erased>>>,
	/// One boxed [RelationStore] per relation type, addressed by relation id - 1.
	pub(crate) relation_stores: Vec<Box<Erased>>,
	/// Index-slot bit -> the component or relation owning that slot.
	slot_owners: Vec<SlotOwner>,
	pub(crate) tree_pool: IdSetPool,
	/// Id of the designated root entity; 0 when unset.
	pub(crate) root: u32,
	pub(crate) hooks: Vec<ChangeHook>,
}

static NEXT_STORE_ID: AtomicU32 = AtomicU32::new(1);

impl EntityStore {
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		let mut indexes: Vec<Option<Box<Erased>>> = Vec::new();
		indexes.resize_with(registry.component_count() + 1, || None);

		let mut slot_owners = Vec::new();
		for meta in registry.components() {
			if let Some(make_index) = meta.make_index {
				indexes[meta.id().value()] = Some(make_index());
				slot_owners.push(SlotOwner::Component(meta.id()));
			}
		}

		let mut relation_stores = Vec::new();
		for meta in registry.relations() {
			relation_stores.push((meta.make_store)());
			slot_owners.push(SlotOwner::Relation(meta.id));
		}

		Self {
			store_id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
			archetypes: ArchetypeStore::new(registry.clone()),
			registry,
			nodes: vec![EntityNode::dead()],
			free_ids: Vec::new(),
			next_id: 1,
			entity_count: 0,
			indexes,
			relation_stores,
			slot_owners,
			tree_pool: IdSetPool::new(),
			root: 0,
			hooks: Vec::new(),
		}
	}

	pub fn registry(&self) -> &Arc<TypeRegistry> {
		&self.registry
	}

	pub fn entity_count(&self) -> usize {
		self.entity_count
	}

	pub fn archetype_count(&self) -> usize {
		self.archetypes.archetype_count()
	}

	/// Register a hook observing every structural change, fired synchronously
	/// after the store reflects the post-change state.
	pub fn on_change(&mut self, hook: impl FnMut(&EntityStore, &ChangeEvent) + Send + 'static) {
		self.hooks.push(Box::new(hook));
	}

	// -- entity lifecycle ---------------------------------------------------

	/// Create an entity with no components and no tags.
	pub fn create_entity(&mut self) -> Entity {
		let id = self.allocate_id();
		self.place_new(id)
	}

	/// Create an entity under a caller-chosen id.
	///
	/// Ids above the current watermark are honored; the skipped ids become
	/// allocatable through the free list.
	pub fn create_entity_with_id(&mut self, id: u32) -> Result<Entity, EcsError> {
		if id == 0 {
			return Err(EcsError::InvalidEntityId(0));
		}

		if id >= self.next_id {
			if self.nodes.len() <= id as usize {
				self.nodes.resize(id as usize + 1, EntityNode::dead());
			}
			for skipped in self.next_id..id {
				self.free_ids.push(skipped);
			}
			self.next_id = id + 1;
		} else {
			if self.nodes[id as usize].is_alive() {
				return Err(EcsError::IdInUse(EntityId::new(id)));
			}
			let position = self.free_ids.iter().position(|f| *f == id).unwrap();
			self.free_ids.swap_remove(position);
		}

		Ok(self.place_new(id))
	}

	/// Resolve a raw id to a live entity handle.
	pub fn entity_by_id(&self, id: EntityId) -> Option<Entity> {
		let index = id.value() as usize;
		if index == 0 || index >= self.nodes.len() || !self.nodes[index].is_alive() {
			return None;
		}
		Some(self.handle(id.value()))
	}

	/// Whether the handle still refers to a live entity. O(1).
	pub fn is_alive(&self, entity: Entity) -> bool {
		self.validate(entity).is_ok()
	}

	/// Delete the entity: indexes and relations are cleaned up, links and
	/// relations referencing it are removed from their sources, the id is
	/// recycled and the handle goes stale.
	pub fn delete_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
		let id = self.validate(entity)?;
		self.delete_entity_id(id);
		Ok(())
	}

	pub(crate) fn delete_entity_id(&mut self, id: u32) {
		self.detach_tree(id);

		let mut owner_bits = self.nodes[id as usize].owner_bits;
		while owner_bits != 0 {
			let slot = owner_bits.trailing_zeros() as usize;
			owner_bits &= owner_bits - 1;
			match self.slot_owners[slot] {
				SlotOwner::Component(component) => {
					let (archetype, row) = self.location(id);
					self.index_remove_for(id, component, archetype, row);
				},
				SlotOwner::Relation(relation) => self.drop_outgoing_relations(id, relation),
			}
		}

		let mut linked_bits = self.nodes[id as usize].linked_bits;
		while linked_bits != 0 {
			let slot = linked_bits.trailing_zeros() as usize;
			linked_bits &= linked_bits - 1;
			match self.slot_owners[slot] {
				SlotOwner::Component(component) => {
					for source in self.link_sources(component, id) {
						self.remove_component_id(source, component);
					}
				},
				SlotOwner::Relation(relation) => self.drop_incoming_relations(id, relation),
			}
		}

		// Link removal above may have moved this entity's own row.
		let (archetype, row) = self.location(id);
		if let Some(moved) = self.archetypes.archetype_mut(archetype).swap_remove(row) {
			self.nodes[moved.value() as usize].row = row as u32;
		}

		let node = &mut self.nodes[id as usize];
		node.archetype = NO_ARCHETYPE;
		node.revision = node.revision.wrapping_add(1);
		node.owner_bits = 0;
		node.linked_bits = 0;

		if self.root == id {
			self.root = 0;
		}
		self.free_ids.push(id);
		self.entity_count -= 1;
		self.emit(ChangeEvent::EntityDeleted { entity: EntityId::new(id) });
	}

	// -- components and tags ------------------------------------------------

	/// Attach a component value.
	///
	/// Returns true when the type was newly added. When the entity already
	/// carries the type, the value is overwritten in place and the archetype
	/// stays unchanged; adding is idempotent with respect to the target state.
	pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<bool, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let id = self.validate(entity)?;
		Ok(self.add_component_with(id, component, move |heap, row| {
			heap.as_mut_slice::<T>()[row] = value;
		}))
	}

	/// Detach a component type. Returns false when the entity does not carry it.
	pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<bool, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let id = self.validate(entity)?;
		Ok(self.remove_component_id(id, component))
	}

	pub fn get_component<T: Component>(&self, entity: Entity) -> Result<Option<&T>, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let id = self.validate(entity)?;
		let (archetype, row) = self.location(id);
		Ok(self.archetypes.archetype(archetype).get::<T>(component, row))
	}

	/// Mutable access to a component value in place.
	///
	/// Indexed components must be updated through [Self::add_component] so the
	/// secondary index observes the key change.
	pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<Option<&mut T>, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let id = self.validate(entity)?;
		let (archetype, row) = self.location(id);
		Ok(self.archetypes.archetype_mut(archetype).get_mut::<T>(component, row))
	}

	pub fn has_component<T: Component>(&self, entity: Entity) -> Result<bool, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let id = self.validate(entity)?;
		let (archetype, _) = self.location(id);
		Ok(self.archetypes.archetype(archetype).has_component(component))
	}

	/// Attach a tag. Returns false when it was already present.
	pub fn add_tag<T: Tag>(&mut self, entity: Entity) -> Result<bool, EcsError> {
		let tag = self.registry.tag_id::<T>()?;
		let id = self.validate(entity)?;
		Ok(self.add_tag_id(id, tag))
	}

	/// Detach a tag. Returns false when it was not present.
	pub fn remove_tag<T: Tag>(&mut self, entity: Entity) -> Result<bool, EcsError> {
		let tag = self.registry.tag_id::<T>()?;
		let id = self.validate(entity)?;
		Ok(self.remove_tag_id(id, tag))
	}

	pub fn has_tag<T: Tag>(&self, entity: Entity) -> Result<bool, EcsError> {
		let tag = self.registry.tag_id::<T>()?;
		let id = self.validate(entity)?;
		let (archetype, _) = self.location(id);
		Ok(self.archetypes.archetype(archetype).tags().get(tag.value()))
	}

	/// Attach the built-in [Disabled](crate::schema::Disabled) tag, hiding the
	/// entity from queries that did not opt in.
	pub fn disable(&mut self, entity: Entity) -> Result<bool, EcsError> {
		let id = self.validate(entity)?;
		Ok(self.add_tag_id(id, self.registry.disabled_tag()))
	}

	pub fn enable(&mut self, entity: Entity) -> Result<bool, EcsError> {
		let id = self.validate(entity)?;
		Ok(self.remove_tag_id(id, self.registry.disabled_tag()))
	}

	pub fn is_disabled(&self, entity: Entity) -> Result<bool, EcsError> {
		let id = self.validate(entity)?;
		let (archetype, _) = self.location(id);
		let disabled = self.registry.disabled_tag();
		Ok(self.archetypes.archetype(archetype).tags().get(disabled.value()))
	}

	// -- relations ----------------------------------------------------------

	/// Attach a relation value; a value with an already-present key replaces
	/// the previous one. Returns true when the key was new.
	pub fn add_relation<R: Relation>(&mut self, entity: Entity, value: R) -> Result<bool, EcsError> {
		let relation = self.registry.relation_id::<R>()?;
		let id = self.validate(entity)?;
		let slot = self.registry.relation(relation).index_slot;

		let new_target = match value.link_target() {
			None => None,
			Some(target) => {
				let index = target.value() as usize;
				if index == 0 || index >= self.nodes.len() || !self.nodes[index].is_alive() {
					return Err(EcsError::StaleEntity(target));
				}
				Some(target.value())
			},
		};

		let store = self.relation_stores[relation.value() - 1]
			.downcast_mut::<RelationStore<R>>()
			.unwrap();
		let outcome = store.add(id, value);

		self.nodes[id as usize].owner_bits |= 1 << slot;
		if let Some(target) = new_target {
			self.nodes[target as usize].linked_bits |= 1 << slot;
		}
		if let Some(freed) = outcome.freed_target {
			self.nodes[freed as usize].linked_bits &= !(1 << slot);
		}
		Ok(!outcome.replaced)
	}

	/// Detach the relation with the given key. Returns false when absent.
	pub fn remove_relation<R: Relation>(
		&mut self, entity: Entity, key: &R::Key,
	) -> Result<bool, EcsError> {
		let relation = self.registry.relation_id::<R>()?;
		let id = self.validate(entity)?;
		let slot = self.registry.relation(relation).index_slot;

		let store = self.relation_stores[relation.value() - 1]
			.downcast_mut::<RelationStore<R>>()
			.unwrap();
		let Some(outcome) = store.remove(id, key) else {
			return Ok(false);
		};

		if outcome.last_for_source {
			self.nodes[id as usize].owner_bits &= !(1 << slot);
		}
		if let Some(freed) = outcome.freed_target {
			self.nodes[freed as usize].linked_bits &= !(1 << slot);
		}
		Ok(true)
	}

	/// All relation values of type `R` held by the entity.
	pub fn relations<R: Relation>(&self, entity: Entity) -> Result<&[R], EcsError> {
		let relation = self.registry.relation_id::<R>()?;
		let id = self.validate(entity)?;
		let store = self.relation_stores[relation.value() - 1]
			.downcast_ref::<RelationStore<R>>()
			.unwrap();
		Ok(store.values(id))
	}

	/// The relation value with the given key, if present.
	pub fn relation<R: Relation>(
		&self, entity: Entity, key: &R::Key,
	) -> Result<Option<&R>, EcsError> {
		let relation = self.registry.relation_id::<R>()?;
		let id = self.validate(entity)?;
		let store = self.relation_stores[relation.value() - 1]
			.downcast_ref::<RelationStore<R>>()
			.unwrap();
		Ok(store.get(id, key))
	}

	/// The entities holding a link relation of type `R` targeting `target`.
	pub fn relation_sources<R: Relation>(&self, target: Entity) -> Result<Vec<EntityId>, EcsError> {
		let relation = self.registry.relation_id::<R>()?;
		let id = self.validate(target)?;
		let store = self.relation_stores[relation.value() - 1]
			.downcast_ref::<RelationStore<R>>()
			.unwrap();
		Ok(store.sources_of(id).iter().map(|s| EntityId::new(*s)).collect())
	}

	// -- value index lookups ------------------------------------------------

	/// The entities whose indexed component carries exactly this key.
	pub fn entities_with_value<T: IndexedComponent>(
		&self, key: &T::Key,
	) -> Result<Vec<EntityId>, EcsError> {
		let index = self.value_index::<T>()?;
		Ok(index.entities_with(key).iter().map(|id| EntityId::new(*id)).collect())
	}

	/// The entities whose indexed component key falls within the range, in
	/// ascending key order.
	pub fn entities_in_range<T: IndexedComponent>(
		&mut self, range: impl RangeBounds<T::Key>,
	) -> Result<Vec<EntityId>, EcsError> {
		let index = self.value_index_mut::<T>()?;
		Ok(index.entities_in_range(range).into_iter().map(EntityId::new).collect())
	}

	/// The single entity carrying this key, or [EcsError::NotFound] /
	/// [EcsError::NotUnique].
	pub fn find_unique<T: IndexedComponent>(&self, key: &T::Key) -> Result<Entity, EcsError> {
		let index = self.value_index::<T>()?;
		let id = index.find_unique(key)?;
		Ok(self.handle(id))
	}

	pub(crate) fn value_index<T: IndexedComponent>(&self) -> Result<&ValueIndex<T>, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let index = self.indexes[component.value()]
			.as_ref()
			.expect("component type is not registered as indexed");
		Ok(index.downcast_ref::<ValueIndex<T>>().unwrap())
	}

	pub(crate) fn value_index_mut<T: IndexedComponent>(&mut self) -> Result<&mut ValueIndex<T>, EcsError> {
		let component = self.registry.component_id::<T>()?;
		let index = self.indexes[component.value()]
			.as_mut()
			.expect("component type is not registered as indexed");
		Ok(index.downcast_mut::<ValueIndex<T>>().unwrap())
	}

	// -- internal machinery -------------------------------------------------

	pub(crate) fn validate(&self, entity: Entity) -> Result<u32, EcsError> {
		if entity.store != self.store_id {
			return Err(EcsError::ForeignEntity(entity.id));
		}
		let index = entity.id.value() as usize;
		if index == 0 || index >= self.nodes.len() {
			return Err(EcsError::InvalidEntityId(entity.id.value() as i64));
		}
		let node = &self.nodes[index];
		if !node.is_alive() || node.revision != entity.revision {
			return Err(EcsError::StaleEntity(entity.id));
		}
		Ok(entity.id.value())
	}

	pub(crate) fn handle(&self, id: u32) -> Entity {
		Entity {
			id: EntityId::new(id),
			revision: self.nodes[id as usize].revision,
			store: self.store_id,
		}
	}

	#[inline]
	pub(crate) fn location(&self, id: u32) -> (ArchetypeId, usize) {
		let node = &self.nodes[id as usize];
		(ArchetypeId { index: node.archetype }, node.row as usize)
	}

	fn allocate_id(&mut self) -> u32 {
		match self.free_ids.pop() {
			Some(id) => id,
			None => {
				let id = self.next_id;
				self.next_id += 1;
				if self.nodes.len() <= id as usize {
					trace!("entity node table grew to {}", id + 1);
					self.nodes.resize(id as usize + 1, EntityNode::dead());
				}
				id
			},
		}
	}

	fn place_new(&mut self, id: u32) -> Entity {
		let row = self
			.archetypes
			.archetype_mut(ArchetypeId::default())
			.add_entity(EntityId::new(id));

		let node = &mut self.nodes[id as usize];
		node.archetype = 0;
		node.row = row as u32;
		node.owner_bits = 0;
		node.linked_bits = 0;

		self.entity_count += 1;
		let entity = self.handle(id);
		self.emit(ChangeEvent::EntityCreated { entity: entity.id });
		entity
	}

	/// Add or overwrite a component, writing the value through `write` once
	/// the row exists in the target archetype. Returns true when newly added.
	pub(crate) fn add_component_with(
		&mut self, id: u32, component: ComponentId,
		write: impl FnOnce(&mut crate::archetypes::ComponentHeap, usize),
	) -> bool {
		let (archetype, row) = self.location(id);
		let added = if self.archetypes.archetype(archetype).has_component(component) {
			self.index_remove_for(id, component, archetype, row);
			let heap = self.archetypes.archetype_mut(archetype).heap_mut(component).unwrap();
			write(heap, row);
			false
		} else {
			let target = self.archetypes.with_component(archetype, component);
			let new_row = self.move_rows(id, archetype, target);
			let heap = self.archetypes.archetype_mut(target).heap_mut(component).unwrap();
			write(heap, new_row);
			true
		};

		let (archetype, row) = self.location(id);
		self.index_insert_for(id, component, archetype, row);
		self.emit(ChangeEvent::ComponentAdded {
			entity: EntityId::new(id),
			component,
		});
		added
	}

	pub(crate) fn add_component_boxed(
		&mut self, id: u32, component: ComponentId, value: Box<Erased>,
	) -> bool {
		self.add_component_with(id, component, move |heap, row| heap.write_boxed(row, value))
	}

	pub(crate) fn remove_component_id(&mut self, id: u32, component: ComponentId) -> bool {
		let (archetype, row) = self.location(id);
		if !self.archetypes.archetype(archetype).has_component(component) {
			return false;
		}

		self.index_remove_for(id, component, archetype, row);
		let target = self.archetypes.without_component(archetype, component);
		self.move_rows(id, archetype, target);
		self.emit(ChangeEvent::ComponentRemoved {
			entity: EntityId::new(id),
			component,
		});
		true
	}

	pub(crate) fn add_tag_id(&mut self, id: u32, tag: TagId) -> bool {
		let (archetype, _) = self.location(id);
		if self.archetypes.archetype(archetype).tags().get(tag.value()) {
			return false;
		}

		let target = self.archetypes.with_tag(archetype, tag);
		self.move_rows(id, archetype, target);
		self.emit(ChangeEvent::TagAdded { entity: EntityId::new(id), tag });
		true
	}

	pub(crate) fn remove_tag_id(&mut self, id: u32, tag: TagId) -> bool {
		let (archetype, _) = self.location(id);
		if !self.archetypes.archetype(archetype).tags().get(tag.value()) {
			return false;
		}

		let target = self.archetypes.without_tag(archetype, tag);
		self.move_rows(id, archetype, target);
		self.emit(ChangeEvent::TagRemoved { entity: EntityId::new(id), tag });
		true
	}

	/// Move the entity's row from one archetype to another, fixing up the
	/// node of the entity displaced by the swap-remove. Returns the new row.
	pub(crate) fn move_rows(&mut self, id: u32, from: ArchetypeId, to: ArchetypeId) -> usize {
		let row = self.nodes[id as usize].row as usize;
		let (src, dst) = self.archetypes.pair_mut(from, to);
		let new_row = ArchetypeInstance::move_entity_to(src, dst, row);

		if let Some(moved) = src.swap_remove(row) {
			self.nodes[moved.value() as usize].row = row as u32;
		}

		let node = &mut self.nodes[id as usize];
		node.archetype = to.index;
		node.row = new_row as u32;
		new_row
	}

	/// Mirror the component value at (archetype, row) into its value index
	/// and set the owner bit; for links, also the target's linked bit.
	pub(crate) fn index_insert_for(
		&mut self, id: u32, component: ComponentId, archetype: ArchetypeId, row: usize,
	) {
		let meta = self.registry.component(component);
		let Some(slot) = meta.index_slot else { return };
		let ops = meta.index_ops.as_ref().unwrap();
		let (insert, link_target) = (ops.insert, ops.link_target);

		let index = self.indexes[component.value()].as_mut().unwrap();
		let heap = self.archetypes.archetype(archetype).heap(component).unwrap();
		insert(&mut **index, id, heap, row);
		let target = link_target.map(|read| read(heap, row));

		self.nodes[id as usize].owner_bits |= 1 << slot;
		if let Some(target) = target {
			self.nodes[target as usize].linked_bits |= 1 << slot;
		}
	}

	/// Drop the index entry for the value at (archetype, row) and clear the
	/// owner bit; for links, clear the target's linked bit when no other
	/// source still references it.
	pub(crate) fn index_remove_for(
		&mut self, id: u32, component: ComponentId, archetype: ArchetypeId, row: usize,
	) {
		let meta = self.registry.component(component);
		let Some(slot) = meta.index_slot else { return };
		let ops = meta.index_ops.as_ref().unwrap();
		let (remove, link_target, contains_target) = (ops.remove, ops.link_target, ops.contains_target);

		let index = self.indexes[component.value()].as_mut().unwrap();
		let heap = self.archetypes.archetype(archetype).heap(component).unwrap();
		let target = link_target.map(|read| read(heap, row));
		remove(&mut **index, id, heap, row);

		self.nodes[id as usize].owner_bits &= !(1 << slot);
		if let (Some(target), Some(contains)) = (target, contains_target) {
			if !contains(&**index, target) {
				self.nodes[target as usize].linked_bits &= !(1 << slot);
			}
		}
	}

	/// The entities whose link component of this type targets `target`.
	fn link_sources(&self, component: ComponentId, target: u32) -> Vec<u32> {
		let meta = self.registry.component(component);
		let sources_of = meta.index_ops.as_ref().unwrap().sources_of.unwrap();
		let index = self.indexes[component.value()].as_ref().unwrap();
		sources_of(&**index, target)
	}

	fn drop_outgoing_relations(&mut self, id: u32, relation: RelationId) {
		let meta = self.registry.relation(relation);
		let slot = meta.index_slot;
		let remove_entity = meta.ops.remove_entity;

		let store = &mut self.relation_stores[relation.value() - 1];
		let freed = remove_entity(&mut **store, id);

		self.nodes[id as usize].owner_bits &= !(1 << slot);
		for target in freed {
			self.nodes[target as usize].linked_bits &= !(1 << slot);
		}
	}

	fn drop_incoming_relations(&mut self, id: u32, relation: RelationId) {
		let meta = self.registry.relation(relation);
		let slot = meta.index_slot;
		let remove_incoming = meta.ops.remove_incoming;

		let store = &mut self.relation_stores[relation.value() - 1];
		let emptied = remove_incoming(&mut **store, id);

		self.nodes[id as usize].linked_bits &= !(1 << slot);
		for source in emptied {
			self.nodes[source as usize].owner_bits &= !(1 << slot);
		}
	}

	pub(crate) fn emit(&mut self, event: ChangeEvent) {
		if self.hooks.is_empty() {
			return;
		}
		let mut hooks = std::mem::take(&mut self.hooks);
		for hook in &mut hooks {
			hook(self, &event);
		}
		// Hooks registered while dispatching are kept.
		let added = std::mem::replace(&mut self.hooks, hooks);
		self.hooks.extend(added);
	}
}
