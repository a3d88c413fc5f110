use crate::archetypes::clone_boxed;
use crate::data_structures::BitSet;
use crate::entities::{ChangeEvent, Entity, EntityId, EntityStore};
use crate::errors::EcsError;
use crate::schema::{Component, ComponentId, Tag, TagId, TypeRegistry};
use std::any::Any;
use std::sync::Arc;

type Erased = dyn Any + Send + Sync;

/// A set of component and tag changes applied to one entity in a single
/// structural step.
///
/// Commands accumulate as bitsets plus staged values; per type, the last
/// recorded command wins. Applying computes the target archetype once and
/// performs at most one row move no matter how many commands were recorded.
/// A batch is reusable: [Self::apply_to] leaves the commands in place.
pub struct EntityBatch {
	registry: Arc<TypeRegistry>,
	add_components: BitSet,
	remove_components: BitSet,
	add_tags: BitSet,
	remove_tags: BitSet,
	staged: Vec<Staged>,
}

struct Staged {
	component: ComponentId,
	value: Box<Erased>,
	clone: fn(&Erased) -> Box<Erased>,
}

impl EntityBatch {
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		Self {
			registry,
			add_components: BitSet::new(),
			remove_components: BitSet::new(),
			add_tags: BitSet::new(),
			remove_tags: BitSet::new(),
			staged: Vec::new(),
		}
	}

	/// Record adding (or overwriting) a component value. Supersedes a
	/// recorded removal of the same type.
	pub fn add<T: Component>(&mut self, value: T) -> Result<&mut Self, EcsError> {
		let component = self.registry.component_id::<T>()?;
		self.add_components.set(component.value());
		self.remove_components.clear(component.value());

		let staged = Staged {
			component,
			value: Box::new(value),
			clone: clone_boxed::<T>,
		};
		match self.staged.iter_mut().find(|s| s.component == component) {
			Some(slot) => *slot = staged,
			None => self.staged.push(staged),
		}
		Ok(self)
	}

	/// Record removing a component type. Supersedes a recorded add.
	pub fn remove<T: Component>(&mut self) -> Result<&mut Self, EcsError> {
		let component = self.registry.component_id::<T>()?;
		self.remove_components.set(component.value());
		self.add_components.clear(component.value());
		self.staged.retain(|s| s.component != component);
		Ok(self)
	}

	pub fn add_tag<G: Tag>(&mut self) -> Result<&mut Self, EcsError> {
		let tag = self.registry.tag_id::<G>()?;
		self.add_tags.set(tag.value());
		self.remove_tags.clear(tag.value());
		Ok(self)
	}

	pub fn remove_tag<G: Tag>(&mut self) -> Result<&mut Self, EcsError> {
		let tag = self.registry.tag_id::<G>()?;
		self.remove_tags.set(tag.value());
		self.add_tags.clear(tag.value());
		Ok(self)
	}

	/// The number of recorded commands, one per affected type.
	pub fn command_count(&self) -> usize {
		self.add_components.count()
			+ self.remove_components.count()
			+ self.add_tags.count()
			+ self.remove_tags.count()
	}

	pub fn clear(&mut self) {
		self.add_components = BitSet::new();
		self.remove_components = BitSet::new();
		self.add_tags = BitSet::new();
		self.remove_tags = BitSet::new();
		self.staged.clear();
	}

	/// Apply the recorded commands to an entity, keeping them for reuse.
	pub fn apply_to(&self, store: &mut EntityStore, entity: Entity) -> Result<(), EcsError> {
		let id = store.validate(entity)?;
		store.apply_batch(id, self);
		Ok(())
	}
}

/// A batch bound to one entity of one store, created by
/// [EntityStore::batch]. Applying is terminal: both a second apply and any
/// further command fail with [EcsError::BatchAlreadyApplied].
pub struct BoundBatch<'s> {
	store: &'s mut EntityStore,
	entity: Entity,
	batch: EntityBatch,
	applied: bool,
}

impl EntityStore {
	/// Start recording a batch of changes against `entity`.
	pub fn batch(&mut self, entity: Entity) -> Result<BoundBatch<'_>, EcsError> {
		self.validate(entity)?;
		Ok(BoundBatch {
			batch: EntityBatch::new(self.registry.clone()),
			store: self,
			entity,
			applied: false,
		})
	}
}

impl<'s> BoundBatch<'s> {
	pub fn add<T: Component>(&mut self, value: T) -> Result<&mut Self, EcsError> {
		self.check_not_applied()?;
		self.batch.add(value)?;
		Ok(self)
	}

	pub fn remove<T: Component>(&mut self) -> Result<&mut Self, EcsError> {
		self.check_not_applied()?;
		self.batch.remove::<T>()?;
		Ok(self)
	}

	pub fn add_tag<G: Tag>(&mut self) -> Result<&mut Self, EcsError> {
		self.check_not_applied()?;
		self.batch.add_tag::<G>()?;
		Ok(self)
	}

	pub fn remove_tag<G: Tag>(&mut self) -> Result<&mut Self, EcsError> {
		self.check_not_applied()?;
		self.batch.remove_tag::<G>()?;
		Ok(self)
	}

	pub fn command_count(&self) -> usize {
		self.batch.command_count()
	}

	/// Apply the recorded commands in one structural step.
	pub fn apply(&mut self) -> Result<(), EcsError> {
		self.check_not_applied()?;
		self.applied = true;
		self.batch.apply_to(self.store, self.entity)
	}

	fn check_not_applied(&self) -> Result<(), EcsError> {
		if self.applied {
			return Err(EcsError::BatchAlreadyApplied);
		}
		Ok(())
	}
}

impl EntityStore {
	/// Apply a batch's commands to the entity in one step: index upkeep for
	/// overwritten and removed members, at most one row move, staged writes,
	/// then events.
	pub(crate) fn apply_batch(&mut self, id: u32, batch: &EntityBatch) {
		let (archetype, row) = self.location(id);
		let old_components = *self.archetypes.archetype(archetype).components();
		let old_tags = *self.archetypes.archetype(archetype).tags();

		// Index entries keyed off pre-move values must go first.
		for staged in &batch.staged {
			if old_components.get(staged.component.value()) {
				self.index_remove_for(id, staged.component, archetype, row);
			}
		}
		for component in batch.remove_components.iter() {
			if old_components.get(component) {
				self.index_remove_for(id, ComponentId::new(component as u16), archetype, row);
			}
		}

		let mut components = old_components;
		components.union_with(&batch.add_components);
		components.difference_with(&batch.remove_components);
		let mut tags = old_tags;
		tags.union_with(&batch.add_tags);
		tags.difference_with(&batch.remove_tags);

		let target = self.archetypes.lookup_or_create(components, tags);
		if target != archetype {
			self.move_rows(id, archetype, target);
		}

		let (archetype, row) = self.location(id);
		for staged in &batch.staged {
			let heap = self
				.archetypes
				.archetype_mut(archetype)
				.heap_mut(staged.component)
				.unwrap();
			heap.write_boxed(row, (staged.clone)(&*staged.value));
		}
		for staged in &batch.staged {
			self.index_insert_for(id, staged.component, archetype, row);
		}

		let entity = EntityId::new(id);
		for component in batch.add_components.iter() {
			self.emit(ChangeEvent::ComponentAdded {
				entity,
				component: ComponentId::new(component as u16),
			});
		}
		for component in batch.remove_components.iter() {
			if old_components.get(component) {
				self.emit(ChangeEvent::ComponentRemoved {
					entity,
					component: ComponentId::new(component as u16),
				});
			}
		}
		for tag in batch.add_tags.iter() {
			if !old_tags.get(tag) {
				self.emit(ChangeEvent::TagAdded {
					entity,
					tag: TagId::new(tag as u16),
				});
			}
		}
		for tag in batch.remove_tags.iter() {
			if old_tags.get(tag) {
				self.emit(ChangeEvent::TagRemoved {
					entity,
					tag: TagId::new(tag as u16),
				});
			}
		}
	}
}
