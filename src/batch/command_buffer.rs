use crate::entities::{Entity, EntityStore};
use crate::errors::EcsError;
use crate::schema::{Component, ComponentId, Tag, TagId, TypeRegistry};
use std::any::Any;
use std::sync::Arc;

type Erased = dyn Any + Send + Sync;

/// A placeholder for an entity that will exist once the recording buffer is
/// played back. Usable as a command target within the same recording cycle;
/// playback invalidates it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PendingEntity {
	index: u32,
}

/// An entity a command applies to: either an existing handle or a pending
/// entity created earlier in the same buffer.
#[derive(Copy, Clone)]
pub enum CommandTarget {
	Existing(Entity),
	Pending(PendingEntity),
}

impl From<Entity> for CommandTarget {
	fn from(entity: Entity) -> Self {
		Self::Existing(entity)
	}
}

impl From<PendingEntity> for CommandTarget {
	fn from(pending: PendingEntity) -> Self {
		Self::Pending(pending)
	}
}

enum Command {
	Create,
	Delete(CommandTarget),
	AddComponent {
		target: CommandTarget,
		component: ComponentId,
		value: Box<Erased>,
	},
	RemoveComponent {
		target: CommandTarget,
		component: ComponentId,
	},
	AddTag {
		target: CommandTarget,
		tag: TagId,
	},
	RemoveTag {
		target: CommandTarget,
		tag: TagId,
	},
}

/// Records structural changes without touching the store, for playback later
/// in one pass. The sanctioned mutation path while a query borrows the store
/// or a parallel run is in flight.
///
/// Type lookups happen at record time, so recording surfaces unknown types
/// immediately; entity validation happens at playback.
pub struct CommandBuffer {
	registry: Arc<TypeRegistry>,
	commands: Vec<Command>,
	pending: u32,
}

impl CommandBuffer {
	pub fn new(registry: Arc<TypeRegistry>) -> Self {
		Self {
			registry,
			commands: Vec::new(),
			pending: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}

	/// Record creating an entity; the placeholder targets later commands in
	/// this buffer.
	pub fn create_entity(&mut self) -> PendingEntity {
		let pending = PendingEntity { index: self.pending };
		self.pending += 1;
		self.commands.push(Command::Create);
		pending
	}

	pub fn delete_entity(&mut self, target: impl Into<CommandTarget>) {
		self.commands.push(Command::Delete(target.into()));
	}

	pub fn add_component<T: Component>(
		&mut self, target: impl Into<CommandTarget>, value: T,
	) -> Result<(), EcsError> {
		let component = self.registry.component_id::<T>()?;
		self.commands.push(Command::AddComponent {
			target: target.into(),
			component,
			value: Box::new(value),
		});
		Ok(())
	}

	pub fn remove_component<T: Component>(
		&mut self, target: impl Into<CommandTarget>,
	) -> Result<(), EcsError> {
		let component = self.registry.component_id::<T>()?;
		self.commands.push(Command::RemoveComponent {
			target: target.into(),
			component,
		});
		Ok(())
	}

	pub fn add_tag<G: Tag>(&mut self, target: impl Into<CommandTarget>) -> Result<(), EcsError> {
		let tag = self.registry.tag_id::<G>()?;
		self.commands.push(Command::AddTag {
			target: target.into(),
			tag,
		});
		Ok(())
	}

	pub fn remove_tag<G: Tag>(&mut self, target: impl Into<CommandTarget>) -> Result<(), EcsError> {
		let tag = self.registry.tag_id::<G>()?;
		self.commands.push(Command::RemoveTag {
			target: target.into(),
			tag,
		});
		Ok(())
	}

	/// Apply the recorded commands in order and clear the buffer. Returns
	/// the entities created by the buffer, in creation order.
	///
	/// A stale or foreign target aborts playback with its error; commands
	/// recorded after the failing one are discarded with the rest of the
	/// buffer.
	pub fn playback(&mut self, store: &mut EntityStore) -> Result<Vec<Entity>, EcsError> {
		debug_assert!(Arc::ptr_eq(&self.registry, &store.registry));

		let commands = std::mem::take(&mut self.commands);
		self.pending = 0;

		let mut created = Vec::new();
		for command in commands {
			match command {
				Command::Create => created.push(store.create_entity()),
				Command::Delete(target) => {
					let id = resolve(store, &created, target)?;
					store.delete_entity_id(id);
				},
				Command::AddComponent { target, component, value } => {
					let id = resolve(store, &created, target)?;
					store.add_component_boxed(id, component, value);
				},
				Command::RemoveComponent { target, component } => {
					let id = resolve(store, &created, target)?;
					store.remove_component_id(id, component);
				},
				Command::AddTag { target, tag } => {
					let id = resolve(store, &created, target)?;
					store.add_tag_id(id, tag);
				},
				Command::RemoveTag { target, tag } => {
					let id = resolve(store, &created, target)?;
					store.remove_tag_id(id, tag);
				},
			}
		}
		Ok(created)
	}
}

fn resolve(store: &EntityStore, created: &[Entity], target: CommandTarget) -> Result<u32, EcsError> {
	match target {
		CommandTarget::Existing(entity) => store.validate(entity),
		// Placeholders only resolve within the recording cycle that issued
		// them; one kept across a playback is out of range here.
		CommandTarget::Pending(pending) => match created.get(pending.index as usize) {
			None => Err(EcsError::InvalidEntityId(pending.index as i64)),
			Some(entity) => store.validate(*entity),
		},
	}
}
