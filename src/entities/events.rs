use crate::entities::{EntityId, EntityStore};
use crate::schema::{ComponentId, TagId};

/// A structural change that already happened.
///
/// Events are delivered synchronously, in line with the mutating call, after
/// the store reflects the post-change state; hooks observe the store as the
/// caller will see it on return.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ChangeEvent {
	EntityCreated { entity: EntityId },
	EntityDeleted { entity: EntityId },
	ComponentAdded { entity: EntityId, component: ComponentId },
	ComponentRemoved { entity: EntityId, component: ComponentId },
	TagAdded { entity: EntityId, tag: TagId },
	TagRemoved { entity: EntityId, tag: TagId },
	ChildAdded { parent: EntityId, child: EntityId },
	ChildRemoved { parent: EntityId, child: EntityId },
}

pub(crate) type ChangeHook = Box<dyn FnMut(&EntityStore, &ChangeEvent) + Send>;
