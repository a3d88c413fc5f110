use crate::entities::EntityId;
use std::hash::Hash;

/// A piece of data attached to an entity, stored in the columnar heaps of the
/// entity's archetype.
///
/// Components are plain values. `Default` provides the value written when a
/// structural change introduces the type without an explicit value.
pub trait Component: 'static + Clone + Default + Send + Sync {}

/// A zero-size marker affecting archetype identity but carrying no data.
pub trait Tag: 'static + Default {}

/// Key types usable by [value indices](crate::index::ValueIndex) and
/// [relations](Relation). Blanket-implemented.
pub trait IndexKey: 'static + Clone + Eq + Ord + Hash + Send + Sync {}

impl<T: 'static + Clone + Eq + Ord + Hash + Send + Sync> IndexKey for T {}

/// A [Component] whose value is mirrored into a secondary
/// [ValueIndex](crate::index::ValueIndex), enabling equality and sorted-range
/// lookups without scanning archetypes.
///
/// The index is maintained synchronously by the structural-change engine;
/// the owning entity's ownership bit tracks membership.
pub trait IndexedComponent: Component {
	type Key: IndexKey;

	/// The indexed key of this component value.
	fn key(&self) -> Self::Key;
}

/// An [IndexedComponent] holding a non-owning reference to another entity.
///
/// The indexed key is the target entity id, so the index doubles as the
/// reverse map from a target to the entities linking to it. Deleting the
/// target removes the link component from every source entity.
pub trait LinkComponent: IndexedComponent<Key = EntityId> {
	/// The referenced entity.
	fn target(&self) -> EntityId;
}

/// A per-entity, possibly multi-valued relation keyed by an arbitrary key.
///
/// An entity holds at most one relation value per distinct key; adding a
/// second value with the same key replaces the first. Relations living
/// outside the archetype heaps do not cause structural changes.
pub trait Relation: 'static + Clone + Send + Sync {
	type Key: IndexKey;

	/// The key distinguishing this relation from the entity's other
	/// relations of the same type.
	fn key(&self) -> Self::Key;

	/// The referenced entity, if this relation links to one. Link relations
	/// maintain a reverse target -> sources map and the target's linkage bit.
	fn link_target(&self) -> Option<EntityId> {
		None
	}
}

/// Built-in tag excluding an entity from query results unless the query
/// opts in via [`Query::with_disabled`](crate::queries::Query::with_disabled).
#[derive(Default, Copy, Clone, Debug)]
pub struct Disabled;

impl Tag for Disabled {}
