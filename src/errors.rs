use crate::entities::EntityId;
use thiserror::Error;

/// Errors surfaced by the storage engine.
///
/// Every failure is synchronous and reported to the direct caller.
/// A rejected structural change leaves the store untouched; there is no
/// partial application and no rollback machinery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
	/// An entity id outside the valid range was passed in. Id 0 is reserved.
	#[error("invalid entity id: {0}")]
	InvalidEntityId(i64),

	/// An explicit entity id is already occupied by a live entity.
	#[error("entity id already in use: {0}")]
	IdInUse(EntityId),

	/// The entity handle refers to an entity that has since been deleted.
	#[error("entity {0} is stale; it was deleted from the store")]
	StaleEntity(EntityId),

	/// The entity handle belongs to a different [`EntityStore`](crate::entities::EntityStore).
	#[error("entity {0} belongs to a different store")]
	ForeignEntity(EntityId),

	/// The component type was never registered with the store's [`TypeRegistry`](crate::schema::TypeRegistry).
	#[error("component type not registered: {0}")]
	UnknownComponent(String),

	/// The tag type was never registered with the store's [`TypeRegistry`](crate::schema::TypeRegistry).
	#[error("tag type not registered: {0}")]
	UnknownTag(String),

	/// The relation type was never registered with the store's [`TypeRegistry`](crate::schema::TypeRegistry).
	#[error("relation type not registered: {0}")]
	UnknownRelation(String),

	/// Re-parenting would create a cycle. `path` lists the offending ancestor
	/// chain, e.g. `"2 -> 1 -> 2"`.
	#[error("cycle in entity tree: {path}")]
	TreeCycle { path: String },

	/// The store already has a root entity.
	#[error("store root already set to entity {0}")]
	RootAlreadySet(EntityId),

	/// The batch was already applied; applied batches are terminal.
	#[error("batch already applied")]
	BatchAlreadyApplied,

	/// No entity matched the lookup key.
	#[error("no entity found for the given key")]
	NotFound,

	/// More than one entity matched a unique lookup key.
	#[error("{0} entities match a unique lookup key")]
	NotUnique(usize),
}
