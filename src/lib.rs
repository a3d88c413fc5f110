pub mod data_structures;
pub mod schema;
pub mod archetypes;
pub mod entities;
pub mod queries;
pub mod jobs;
pub mod index;
pub mod batch;
mod errors;

pub use errors::EcsError;

pub mod prelude {
	pub use crate::errors::EcsError;
	pub use crate::schema::{
		Component, ComponentId, Disabled, IndexedComponent, LinkComponent, Relation,
		SchemaBuilder, Tag, TagId, TypeRegistry,
	};
	pub use crate::archetypes::ArchetypeId;
	pub use crate::entities::{ChangeEvent, DataEntity, Entity, EntityId, EntityStore};
	pub use crate::queries::{Query, QueryFilter};
	pub use crate::jobs::JobRunner;
	pub use crate::index::ValueIndex;
	pub use crate::batch::{CommandBuffer, EntityBatch, PendingEntity};
}

#[cfg(test)]
mod tests;
