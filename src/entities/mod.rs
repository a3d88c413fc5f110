//! The entity index and structural-change engine: id allocation, node
//! resolution, component/tag mutation, the entity tree, change notification
//! and the name-keyed import/export boundary.

mod data_entity;
mod entity;
mod entity_store;
mod events;
pub(crate) mod tree;

pub use data_entity::DataEntity;
pub use entity::{Entity, EntityId};
pub use entity_store::EntityStore;
pub use events::ChangeEvent;

pub(crate) use entity::{EntityNode, NO_ARCHETYPE, NO_PARENT};
pub(crate) use events::ChangeHook;
