//! Archetypes group entities sharing an identical set of component types and
//! tags, storing their component values as parallel columnar arrays.

mod archetype_instance;
mod archetype_store;
mod heap;

pub use archetype_instance::ArchetypeId;

pub(crate) use archetype_instance::*;
pub(crate) use archetype_store::*;
pub(crate) use heap::*;
