//! Secondary lookup structures maintained synchronously by the structural
//! engine: value indexes over indexed component keys and per-entity relation
//! stores with reverse target maps.

mod relations;
mod value_index;

pub use value_index::ValueIndex;

pub(crate) use relations::*;
pub(crate) use value_index::{index_ops, link_index_ops, make_value_index};
