//! The type registry: stable small integer ids for component, tag and
//! relation types, assigned once at startup and immutable afterwards.

mod component;
mod registry;

pub use component::*;
pub use registry::*;
