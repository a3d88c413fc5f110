//! Cached archetype queries: typed component tuples, archetype filters,
//! chunked and per-row iteration, and value-index redirects.

mod query;
mod signature;

pub use query::{Query, QueryFilter};
pub use signature::ComponentTuple;

pub(crate) use query::QueryState;
pub(crate) use signature::Signature;
