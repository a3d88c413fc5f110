//! Deferred and aggregated mutation: entity batches collapsing many changes
//! into one structural step, and command buffers recording changes for
//! later playback.

mod command_buffer;
mod entity_batch;

pub use command_buffer::{CommandBuffer, CommandTarget, PendingEntity};
pub use entity_batch::{BoundBatch, EntityBatch};
