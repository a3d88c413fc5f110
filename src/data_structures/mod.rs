mod bit_set;
mod id_set;

pub use bit_set::*;
pub use id_set::*;
