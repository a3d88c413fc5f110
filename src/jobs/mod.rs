//! The parallel job runner: a fixed fork-join pool splitting large archetype
//! chunks into vector-width-aligned sections.

mod runner;
mod sections;

pub use runner::JobRunner;

pub(crate) use sections::section_length;
