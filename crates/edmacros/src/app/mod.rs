//! Application layer: the macros and the registry that runs them.

pub mod escape;
pub mod open;
pub mod registry;
pub mod sort;
