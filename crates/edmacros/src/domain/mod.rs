//! Domain types shared by every macro.

pub mod errors;
pub mod host;
pub mod model;
