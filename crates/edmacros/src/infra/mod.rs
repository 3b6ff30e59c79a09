//! Infrastructure adapters for config, headless hosting, and external integrations.

pub mod browser;
pub mod buffer;
pub mod config;
pub mod host;
