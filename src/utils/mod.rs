//! Utility modules for the prerender pipeline.

pub mod abort;
pub mod exec;
pub mod log;
pub mod route;
pub mod wait;
