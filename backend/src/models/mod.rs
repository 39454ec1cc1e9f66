//! Database models for the Farm Operations Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
