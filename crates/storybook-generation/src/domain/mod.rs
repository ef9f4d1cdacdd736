//! Domain types for story generation.

pub mod commands;
pub mod outcome;
pub mod schema;
