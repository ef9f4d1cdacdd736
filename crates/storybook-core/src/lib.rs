//! Storybook Core: shared domain abstractions.
//!
//! This crate defines the story data model, the error taxonomy, the
//! illustration style vocabulary, and the traits every generative model
//! adapter implements. It contains no infrastructure code.

pub mod error;
pub mod model;
pub mod story;
pub mod style;
