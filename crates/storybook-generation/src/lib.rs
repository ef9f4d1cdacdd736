//! Storybook: story generation pipeline.
//!
//! Turns a prompt into an outline, fans out one illustration task per page
//! plus a cover task, and merges every outcome back into the book by page
//! index. A failed illustration only ever affects its own page.

pub mod application;
pub mod domain;
