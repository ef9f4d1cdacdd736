//! Application layer: the generation steps and the pipeline that sequences them.

pub mod assets;
pub mod image_prompts;
pub mod outline;
pub mod pipeline;
