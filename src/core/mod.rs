// src/core/mod.rs
//! Storage and templating services shared by the generator and the engine

pub mod fs_ops;
pub mod template_engine;

pub use fs_ops::FsOps;
pub use template_engine::{CompiledTemplate, TemplateEngine};
