// Compiler orchestration: workspaces, sanitizing, engine runs, and the render pipeline.
pub mod assets;
pub mod compiler;
pub mod handlers;
pub mod log;
pub mod pipeline;
pub mod sanitizer;
pub mod workspace;
