//! Collaborator implementations
//!
//! Record stores and renderers that plug into the core contracts.

#[cfg(not(target_arch = "wasm32"))]
mod command_renderer;
#[cfg(not(target_arch = "wasm32"))]
mod file_store;
mod memory_store;

#[cfg(not(target_arch = "wasm32"))]
pub use command_renderer::*;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::*;
pub use memory_store::*;
