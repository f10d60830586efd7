//! Core abstractions for the editor
//!
//! The record model, the collaborator contracts (store, renderer, editing
//! surface, confirmation) and the small pieces of UI state that do not
//! depend on any collaborator.

mod error;
mod layout;
mod listing;
pub mod logging;
mod notification;
mod record;
mod renderer;
mod store;
mod surface;
mod viewport;

pub use error::*;
pub use layout::*;
pub use listing::*;
pub use logging::*;
pub use notification::*;
pub use record::*;
pub use renderer::*;
pub use store::*;
pub use surface::*;
pub use viewport::*;
