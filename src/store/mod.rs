//! Session persistence.

pub mod draft;
pub mod memory;
pub mod traits;

pub use draft::DraftState;
pub use memory::{MemorySessionStore, spawn_sweeper};
pub use traits::SessionStore;
