//! Service Module
//!
//! In-memory state shared between the poller and the HTTP handlers.

pub mod state;

// Re-export for convenience
pub use state::{StateError, StateStore};
