//! Domain layer - entities shared by every component of the dApp.

pub mod entities;

// Re-export domain components
pub use entities::*;
