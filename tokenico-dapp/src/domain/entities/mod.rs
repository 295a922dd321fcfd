//! Domain entities and value objects
//!
//! Networks, wallet sessions and token/sale snapshots.

pub mod network;
pub mod session;
pub mod token;

// Re-export entities
pub use network::*;
pub use session::*;
pub use token::*;
