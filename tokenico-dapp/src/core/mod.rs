//! Core dApp functionality
//!
//! Network registry and switching, wallet connection, contract binding,
//! on-chain readers and the application state that ties them together.

pub mod contracts;
pub mod readers;
pub mod registry;
pub mod state;
pub mod switcher;
pub mod wallet;
