//! Backend test support utilities
//!
//! Shared by the engine's integration tests: one-time logging setup, unique
//! ids for test isolation, and assertions over the error reply contract.

pub mod error_contract;
pub mod logging;
pub mod unique_helpers;
