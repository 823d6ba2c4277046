//! Command handlers for the Scholar CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod info;
pub mod inspect;
pub mod search;

// Re-export command types for convenience
pub use info::InfoCommand;
pub use inspect::InspectCommand;
pub use search::SearchCommand;
