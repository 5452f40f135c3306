//! Storage implementations for the auth system.
//!
//! - **File store** - JSON object on disk, for the demo binary and for
//!   sessions that must survive a restart

pub mod file;

// Re-exports
pub use file::FileKeyValueStore;
