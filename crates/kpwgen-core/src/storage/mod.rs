//! Key-value backends for persisted settings
//!
//! This module provides two backends:
//! 1. JSON file in the user's data directory
//! 2. In-memory map (tests and throwaway sessions)

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
