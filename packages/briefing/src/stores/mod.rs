//! Storage implementations.

mod memory;

pub use memory::{MemoryArticleStore, MemoryOrganizationDirectory};
