//! Persistence: the document store and the token denylist

pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod token_revocation;
pub mod traits;

pub use memory::{create_memory_store, MemoryDocumentStore};
pub use traits::{Condition, Document, DocumentStore, Filter, Query, SharedDocumentStore, SortOrder};
