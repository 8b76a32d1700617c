mod in_memory;
mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use r#trait::{EntityStore, Mutation, StoreError, WriteBatch};
