//! Cache domain: entries, policies and the vector store contract

mod entry;
mod policy;
mod store;

pub use entry::{cache_key, CacheEntry};
pub use policy::CachePolicy;
pub use store::{Neighbor, VectorStore};
