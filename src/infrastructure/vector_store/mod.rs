//! Vector store implementations

mod in_memory;
mod redis;

pub use in_memory::InMemoryVectorStore;
pub use redis::RedisVectorStore;
