//! RediSearch-backed vector store
//!
//! Entries live in hashes under a common key prefix, indexed by a FLAT
//! FLOAT32 COSINE vector field. Nearest-neighbor queries use KNN with the
//! distance aliased into the result set; expiry is plain Redis TTL so the
//! store evicts on its own.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Value;
use tracing::{debug, info, warn};

use crate::domain::{CacheEntry, DomainError, Neighbor, TemporalClass, VectorStore};

/// Vector store backed by Redis with the RediSearch module.
#[derive(Clone)]
pub struct RedisVectorStore {
    conn: ConnectionManager,
    index: String,
    key_prefix: String,
    dimensions: usize,
}

impl std::fmt::Debug for RedisVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisVectorStore")
            .field("index", &self.index)
            .field("key_prefix", &self.key_prefix)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl RedisVectorStore {
    /// Connect, configure eviction and make sure the search index exists.
    pub async fn connect(
        url: &str,
        index: impl Into<String>,
        key_prefix: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, DomainError> {
        let client = redis::Client::open(url)
            .map_err(|e| DomainError::configuration(format!("invalid redis url: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::store(format!("redis connection failed: {}", e)))?;

        let store = Self {
            conn,
            index: index.into(),
            key_prefix: key_prefix.into(),
            dimensions,
        };

        store.configure_eviction().await;
        store.ensure_index().await?;

        Ok(store)
    }

    /// Prefer evicting entries that carry a TTL. Best effort; managed Redis
    /// deployments often refuse CONFIG SET.
    async fn configure_eviction(&self) {
        let mut conn = self.conn.clone();
        let result: Result<(), _> = redis::cmd("CONFIG")
            .arg("SET")
            .arg("maxmemory-policy")
            .arg("volatile-ttl")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => info!("redis eviction policy set to volatile-ttl"),
            Err(e) => warn!(error = %e, "could not set redis eviction policy"),
        }
    }

    async fn ensure_index(&self) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();

        let exists: Result<Value, _> = redis::cmd("FT.INFO")
            .arg(&self.index)
            .query_async(&mut conn)
            .await;

        if exists.is_ok() {
            debug!(index = %self.index, "redis search index already exists");
            return Ok(());
        }

        info!(index = %self.index, dimensions = self.dimensions, "creating redis search index");

        redis::cmd("FT.CREATE")
            .arg(&self.index)
            .arg("ON")
            .arg("HASH")
            .arg("PREFIX")
            .arg(1)
            .arg(&self.key_prefix)
            .arg("SCHEMA")
            .arg("query")
            .arg("TEXT")
            .arg("response")
            .arg("TEXT")
            .arg("temporal_class")
            .arg("TEXT")
            .arg("topic")
            .arg("TAG")
            .arg("created_at")
            .arg("NUMERIC")
            .arg("embedding")
            .arg("VECTOR")
            .arg("FLAT")
            .arg(6)
            .arg("TYPE")
            .arg("FLOAT32")
            .arg("DIM")
            .arg(self.dimensions)
            .arg("DISTANCE_METRIC")
            .arg("COSINE")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::store(format!("failed to create index: {}", e)))?;

        Ok(())
    }

    fn redis_key(&self, content_key: &str) -> String {
        format!("{}{}", self.key_prefix, content_key)
    }
}

#[async_trait]
impl VectorStore for RedisVectorStore {
    async fn find_nearest(
        &self,
        embedding: &[f32],
        partition: Option<&str>,
    ) -> Result<Option<Neighbor>, DomainError> {
        let mut conn = self.conn.clone();

        let query = match partition {
            Some(topic) => format!("(@topic:{{{}}})=>[KNN 1 @embedding $vec AS distance]", topic),
            None => "*=>[KNN 1 @embedding $vec AS distance]".to_string(),
        };

        let reply: Value = redis::cmd("FT.SEARCH")
            .arg(&self.index)
            .arg(&query)
            .arg("PARAMS")
            .arg(2)
            .arg("vec")
            .arg(embedding_blob(embedding))
            .arg("SORTBY")
            .arg("distance")
            .arg("RETURN")
            .arg(7)
            .arg("query")
            .arg("response")
            .arg("temporal_class")
            .arg("topic")
            .arg("created_at")
            .arg("embedding")
            .arg("distance")
            .arg("DIALECT")
            .arg(2)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::store(format!("redis search failed: {}", e)))?;

        parse_search_reply(reply, &self.key_prefix)
    }

    async fn upsert(&self, entry: CacheEntry, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let key = self.redis_key(&entry.key);

        redis::pipe()
            .cmd("HSET")
            .arg(&key)
            .arg("query")
            .arg(&entry.query)
            .arg("response")
            .arg(&entry.response)
            .arg("temporal_class")
            .arg(entry.temporal_class.as_str())
            .arg("topic")
            .arg(&entry.topic)
            .arg("created_at")
            .arg(entry.created_at)
            .arg("embedding")
            .arg(embedding_blob(&entry.embedding))
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl.as_secs())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::store(format!("redis store failed: {}", e)))?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "cached entry stored");

        Ok(())
    }
}

fn embedding_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn embedding_from_blob(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Decode a RESP2 FT.SEARCH reply: `[count, key, [field, value, ...], ...]`.
fn parse_search_reply(reply: Value, key_prefix: &str) -> Result<Option<Neighbor>, DomainError> {
    let Value::Array(items) = reply else {
        return Err(DomainError::store("unexpected search reply shape"));
    };

    // items[0] is the total count; the first document starts at index 1.
    let (Some(doc_key), Some(doc_fields)) = (items.get(1), items.get(2)) else {
        return Ok(None);
    };

    let raw_key = string_value(doc_key)?;
    let content_key = raw_key.strip_prefix(key_prefix).unwrap_or(&raw_key).to_string();

    let Value::Array(fields) = doc_fields else {
        return Err(DomainError::store("unexpected document shape"));
    };

    let mut query = String::new();
    let mut response = String::new();
    let mut temporal_class = TemporalClass::Evergreen;
    let mut topic = String::new();
    let mut created_at = 0i64;
    let mut embedding = Vec::new();
    let mut distance = 0f32;

    for pair in fields.chunks_exact(2) {
        let name = string_value(&pair[0])?;
        match name.as_str() {
            "query" => query = string_value(&pair[1])?,
            "response" => response = string_value(&pair[1])?,
            "temporal_class" => {
                temporal_class = match string_value(&pair[1])?.as_str() {
                    "time_sensitive" => TemporalClass::TimeSensitive,
                    _ => TemporalClass::Evergreen,
                }
            }
            "topic" => topic = string_value(&pair[1])?,
            "created_at" => created_at = string_value(&pair[1])?.parse().unwrap_or(0),
            "embedding" => {
                if let Value::BulkString(blob) = &pair[1] {
                    embedding = embedding_from_blob(blob);
                }
            }
            "distance" => {
                distance = string_value(&pair[1])?
                    .parse()
                    .map_err(|e| DomainError::store(format!("bad distance value: {}", e)))?
            }
            _ => {}
        }
    }

    Ok(Some(Neighbor {
        entry: CacheEntry {
            key: content_key,
            query,
            response,
            temporal_class,
            topic,
            embedding,
            created_at,
        },
        distance,
    }))
}

fn string_value(value: &Value) -> Result<String, DomainError> {
    match value {
        Value::BulkString(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Value::SimpleString(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        other => Err(DomainError::store(format!(
            "unexpected redis value: {:?}",
            other
        ))),
    }
}
