mod app_config;

pub use app_config::{
    AppConfig, BreakerConfig, BreakersConfig, CacheBackend, CacheConfig, EmbeddingConfig,
    GenerationConfig, LogFormat, LoggingConfig, ServerConfig,
};
