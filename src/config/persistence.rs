//! File persistence and serialization configuration

/// Default path of the candle cache consumed by the CLI
pub const DEFAULT_CACHE_PATH: &str = "zone_cache.bin";

/// Current version of the cache serialization format
/// Bump whenever the on-disk layout of [`crate::data::CacheFile`] changes
pub const CACHE_VERSION: f64 = 1.0;
