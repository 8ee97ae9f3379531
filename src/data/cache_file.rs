use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::CACHE_VERSION;
use crate::data::CandleCollection;

/// Serialized cache wrapper produced by `make_demo_cache` or an external
/// backfill job and consumed by the CLI.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheFile {
    pub version: f64,
    pub created_at_ms: i64,
    pub collection: CandleCollection,
}

impl CacheFile {
    pub fn new(collection: CandleCollection) -> Self {
        Self {
            version: CACHE_VERSION,
            created_at_ms: Utc::now().timestamp_millis(),
            collection,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open cache file: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let cache: CacheFile = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize cache: {:?}", path))?;
        if cache.version != CACHE_VERSION {
            bail!(
                "Cache version mismatch: {:?} has v{}, this build reads v{}",
                path,
                cache.version,
                CACHE_VERSION
            );
        }
        Ok(cache)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize cache to: {}", path.display()))
    }
}
