//! Configuration module for the zone detection pipeline.

pub mod analysis;

mod debug; // Can be private now because we have a public re-export. Forces files to use crate::config::PRINT_* not crate::config::debug::PRINT_*
pub use debug::{
    PRINT_CONFLUENCE_FOR_SYMBOL, PRINT_MERGE_STEPS, PRINT_POOL_MEMBERS, PRINT_SCAN_SUMMARY,
};

pub mod persistence;
pub mod symbols;

// Re-export commonly used items
pub use analysis::DETECTION;
pub use persistence::{CACHE_VERSION, DEFAULT_CACHE_PATH};
pub use symbols::{SymbolThresholds, ThresholdBook};
