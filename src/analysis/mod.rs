// Detection, confluence, and annotation passes over candle series
pub mod ath;
pub mod confluence;
pub mod liquidity;
pub mod merge;
pub mod nearby;
pub mod normalize;
pub mod pipeline;
pub mod reaction;
pub mod snapshot;
pub mod structure_zones;
pub mod swings;

// Re-export commonly used types
pub use merge::CombinedZone;
pub use pipeline::{CollectionReport, SymbolReport, run_collection, run_symbol};
