//! Candle data containers and cache persistence.

pub mod cache_file;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;
use crate::models::timeseries::CandleSeries;

pub use cache_file::CacheFile;

/// Everything a detection run consumes: one series per symbol/timeframe
/// combination, typically several timeframes per symbol.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct CandleCollection {
    pub name: String, // Metadata e.g. "Binance 2024 backfill".
    pub series: Vec<CandleSeries>,
}

impl CandleCollection {
    pub fn unique_symbols(&self) -> Vec<String> {
        // BTreeSet maintains sorted order and ensures uniqueness
        self.series
            .iter()
            .map(|s| s.symbol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn get_series(&self, symbol: &str, timeframe: Timeframe) -> Option<&CandleSeries> {
        self.series
            .iter()
            .find(|s| s.symbol == symbol && s.timeframe == timeframe)
    }

    /// Drops every series not belonging to `symbol` (CLI single-symbol runs).
    pub fn retain_symbol(&mut self, symbol: &str) {
        self.series.retain(|s| s.symbol == symbol);
    }
}
