//! All-time-high tracking: one zone per symbol, persisted across runs
//! through the `AthStore` seam.

use std::collections::HashMap;

use crate::analysis::snapshot::{derived_stats_at, snapshot_at};
use crate::errors::DetectError;
use crate::models::timeseries::CandleSeries;
use crate::models::zone::{Zone, ZoneKind, ZonePayload};
use crate::utils::maths_utils::argmax_index;

/// Builds the ATH zone of a series: the full range of the bar with the
/// highest high.
pub fn ath_zone_from_series(series: &CandleSeries) -> Result<Zone, DetectError> {
    if series.is_empty() {
        return Err(DetectError::TooShortSeries { needed: 1, got: 0 });
    }
    let idx = argmax_index(&series.high_prices);
    Ok(Zone::new(
        ZoneKind::Ath,
        &series.symbol,
        series.timeframe,
        series.low_prices[idx],
        series.high_prices[idx],
        idx,
        series.timestamp_ms(idx),
        snapshot_at(series, idx),
        derived_stats_at(series, idx),
        ZonePayload::Ath,
    ))
}

/// Reconciles a freshly computed ATH with the stored one. The zone with the
/// lower floor wins: a stored ATH is only replaced when the candidate's
/// `price_low` undercuts it, widening the ceiling band downward over time.
pub fn update(candidate: Zone, stored: Option<Zone>) -> Zone {
    match stored {
        None => candidate,
        Some(stored) if candidate.price_low < stored.price_low => candidate,
        Some(stored) => stored,
    }
}

/// Where ATH zones live between runs. Get/set per symbol; the in-memory
/// implementation backs the CLI, anything else is the caller's business.
pub trait AthStore {
    fn get(&self, symbol: &str) -> Option<Zone>;
    fn set(&mut self, symbol: &str, zone: Zone);
}

#[derive(Debug, Default)]
pub struct MemoryAthStore {
    zones: HashMap<String, Zone>,
}

impl MemoryAthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AthStore for MemoryAthStore {
    fn get(&self, symbol: &str) -> Option<Zone> {
        self.zones.get(symbol).cloned()
    }

    fn set(&mut self, symbol: &str, zone: Zone) {
        self.zones.insert(symbol.to_string(), zone);
    }
}
