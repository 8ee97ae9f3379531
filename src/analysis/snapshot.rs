//! Per-bar context captured onto every zone at creation time.

use statrs::statistics::Statistics;

use crate::models::timeseries::CandleSeries;
use crate::models::zone::{DerivedStats, IndicatorSnapshot};
use crate::utils::maths_utils::{window_mean, window_std};

// Width of the lookback window behind every derived stat.
pub const STAT_WINDOW: usize = 5;

/// Indicator values at one bar. Columns the upstream pipeline did not attach
/// stay `None`; warmup NaNs are treated as absent too.
pub fn snapshot_at(series: &CandleSeries, idx: usize) -> IndicatorSnapshot {
    let mut snapshot = IndicatorSnapshot::default();
    for (name, values) in series.indicators.present() {
        if let Some(&value) = values.get(idx) {
            if value.is_finite() {
                snapshot.set_field(name, value);
            }
        }
    }
    snapshot
}

/// Per-column mean of indicator values across a pool's member bars.
pub fn mean_snapshot(series: &CandleSeries, member_indices: &[usize]) -> IndicatorSnapshot {
    let mut snapshot = IndicatorSnapshot::default();
    for (name, values) in series.indicators.present() {
        let member_values: Vec<f64> = member_indices
            .iter()
            .filter_map(|&idx| values.get(idx).copied())
            .filter(|v| v.is_finite())
            .collect();
        if !member_values.is_empty() {
            snapshot.set_field(name, member_values.iter().mean());
        }
    }
    snapshot
}

/// Volume/volatility/momentum context over the bars leading into `idx`.
/// Windows clip at the start of the series, so this is total for any valid
/// bar index.
pub fn derived_stats_at(series: &CandleSeries, idx: usize) -> DerivedStats {
    DerivedStats {
        avg_volume_5: window_mean(&series.volumes, idx, STAT_WINDOW).unwrap_or(0.0),
        close_std_5: window_std(&series.close_prices, idx, STAT_WINDOW).unwrap_or(0.0),
        momentum_5: series.close_prices[idx]
            - series.close_prices[idx.saturating_sub(STAT_WINDOW)],
    }
}
