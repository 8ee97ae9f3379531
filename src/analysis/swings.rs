//! Swing detection and market-structure labeling.
//!
//! A bar is a swing high when its high is the maximum over a centered window,
//! and a swing low when its low is the window minimum. At the edges of the
//! series the window is clipped rather than skipped, so the first and last
//! bars are always classifiable.

use serde::{Deserialize, Serialize};

use crate::models::timeseries::CandleSeries;
use crate::utils::maths_utils::{get_max, get_min};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingKind {
    High,
    Low,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SwingPoint {
    pub index: usize,
    pub time_ms: i64,
    pub price: f64,
    pub kind: SwingKind,
    pub volume: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureLabel {
    HigherHigh,
    LowerHigh,
    HigherLow,
    LowerLow,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabeledSwing {
    pub swing: SwingPoint,
    pub label: StructureLabel,
    pub trend: Trend,
}

/// Finds every swing high/low using a window of `window` bars on each side.
/// A bar that qualifies as both is classified as a swing high.
pub fn detect(series: &CandleSeries, window: usize) -> Vec<SwingPoint> {
    let len = series.len();
    if len == 0 {
        return Vec::new();
    }

    let mut swings = Vec::new();
    for i in 0..len {
        let start = i.saturating_sub(window);
        let end = (i + window).min(len - 1);
        let is_swing_high = series.high_prices[i] == get_max(&series.high_prices[start..=end]);
        let is_swing_low = series.low_prices[i] == get_min(&series.low_prices[start..=end]);

        if is_swing_high {
            swings.push(SwingPoint {
                index: i,
                time_ms: series.timestamp_ms(i),
                price: series.high_prices[i],
                kind: SwingKind::High,
                volume: series.volumes[i],
            });
        } else if is_swing_low {
            swings.push(SwingPoint {
                index: i,
                time_ms: series.timestamp_ms(i),
                price: series.low_prices[i],
                kind: SwingKind::Low,
                volume: series.volumes[i],
            });
        }
    }
    swings
}

/// Labels each swing against the last swing of the same kind. The first high
/// is a HigherHigh and the first low a HigherLow by convention. Trend starts
/// Neutral, flips bullish on a HigherHigh and bearish on a LowerLow, and
/// holds through LowerHigh/HigherLow.
pub fn label_structure(swings: &[SwingPoint]) -> Vec<LabeledSwing> {
    let mut labeled = Vec::with_capacity(swings.len());
    let mut last_high: Option<f64> = None;
    let mut last_low: Option<f64> = None;
    let mut trend = Trend::Neutral;

    for swing in swings {
        let label = match swing.kind {
            SwingKind::High => {
                let label = match last_high {
                    Some(prev) if swing.price <= prev => StructureLabel::LowerHigh,
                    _ => StructureLabel::HigherHigh,
                };
                last_high = Some(swing.price);
                label
            }
            SwingKind::Low => {
                let label = match last_low {
                    Some(prev) if swing.price <= prev => StructureLabel::LowerLow,
                    _ => StructureLabel::HigherLow,
                };
                last_low = Some(swing.price);
                label
            }
        };

        trend = match label {
            StructureLabel::HigherHigh => Trend::Bullish,
            StructureLabel::LowerLow => Trend::Bearish,
            _ => trend,
        };

        labeled.push(LabeledSwing {
            swing: swing.clone(),
            label,
            trend,
        });
    }
    labeled
}
