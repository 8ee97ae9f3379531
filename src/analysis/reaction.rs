//! Touch/reaction classification: how price behaved when it first came back
//! to a zone, and the next zone it then moved fully through.

use crate::models::timeseries::CandleSeries;
use crate::models::zone::{CandleSnapshot, Reaction, TargetHit, TouchType, Zone};

/// Scans forward from the zone's creation bar in its own series. The first
/// bar that pierces the near edge of the band from outside is the touch;
/// its open/close geometry decides the touch type. From that bar onward the
/// batch candidates in `candidate_indices` are checked for the first full
/// traversal, which becomes the target.
pub fn classify(
    zone: &Zone,
    series: &CandleSeries,
    batch: &[Zone],
    candidate_indices: &[usize],
) -> Reaction {
    let mut reaction = Reaction::default();

    // The zone's index fields may have been rescaled for the batch, so the
    // creation bar is re-derived from its timestamp.
    let created = match series.index_of_time_ms(zone.created_time_ms) {
        Some(idx) => idx,
        None => {
            log::warn!(
                "creation time {} of {} zone not on the {} grid of {}",
                zone.created_time_ms,
                zone.kind,
                series.timeframe,
                series.symbol
            );
            return reaction;
        }
    };

    let touch_idx = (created + 1..series.len()).find(|&j| {
        (series.open_prices[j] > zone.price_high && series.low_prices[j] < zone.price_high)
            || (series.open_prices[j] < zone.price_low && series.high_prices[j] > zone.price_low)
    });

    let Some(touch_idx) = touch_idx else {
        return reaction; // never revisited
    };

    reaction.touch_type = Some(classify_touch(
        zone,
        series.open_prices[touch_idx],
        series.close_prices[touch_idx],
    ));
    reaction.touch_index = Some(touch_idx);
    reaction.touch_candle = Some(CandleSnapshot {
        open: series.open_prices[touch_idx],
        high: series.high_prices[touch_idx],
        low: series.low_prices[touch_idx],
        close: series.close_prices[touch_idx],
        volume: series.volumes[touch_idx],
    });
    reaction.target = find_target(series, batch, candidate_indices, touch_idx);
    reaction
}

fn classify_touch(zone: &Zone, open: f64, close: f64) -> TouchType {
    if close >= zone.price_low && close <= zone.price_high {
        TouchType::BodyCloseInside
    } else if (open > zone.price_high && close < zone.price_low)
        || (open < zone.price_low && close > zone.price_high)
    {
        TouchType::Engulf
    } else if open > zone.price_high && close > zone.price_high {
        TouchType::BodyCloseAbove
    } else if open < zone.price_low && close < zone.price_low {
        TouchType::BodyCloseBelow
    } else {
        // Only reachable when the open sits inside the band; the touch scan
        // in `classify` never forwards such a bar, direct callers can.
        TouchType::WickTouch
    }
}

// First candidate fully traversed by a bar at or after the touch. Bars are
// scanned chronologically; within one bar, candidates keep batch order.
fn find_target(
    series: &CandleSeries,
    batch: &[Zone],
    candidate_indices: &[usize],
    touch_idx: usize,
) -> Option<TargetHit> {
    for k in touch_idx..series.len() {
        let open = series.open_prices[k];
        let close = series.close_prices[k];
        let high = series.high_prices[k];
        let low = series.low_prices[k];

        for &c in candidate_indices {
            let candidate = &batch[c];
            let body_past = (open > candidate.price_high && close < candidate.price_low)
                || (open < candidate.price_low && close > candidate.price_high);
            let wick_straddle = high >= candidate.price_high && low <= candidate.price_low;

            if body_past || wick_straddle {
                return Some(TargetHit {
                    kind: candidate.kind,
                    timeframe: candidate.timeframe,
                    price_high: candidate.price_high,
                    price_low: candidate.price_low,
                    crossed_at_index: k,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timeframe::Timeframe;
    use crate::models::timeseries::IndicatorColumns;
    use crate::models::zone::{DerivedStats, IndicatorSnapshot, ZoneKind, ZonePayload};

    fn series_from_bars(bars: &[(f64, f64, f64, f64)]) -> CandleSeries {
        CandleSeries {
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::Min15,
            first_open_time_ms: 0,
            open_prices: bars.iter().map(|b| b.0).collect(),
            high_prices: bars.iter().map(|b| b.1).collect(),
            low_prices: bars.iter().map(|b| b.2).collect(),
            close_prices: bars.iter().map(|b| b.3).collect(),
            volumes: vec![2.0; bars.len()],
            trade_counts: vec![1; bars.len()],
            indicators: IndicatorColumns::default(),
        }
    }

    fn zone_at(kind: ZoneKind, low: f64, high: f64, created_index: usize) -> Zone {
        Zone::new(
            kind,
            "BTCUSDT",
            Timeframe::Min15,
            low,
            high,
            created_index,
            created_index as i64 * Timeframe::Min15.interval_ms(),
            IndicatorSnapshot::default(),
            DerivedStats::default(),
            ZonePayload::Structure {
                body_size: 1.0,
                wick_ratio: 0.0,
                zone_width: high - low,
            },
        )
    }

    #[test]
    fn test_body_close_inside() {
        // Zone [100, 110] created at bar 0; bar 2 opens above, dips in,
        // closes inside
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (112.0, 113.0, 111.0, 112.5), // stays above: no touch
            (115.0, 116.0, 105.0, 108.0), // touch
            (108.0, 109.0, 107.0, 108.5),
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let reaction = classify(&zone, &series, &[], &[]);

        assert_eq!(reaction.touch_type, Some(TouchType::BodyCloseInside));
        assert_eq!(reaction.touch_index, Some(2));
        let candle = reaction.touch_candle.unwrap();
        assert_eq!(candle.open, 115.0);
        assert_eq!(candle.close, 108.0);
        assert_eq!(candle.volume, 2.0);
    }

    #[test]
    fn test_engulf_crosses_both_edges() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (115.0, 116.0, 94.0, 95.0), // opens above, closes below
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let reaction = classify(&zone, &series, &[], &[]);
        assert_eq!(reaction.touch_type, Some(TouchType::Engulf));
    }

    #[test]
    fn test_body_close_above_is_a_rejection() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (115.0, 116.0, 108.0, 112.0), // wick in, body stays above
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let reaction = classify(&zone, &series, &[], &[]);
        assert_eq!(reaction.touch_type, Some(TouchType::BodyCloseAbove));
    }

    #[test]
    fn test_body_close_below_from_underneath() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (95.0, 105.0, 94.0, 97.0), // approaches from below, rejected
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let reaction = classify(&zone, &series, &[], &[]);
        assert_eq!(reaction.touch_type, Some(TouchType::BodyCloseBelow));
    }

    #[test]
    fn test_bar_opening_inside_the_band_is_not_a_touch() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 120.0, 90.0, 105.0), // opens inside: ignored
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let reaction = classify(&zone, &series, &[], &[]);
        assert_eq!(reaction.touch_type, None);
        assert_eq!(reaction.touch_index, None);
    }

    #[test]
    fn test_wick_touch_when_the_open_sits_inside_the_band() {
        // `classify` filters inside-open bars out before classification, so
        // this geometry only shows up through direct calls
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        assert_eq!(classify_touch(&zone, 105.0, 112.0), TouchType::WickTouch);
        assert_eq!(classify_touch(&zone, 105.0, 95.0), TouchType::WickTouch);
    }

    #[test]
    fn test_never_touched_leaves_reaction_empty() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (112.0, 113.0, 111.0, 112.0),
            (114.0, 115.0, 113.0, 114.0),
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let reaction = classify(&zone, &series, &[], &[]);
        assert_eq!(reaction, Reaction::default());
    }

    #[test]
    fn test_target_wick_straddle_after_touch() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (115.0, 116.0, 105.0, 108.0), // touch at bar 1
            (108.0, 109.0, 107.0, 108.0),
            (107.0, 108.0, 94.0, 95.5), // straddles [95, 97]
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let batch = vec![
            zone.clone(),
            zone_at(ZoneKind::BuySideLiquidity, 95.0, 97.0, 0),
        ];
        let reaction = classify(&zone, &series, &batch, &[1]);

        let target = reaction.target.expect("bar 3 traverses the pool");
        assert_eq!(target.kind, ZoneKind::BuySideLiquidity);
        assert_eq!(target.crossed_at_index, 3);
        assert_eq!(target.price_low, 95.0);
        assert_eq!(target.price_high, 97.0);
    }

    #[test]
    fn test_target_search_includes_the_touch_bar() {
        // The touching bar itself already sweeps through the candidate
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (115.0, 116.0, 94.0, 95.0), // engulf touch and body past [96,98]
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let batch = vec![zone.clone(), zone_at(ZoneKind::BullishOb, 96.0, 98.0, 0)];
        let reaction = classify(&zone, &series, &batch, &[1]);

        assert_eq!(reaction.touch_index, Some(1));
        assert_eq!(reaction.target.map(|t| t.crossed_at_index), Some(1));
    }

    #[test]
    fn test_partial_entry_is_not_a_traversal() {
        let series = series_from_bars(&[
            (105.0, 106.0, 104.0, 105.0),
            (115.0, 116.0, 105.0, 108.0), // touch
            (107.0, 108.0, 96.0, 96.5),   // enters [95, 97] but low stops at 96
        ]);
        let zone = zone_at(ZoneKind::BullishFvg, 100.0, 110.0, 0);
        let batch = vec![
            zone.clone(),
            zone_at(ZoneKind::BuySideLiquidity, 95.0, 97.0, 0),
        ];
        let reaction = classify(&zone, &series, &batch, &[1]);
        assert_eq!(reaction.target, None);
    }
}
