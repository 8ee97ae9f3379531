//! Fair-value gaps and order blocks.
//!
//! Both detectors walk the series once, gate each formation on a per-symbol
//! price threshold, and then scan forward for the first candle body that
//! crosses back through the zone boundary (the touch). Zones keep the
//! indicator snapshot and derived stats of their formation bar.

use crate::analysis::snapshot::{derived_stats_at, snapshot_at};
use crate::models::timeseries::CandleSeries;
use crate::models::zone::{Touch, Zone, ZoneKind, ZonePayload};

// Bars of history required before a formation bar. Keeps the stat windows
// behind every zone fully populated.
const CONTEXT_BARS: usize = 5;

/// All structure zones of one series: FVGs first, then order blocks.
pub fn detect(series: &CandleSeries, threshold: f64) -> Vec<Zone> {
    let mut zones = detect_fvgs(series, threshold);
    zones.extend(detect_order_blocks(series, threshold));
    zones
}

/// Three-candle fair-value gaps. A bullish gap opens when the low of the
/// following bar clears the high of the preceding bar by at least
/// `threshold`; the zone spans that gap. Bearish is the mirror image.
pub fn detect_fvgs(series: &CandleSeries, threshold: f64) -> Vec<Zone> {
    let len = series.len();
    let mut zones = Vec::new();

    for i in CONTEXT_BARS..len.saturating_sub(1) {
        let prev_high = series.high_prices[i - 1];
        let prev_low = series.low_prices[i - 1];
        let next_high = series.high_prices[i + 1];
        let next_low = series.low_prices[i + 1];

        if next_low - prev_high >= threshold {
            let mut zone = structure_zone(series, ZoneKind::BullishFvg, i, prev_high, next_low);
            zone.touch = first_cross_below(series, i + 2, zone.price_low);
            zones.push(zone);
        } else if prev_low - next_high >= threshold {
            let mut zone = structure_zone(series, ZoneKind::BearishFvg, i, next_high, prev_low);
            zone.touch = first_cross_above(series, i + 2, zone.price_high);
            zones.push(zone);
        }
    }
    zones
}

/// Order blocks: a strong candle against the move, confirmed by two bars of
/// continuation. A bullish order block is a bearish bar whose high the next
/// bar closes above, with the bar after that closing higher still; bearish
/// is the mirror. The zone spans the formation bar's full range.
pub fn detect_order_blocks(series: &CandleSeries, threshold: f64) -> Vec<Zone> {
    let len = series.len();
    let mut zones = Vec::new();

    for i in CONTEXT_BARS..len.saturating_sub(2) {
        if series.high_prices[i] - series.low_prices[i] < threshold {
            continue;
        }
        let open = series.open_prices[i];
        let close = series.close_prices[i];

        let bullish_ob = close < open
            && series.close_prices[i - 1] > series.low_prices[i]
            && series.close_prices[i + 1] > series.high_prices[i]
            && series.close_prices[i + 2] > series.close_prices[i + 1];

        let bearish_ob = close > open
            && series.close_prices[i - 1] < series.high_prices[i]
            && series.close_prices[i + 1] < series.low_prices[i]
            && series.close_prices[i + 2] < series.close_prices[i + 1];

        if bullish_ob {
            let mut zone = structure_zone(
                series,
                ZoneKind::BullishOb,
                i,
                series.low_prices[i],
                series.high_prices[i],
            );
            zone.touch = first_cross_below(series, i + 3, zone.price_low);
            zones.push(zone);
        } else if bearish_ob {
            let mut zone = structure_zone(
                series,
                ZoneKind::BearishOb,
                i,
                series.low_prices[i],
                series.high_prices[i],
            );
            zone.touch = first_cross_above(series, i + 3, zone.price_high);
            zones.push(zone);
        }
    }
    zones
}

fn structure_zone(
    series: &CandleSeries,
    kind: ZoneKind,
    i: usize,
    price_low: f64,
    price_high: f64,
) -> Zone {
    let candle = series.get_candle(i);
    Zone::new(
        kind,
        &series.symbol,
        series.timeframe,
        price_low,
        price_high,
        i,
        series.timestamp_ms(i),
        snapshot_at(series, i),
        derived_stats_at(series, i),
        ZonePayload::Structure {
            body_size: candle.body_size(),
            wick_ratio: candle.wick_ratio(),
            zone_width: price_high - price_low,
        },
    )
}

// First bar from `start` whose body opens above `boundary` and closes below it.
fn first_cross_below(series: &CandleSeries, start: usize, boundary: f64) -> Option<Touch> {
    (start..series.len()).find_map(|j| {
        (series.open_prices[j] > boundary && series.close_prices[j] < boundary).then(|| Touch {
            index: j,
            time_ms: series.timestamp_ms(j),
        })
    })
}

// First bar from `start` whose body opens below `boundary` and closes above it.
fn first_cross_above(series: &CandleSeries, start: usize, boundary: f64) -> Option<Touch> {
    (start..series.len()).find_map(|j| {
        (series.open_prices[j] < boundary && series.close_prices[j] > boundary).then(|| Touch {
            index: j,
            time_ms: series.timestamp_ms(j),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timeframe::Timeframe;
    use crate::models::timeseries::IndicatorColumns;

    fn series_from_bars(bars: &[(f64, f64, f64, f64)]) -> CandleSeries {
        CandleSeries {
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::Min15,
            first_open_time_ms: 1_700_000_000_000,
            open_prices: bars.iter().map(|b| b.0).collect(),
            high_prices: bars.iter().map(|b| b.1).collect(),
            low_prices: bars.iter().map(|b| b.2).collect(),
            close_prices: bars.iter().map(|b| b.3).collect(),
            volumes: vec![1.0; bars.len()],
            trade_counts: vec![1; bars.len()],
            indicators: IndicatorColumns::default(),
        }
    }

    // (open, high, low, close)
    fn bullish_fvg_bars() -> Vec<(f64, f64, f64, f64)> {
        vec![
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 102.0, 99.0, 101.0),  // preceding bar, high 102
            (101.0, 104.0, 100.0, 103.0), // formation bar
            (105.5, 107.0, 105.0, 106.0), // following bar, low 105
            (106.0, 108.0, 105.5, 107.0),
        ]
    }

    #[test]
    fn test_bullish_fvg_bounds_and_width() {
        let series = series_from_bars(&bullish_fvg_bars());
        let zones = detect(&series, 2.0);

        assert_eq!(zones.len(), 1, "expected exactly one zone, got {zones:?}");
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::BullishFvg);
        assert_eq!(zone.price_low, 102.0);
        assert_eq!(zone.price_high, 105.0);
        assert_eq!(zone.created_index, 5);
        assert_eq!(zone.touch, None);

        match zone.payload {
            ZonePayload::Structure {
                body_size,
                wick_ratio,
                zone_width,
            } => {
                assert!((zone_width - 3.0).abs() < 1e-12);
                assert!((body_size - 2.0).abs() < 1e-12);
                assert!((wick_ratio - 0.5).abs() < 1e-12);
            }
            _ => panic!("structure zone must carry a Structure payload"),
        }
    }

    #[test]
    fn test_bullish_fvg_touch_is_first_body_cross() {
        let mut bars = bullish_fvg_bars();
        // Opens above 102 and closes below it: fills the gap
        bars.push((103.0, 103.5, 100.5, 101.0));
        let series = series_from_bars(&bars);
        let zones = detect_fvgs(&series, 2.0);

        assert_eq!(zones.len(), 1);
        let touch = zones[0].touch.expect("gap should be touched by bar 8");
        assert_eq!(touch.index, 8);
        assert_eq!(touch.time_ms, series.timestamp_ms(8));
        assert!(touch.time_ms > zones[0].created_time_ms);
    }

    #[test]
    fn test_bearish_fvg() {
        let bars = vec![
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 99.5), // preceding bar, low 99
            (99.0, 99.5, 96.0, 96.5),   // formation bar
            (96.0, 96.5, 95.0, 95.5),   // following bar, high 96.5
            (96.0, 100.5, 95.5, 100.0), // opens below 99, closes above: touch
        ];
        let series = series_from_bars(&bars);
        let zones = detect_fvgs(&series, 2.0);

        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::BearishFvg);
        assert_eq!(zone.price_low, 96.5);
        assert_eq!(zone.price_high, 99.0);
        assert_eq!(zone.touch.map(|t| t.index), Some(7));
    }

    #[test]
    fn test_bullish_order_block() {
        let bars = vec![
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),  // close[4] = 105 > low[5]
            (110.0, 112.0, 99.0, 100.0),   // strong bearish bar
            (108.0, 114.0, 107.0, 113.0),  // closes above high[5]
            (113.0, 115.5, 112.5, 114.5),  // continuation
        ];
        let series = series_from_bars(&bars);
        let zones = detect_order_blocks(&series, 2.0);

        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::BullishOb);
        assert_eq!(zone.price_low, 99.0);
        assert_eq!(zone.price_high, 112.0);
        assert_eq!(zone.created_index, 5);
        assert_eq!(zone.touch, None, "no bar crosses back down yet");
    }

    #[test]
    fn test_bullish_order_block_touch() {
        let mut bars = vec![
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (105.0, 106.0, 104.0, 105.0),
            (110.0, 112.0, 99.0, 100.0),
            (108.0, 114.0, 107.0, 113.0),
            (113.0, 115.5, 112.5, 114.5),
        ];
        // Body crosses down through the block's low boundary (99)
        bars.push((100.0, 101.0, 97.5, 98.0));
        let series = series_from_bars(&bars);
        let zones = detect_order_blocks(&series, 2.0);

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].touch.map(|t| t.index), Some(8));
    }

    #[test]
    fn test_bearish_order_block() {
        let bars = vec![
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0),
            (100.0, 101.0, 99.0, 100.0), // close[4] = 100 < high[5]
            (98.0, 109.0, 97.5, 108.0),  // strong bullish bar
            (99.0, 100.0, 95.0, 96.0),   // closes below low[5]
            (96.0, 97.0, 94.0, 95.0),    // continuation lower
        ];
        let series = series_from_bars(&bars);
        let zones = detect_order_blocks(&series, 2.0);

        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::BearishOb);
        assert_eq!(zone.price_low, 97.5);
        assert_eq!(zone.price_high, 109.0);
    }

    #[test]
    fn test_threshold_gates_formation() {
        // Same shape as the bullish FVG fixture but the gap is only 3 wide;
        // a 5.0 threshold must reject it
        let series = series_from_bars(&bullish_fvg_bars());
        assert!(detect(&series, 5.0).is_empty());
    }

    #[test]
    fn test_zone_invariants_hold() {
        let mut bars = bullish_fvg_bars();
        bars.push((103.0, 103.5, 100.5, 101.0));
        let series = series_from_bars(&bars);

        for zone in detect(&series, 2.0) {
            assert!(zone.price_high >= zone.price_low);
            if let Some(touch) = zone.touch {
                assert!(touch.time_ms > zone.created_time_ms);
            }
        }
    }
}
