//! Liquidity pools: clusters of swing highs (sell-side) or swing lows
//! (buy-side) resting at nearly the same price, plus the sweep that takes
//! them out.

use statrs::statistics::Statistics;

use crate::analysis::snapshot::{derived_stats_at, mean_snapshot};
use crate::analysis::swings::{LabeledSwing, SwingKind};
use crate::models::timeseries::CandleSeries;
use crate::models::zone::{Touch, Zone, ZoneKind, ZonePayload};
use crate::utils::maths_utils::{get_max, get_min};

// A lone swing is not a pool.
const MIN_POOL_MEMBERS: usize = 2;

/// Clusters the given swings into pools. The clustering tolerance is
/// `range_pct` of the full price range of the series, so it scales with the
/// instrument. Sell-side pools come first in the output, then buy-side.
pub fn detect_pools(series: &CandleSeries, swings: &[LabeledSwing], range_pct: f64) -> Vec<Zone> {
    if series.is_empty() || swings.is_empty() {
        return Vec::new();
    }

    let pip_range =
        (get_max(&series.high_prices) - get_min(&series.low_prices)) * range_pct;

    let highs: Vec<&LabeledSwing> = swings
        .iter()
        .filter(|s| s.swing.kind == SwingKind::High)
        .collect();
    let lows: Vec<&LabeledSwing> = swings
        .iter()
        .filter(|s| s.swing.kind == SwingKind::Low)
        .collect();

    let mut pools = build_pools(series, &highs, pip_range, ZoneKind::SellSideLiquidity);
    pools.extend(build_pools(series, &lows, pip_range, ZoneKind::BuySideLiquidity));
    pools
}

fn build_pools(
    series: &CandleSeries,
    candidates: &[&LabeledSwing],
    pip_range: f64,
    kind: ZoneKind,
) -> Vec<Zone> {
    let mut used = vec![false; candidates.len()];
    let mut pools = Vec::new();

    for i in 0..candidates.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let base_price = candidates[i].swing.price;

        // Two-phase: mark members against the base price first, then build
        // the pool, so nothing is mutated while scanning.
        let mut members = vec![i];
        for j in (i + 1)..candidates.len() {
            if used[j] {
                continue;
            }
            if (candidates[j].swing.price - base_price).abs() <= pip_range {
                used[j] = true;
                members.push(j);
            }
        }

        if members.len() < MIN_POOL_MEMBERS {
            continue;
        }
        if crate::config::PRINT_POOL_MEMBERS {
            log::info!(
                "{} {} pool around {:.2}: members at bars {:?}",
                series.symbol,
                kind,
                base_price,
                members
                    .iter()
                    .map(|&m| candidates[m].swing.index)
                    .collect::<Vec<_>>()
            );
        }
        pools.push(pool_zone(series, candidates, &members, pip_range, kind));
    }
    pools
}

fn pool_zone(
    series: &CandleSeries,
    candidates: &[&LabeledSwing],
    members: &[usize],
    pip_range: f64,
    kind: ZoneKind,
) -> Zone {
    let prices: Vec<f64> = members
        .iter()
        .map(|&m| candidates[m].swing.price)
        .collect();
    let volumes: Vec<f64> = members
        .iter()
        .map(|&m| candidates[m].swing.volume)
        .collect();
    let member_indices: Vec<usize> =
        members.iter().map(|&m| candidates[m].swing.index).collect();

    let level = prices.iter().mean();
    let level_deviation = prices.iter().population_std_dev();

    let first = &candidates[members[0]].swing;
    let last = &candidates[members[members.len() - 1]].swing;

    let mut zone = Zone::new(
        kind,
        &series.symbol,
        series.timeframe,
        level - pip_range,
        level + pip_range,
        last.index,
        last.time_ms,
        mean_snapshot(series, &member_indices),
        derived_stats_at(series, last.index),
        ZonePayload::Liquidity {
            member_count: members.len(),
            level,
            level_deviation,
            avg_volume_around_zone: volumes.iter().mean(),
            duration_between_first_last_touch_ms: last.time_ms - first.time_ms,
            member_indices,
        },
    );
    zone.touch = find_sweep(series, &zone, last.index + 1);
    zone
}

// A sell-side pool is swept by the first bar whose high reaches the top of
// the band; a buy-side pool by the first low at or below the bottom.
fn find_sweep(series: &CandleSeries, zone: &Zone, start: usize) -> Option<Touch> {
    (start..series.len()).find_map(|j| {
        let swept = match zone.kind {
            ZoneKind::SellSideLiquidity => series.high_prices[j] >= zone.price_high,
            ZoneKind::BuySideLiquidity => series.low_prices[j] <= zone.price_low,
            _ => false,
        };
        swept.then(|| Touch {
            index: j,
            time_ms: series.timestamp_ms(j),
        })
    })
}
