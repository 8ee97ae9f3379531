//! Greedy transitive merging of overlapping zones across timeframes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::timeframe::Timeframe;
use crate::models::zone::{Zone, ZoneKind};
use crate::utils::maths_utils::bands_overlap;

/// A cluster of zones whose expanded bands chain together.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CombinedZone {
    // Union of the raw member bands
    pub price_low: f64,
    pub price_high: f64,
    pub kinds: BTreeSet<ZoneKind>,
    pub timeframes: BTreeSet<Timeframe>,
    pub sources: Vec<Zone>,
}

/// Clusters zones whose bands, each widened by `threshold` (fractional),
/// intersect. Merging is transitive: after every absorption the accumulator
/// grows to the union of raw bounds and the remaining zones are rescanned,
/// so chains of pairwise-overlapping zones end up in one cluster. A
/// used-bitmap keeps each zone in exactly one cluster.
pub fn merge_multi_timeframe(zones: &[Zone], threshold: f64) -> Vec<CombinedZone> {
    let mut used = vec![false; zones.len()];
    let mut combined = Vec::new();

    for i in 0..zones.len() {
        if used[i] {
            continue;
        }
        used[i] = true;

        let mut acc_low = zones[i].price_low;
        let mut acc_high = zones[i].price_high;
        let mut members = vec![i];

        loop {
            let mut absorbed_any = false;
            for j in 0..zones.len() {
                if used[j] {
                    continue;
                }
                let grown = bands_overlap(
                    acc_low * (1.0 - threshold),
                    acc_high * (1.0 + threshold),
                    zones[j].price_low * (1.0 - threshold),
                    zones[j].price_high * (1.0 + threshold),
                );
                if grown {
                    used[j] = true;
                    members.push(j);
                    acc_low = acc_low.min(zones[j].price_low);
                    acc_high = acc_high.max(zones[j].price_high);
                    absorbed_any = true;
                    if crate::config::PRINT_MERGE_STEPS {
                        log::info!(
                            "cluster at [{acc_low:.2}, {acc_high:.2}] absorbed {} {} zone",
                            zones[j].timeframe,
                            zones[j].kind
                        );
                    }
                }
            }
            if !absorbed_any {
                break;
            }
        }

        combined.push(CombinedZone {
            price_low: acc_low,
            price_high: acc_high,
            kinds: members.iter().map(|&m| zones[m].kind).collect(),
            timeframes: members.iter().map(|&m| zones[m].timeframe).collect(),
            sources: members.iter().map(|&m| zones[m].clone()).collect(),
        });
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::zone::{DerivedStats, IndicatorSnapshot, ZonePayload};

    fn zone(kind: ZoneKind, timeframe: Timeframe, low: f64, high: f64) -> Zone {
        Zone::new(
            kind,
            "BTCUSDT",
            timeframe,
            low,
            high,
            10,
            0,
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
    fn test_disjoint_zones_stay_separate() {
        let zones = vec![
            zone(ZoneKind::BullishFvg, Timeframe::Min15, 100.0, 101.0),
            zone(ZoneKind::BearishFvg, Timeframe::Min15, 200.0, 201.0),
        ];
        let combined = merge_multi_timeframe(&zones, 0.001);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].sources.len(), 1);
    }

    #[test]
    fn test_transitive_chain_collapses_to_one() {
        // a overlaps b, b overlaps c, but a and c are disjoint
        let zones = vec![
            zone(ZoneKind::BullishFvg, Timeframe::Min15, 100.0, 105.0),
            zone(ZoneKind::BullishOb, Timeframe::Hour1, 104.0, 112.0),
            zone(ZoneKind::SellSideLiquidity, Timeframe::Hour4, 111.0, 118.0),
        ];
        let combined = merge_multi_timeframe(&zones, 0.0);

        assert_eq!(combined.len(), 1);
        let cluster = &combined[0];
        assert_eq!(cluster.price_low, 100.0);
        assert_eq!(cluster.price_high, 118.0);
        assert_eq!(cluster.sources.len(), 3);
        assert_eq!(cluster.kinds.len(), 3);
        assert_eq!(
            cluster.timeframes,
            BTreeSet::from([Timeframe::Min15, Timeframe::Hour1, Timeframe::Hour4])
        );
    }

    #[test]
    fn test_chain_through_later_absorption() {
        // c only becomes reachable after b has widened the accumulator,
        // which requires the rescan-until-fixpoint behavior
        let zones = vec![
            zone(ZoneKind::BullishFvg, Timeframe::Min15, 100.0, 102.0),
            zone(ZoneKind::SellSideLiquidity, Timeframe::Hour4, 110.0, 120.0),
            zone(ZoneKind::BullishOb, Timeframe::Hour1, 101.0, 111.0),
        ];
        let combined = merge_multi_timeframe(&zones, 0.0);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].price_high, 120.0);
    }

    #[test]
    fn test_threshold_bridges_near_misses() {
        // 1% expansion closes the gap between [100,110] and [111,115]:
        // 110 * 1.01 = 111.1 >= 111 * 0.99
        let zones = vec![
            zone(ZoneKind::BullishFvg, Timeframe::Min15, 100.0, 110.0),
            zone(ZoneKind::BearishFvg, Timeframe::Hour1, 111.0, 115.0),
        ];
        assert_eq!(merge_multi_timeframe(&zones, 0.01).len(), 1);
        assert_eq!(merge_multi_timeframe(&zones, 0.0).len(), 2);
    }

    #[test]
    fn test_every_zone_lands_in_exactly_one_cluster() {
        let zones = vec![
            zone(ZoneKind::BullishFvg, Timeframe::Min15, 100.0, 105.0),
            zone(ZoneKind::BearishOb, Timeframe::Hour1, 104.0, 108.0),
            zone(ZoneKind::BuySideLiquidity, Timeframe::Min15, 300.0, 305.0),
            zone(ZoneKind::Ath, Timeframe::Min15, 304.0, 306.0),
        ];
        let combined = merge_multi_timeframe(&zones, 0.001);
        let total: usize = combined.iter().map(|c| c.sources.len()).sum();
        assert_eq!(total, zones.len());
        assert_eq!(combined.len(), 2);
    }
}
