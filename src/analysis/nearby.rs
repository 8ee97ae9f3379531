//! Nearest available zone strictly above and below a base zone.

use crate::models::zone::{ConfluenceSet, NearbyAnnotation, NearbySummary, Zone};

/// Searches the base zone's available candidates (core and liquidity alike)
/// for the closest zone entirely above and entirely below its band. Matches
/// closer than `min_distance` are ignored. When nothing qualifies above,
/// the symbol's ATH zone is used as the ceiling, with no distance floor;
/// there is no equivalent fallback below.
pub fn find_nearby(
    batch: &[Zone],
    base_idx: usize,
    confluence: &ConfluenceSet,
    min_distance: f64,
    ath: Option<&Zone>,
) -> NearbyAnnotation {
    let base = &batch[base_idx];
    let candidates: Vec<&Zone> = confluence
        .available_core
        .iter()
        .chain(confluence.available_liquidity.iter())
        .map(|&i| &batch[i])
        .collect();

    let mut nearby = NearbyAnnotation::default();

    let above = candidates
        .iter()
        .filter(|z| z.price_low > base.price_high)
        .map(|z| (*z, z.price_low - base.price_high))
        .filter(|(_, d)| *d >= min_distance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    match above {
        Some((zone, distance)) => {
            nearby.distance_above = distance;
            nearby.above = Some(NearbySummary::from(zone));
        }
        None => {
            // Fall back to the all-time-high ceiling when it actually sits
            // above the base zone
            if let Some(ath_zone) = ath {
                if ath_zone.price_low > base.price_high {
                    nearby.distance_above = ath_zone.price_low - base.price_high;
                    nearby.above = Some(NearbySummary::from(ath_zone));
                }
            }
        }
    }

    let below = candidates
        .iter()
        .filter(|z| z.price_high < base.price_low)
        .map(|z| (*z, base.price_low - z.price_high))
        .filter(|(_, d)| *d >= min_distance)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    if let Some((zone, distance)) = below {
        nearby.distance_below = distance;
        nearby.below = Some(NearbySummary::from(zone));
    }

    nearby
}
