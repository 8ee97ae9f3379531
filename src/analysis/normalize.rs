//! Index normalization for mixed-timeframe zone batches.
//!
//! Zones come out of the detectors with bar indices counted in their own
//! timeframe. Before confluence and nearby search, every index field is
//! rescaled into units of the smallest timeframe present in the batch.
//!
//! Run exactly once per batch. Because a zone keeps its timeframe after
//! rescaling, a second pass would multiply the indices again; the call is
//! only a no-op when every zone already sits at the smallest timeframe.

use crate::domain::timeframe::Timeframe;
use crate::errors::DetectError;
use crate::models::zone::{Zone, ZonePayload};

/// Rescales `created_index`, the touch index, and liquidity member indices
/// in place. Returns the smallest timeframe that was used as the unit, so
/// callers can log and verify the choice.
pub fn normalize_batch(batch: &mut [Zone]) -> Result<Timeframe, DetectError> {
    let smallest = batch
        .iter()
        .map(|z| z.timeframe)
        .min()
        .ok_or(DetectError::EmptyBatch)?;

    for zone in batch.iter_mut() {
        let factor = Timeframe::multiplier(smallest, zone.timeframe)?;
        if factor == 1 {
            continue;
        }
        zone.created_index *= factor;
        if let Some(touch) = zone.touch.as_mut() {
            touch.index *= factor;
        }
        if let ZonePayload::Liquidity { member_indices, .. } = &mut zone.payload {
            for idx in member_indices.iter_mut() {
                *idx *= factor;
            }
        }
    }
    Ok(smallest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::zone::{DerivedStats, IndicatorSnapshot, Touch, ZoneKind};

    fn zone(timeframe: Timeframe, created_index: usize) -> Zone {
        Zone::new(
            ZoneKind::BullishFvg,
            "BTCUSDT",
            timeframe,
            100.0,
            110.0,
            created_index,
            created_index as i64 * timeframe.interval_ms(),
            IndicatorSnapshot::default(),
            DerivedStats::default(),
            ZonePayload::Structure {
                body_size: 1.0,
                wick_ratio: 0.0,
                zone_width: 10.0,
            },
        )
    }

    #[test]
    fn test_mixed_batch_rescales_to_smallest() {
        let mut hour_zone = zone(Timeframe::Hour1, 10);
        hour_zone.touch = Some(Touch {
            index: 12,
            time_ms: 0,
        });
        let mut batch = vec![zone(Timeframe::Min15, 40), hour_zone, zone(Timeframe::Hour4, 3)];

        let smallest = normalize_batch(&mut batch).unwrap();
        assert_eq!(smallest, Timeframe::Min15);

        assert_eq!(batch[0].created_index, 40, "smallest stays untouched");
        assert_eq!(batch[1].created_index, 40, "1h index times 4");
        assert_eq!(batch[1].touch.unwrap().index, 48);
        assert_eq!(batch[2].created_index, 48, "4h index times 16");
    }

    #[test]
    fn test_member_indices_rescale() {
        let mut pool = zone(Timeframe::Hour1, 9);
        pool.payload = ZonePayload::Liquidity {
            member_count: 2,
            level: 105.0,
            level_deviation: 0.0,
            avg_volume_around_zone: 1.0,
            duration_between_first_last_touch_ms: 0,
            member_indices: vec![4, 9],
        };
        let mut batch = vec![zone(Timeframe::Min15, 0), pool];

        normalize_batch(&mut batch).unwrap();
        match &batch[1].payload {
            ZonePayload::Liquidity { member_indices, .. } => {
                assert_eq!(member_indices, &vec![16, 36]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_uniform_batch_is_idempotent() {
        let mut batch = vec![zone(Timeframe::Hour1, 7), zone(Timeframe::Hour1, 11)];
        let smallest = normalize_batch(&mut batch).unwrap();
        assert_eq!(smallest, Timeframe::Hour1);
        assert_eq!(batch[0].created_index, 7);

        // Everything already at the smallest: a second pass changes nothing
        normalize_batch(&mut batch).unwrap();
        assert_eq!(batch[0].created_index, 7);
        assert_eq!(batch[1].created_index, 11);
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let mut batch: Vec<Zone> = Vec::new();
        assert_eq!(normalize_batch(&mut batch), Err(DetectError::EmptyBatch));
    }

    #[test]
    fn test_non_divisible_pair_fails() {
        let mut batch = vec![zone(Timeframe::Min3, 5), zone(Timeframe::Min5, 2)];
        assert_eq!(
            normalize_batch(&mut batch),
            Err(DetectError::UnsupportedPair {
                from: Timeframe::Min3,
                to: Timeframe::Min5,
            })
        );
    }
}
