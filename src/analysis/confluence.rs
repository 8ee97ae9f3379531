//! Cross-timeframe confluence for base zones.
//!
//! Works on a normalized batch. Base zones are the ones living on the
//! smallest timeframe present; every other zone is a candidate. A candidate
//! is available to a base zone when it is either still untouched, or was
//! touched only after the base zone came into existence. Confluence then
//! counts the available candidates whose price bands overlap the base.

use crate::domain::timeframe::Timeframe;
use crate::models::zone::{ConfluenceHit, ConfluenceSet, Zone, ZoneKind};

/// Indices of the zones that act as base zones: everything on the smallest
/// timeframe, except the ATH marker which never anchors confluence.
pub fn base_indices(batch: &[Zone], smallest: Timeframe) -> Vec<usize> {
    batch
        .iter()
        .enumerate()
        .filter(|(_, z)| z.timeframe == smallest && z.kind != ZoneKind::Ath)
        .map(|(i, _)| i)
        .collect()
}

// Untouched candidates are always available; touched ones only count when
// the touch happened after the base zone was created.
fn is_available(candidate: &Zone, base: &Zone) -> bool {
    match candidate.touch {
        None => true,
        Some(touch) => touch.time_ms > base.created_time_ms,
    }
}

/// Builds the confluence summary for the base zone at `base_idx`. The
/// available index sets cover every candidate that passed the availability
/// test (overlap or not); the confluence vectors only the overlapping ones.
pub fn compute_for_base(batch: &[Zone], base_idx: usize) -> ConfluenceSet {
    let base = &batch[base_idx];
    let mut set = ConfluenceSet::default();

    for (i, candidate) in batch.iter().enumerate() {
        if i == base_idx || !is_available(candidate, base) {
            continue;
        }

        let hit = ConfluenceHit {
            kind: candidate.kind,
            timeframe: candidate.timeframe,
        };

        if candidate.kind.is_core() {
            set.available_core.push(i);
            if candidate.overlaps(base) {
                set.core_confluence.push(hit);
            }
        } else if candidate.kind.is_liquidity() {
            set.available_liquidity.push(i);
            if candidate.overlaps(base) {
                set.liquidity_confluence.push(hit);
            }
        }
        // ATH zones belong to neither family and are skipped entirely
    }
    set
}
