//! Per-symbol orchestration: detection on every timeframe, index
//! normalization, cross-timeframe merging, and per-base-zone annotation.
//!
//! `run_symbol` is a pure function of its inputs; `run_collection` fans
//! symbols out over a thread pool and funnels ATH state through the store
//! sequentially on either side of the parallel section.

use std::collections::BTreeMap;

use itertools::Itertools;
use rayon::prelude::*;

use crate::analysis::ath::{self, AthStore};
use crate::analysis::merge::CombinedZone;
use crate::analysis::{
    confluence, liquidity, merge, nearby, normalize, reaction, structure_zones, swings,
};
use crate::config::{self, DETECTION, SymbolThresholds, ThresholdBook};
use crate::data::CandleCollection;
use crate::domain::Timeframe;
use crate::errors::DetectError;
use crate::models::timeseries::CandleSeries;
use crate::models::zone::{AnnotatedZone, Zone};

/// Complete detection output for one symbol.
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub symbol: String,
    /// Timeframe all zone indices were normalized to.
    pub smallest: Timeframe,
    /// All-time-high marker, updated against the previously stored one.
    pub ath: Zone,
    /// Every detected zone in batch order. Base zones carry annotations,
    /// higher-timeframe zones are bare.
    pub zones: Vec<AnnotatedZone>,
    pub combined: Vec<CombinedZone>,
}

/// Output of a whole-collection run. Per-symbol failures are collected
/// here instead of propagated, so one bad symbol cannot sink the batch.
#[derive(Debug, Default)]
pub struct CollectionReport {
    pub reports: Vec<SymbolReport>,
    pub failures: Vec<(String, DetectError)>,
}

/// Runs the full detection pass for one symbol across all its timeframes.
///
/// `series_set` holds one series per timeframe, any order. The smallest
/// timeframe supplies the base zones and the ATH candidate; zones from the
/// rest serve as confluence/nearby/target candidates after their indices
/// are rescaled onto the smallest timeframe's grid.
pub fn run_symbol(
    series_set: &[&CandleSeries],
    thresholds: &SymbolThresholds,
    stored_ath: Option<Zone>,
) -> Result<SymbolReport, DetectError> {
    if series_set.is_empty() {
        return Err(DetectError::EmptyBatch);
    }
    for series in series_set {
        series.validate()?;
    }

    let mut ordered: Vec<&CandleSeries> = series_set.to_vec();
    ordered.sort_by_key(|s| s.timeframe);
    let finest = ordered[0];
    let symbol = finest.symbol.clone();
    debug_assert!(
        ordered.iter().all(|s| s.symbol == symbol),
        "run_symbol expects series of a single symbol, got {:?}",
        ordered.iter().map(|s| &s.symbol).collect::<Vec<_>>()
    );

    let mut batch: Vec<Zone> = Vec::new();
    for series in &ordered {
        warn_on_malformed_bars(series);

        let swing_points = swings::detect(series, DETECTION.swings.window);
        let labeled = swings::label_structure(&swing_points);

        let structures = structure_zones::detect(series, thresholds.zone_threshold);
        let pools = liquidity::detect_pools(series, &labeled, DETECTION.liquidity.range_pct);

        if config::PRINT_SCAN_SUMMARY {
            log::info!(
                "{} {}: {} swings, {} structure zones, {} liquidity pools",
                symbol,
                series.timeframe,
                labeled.len(),
                structures.len(),
                pools.len()
            );
        }

        batch.extend(structures);
        batch.extend(pools);
    }

    let mut ath = ath::update(ath::ath_zone_from_series(finest)?, stored_ath);

    if batch.is_empty() {
        // Nothing detected on any timeframe: a valid, empty result
        return Ok(SymbolReport {
            symbol,
            smallest: finest.timeframe,
            ath,
            zones: Vec::new(),
            combined: Vec::new(),
        });
    }

    let smallest = normalize::normalize_batch(&mut batch)?;

    // The ATH bar lives on the finest series. When that series produced no
    // zones the batch grid is coarser, so the ATH index moves onto it too.
    if ath.timeframe != smallest {
        let factor = Timeframe::multiplier(ath.timeframe, smallest)?;
        ath.created_index /= factor;
    }

    let combined = merge::merge_multi_timeframe(&batch, DETECTION.merge.overlap_threshold);

    // The base timeframe is the smallest one that produced zones, which can
    // sit above the finest series when that series stayed quiet.
    let base_series = ordered
        .iter()
        .find(|s| s.timeframe == smallest)
        .copied()
        .unwrap_or(finest);

    let bases = confluence::base_indices(&batch, smallest);
    let mut zones = Vec::with_capacity(batch.len());
    for (i, zone) in batch.iter().enumerate() {
        if bases.binary_search(&i).is_err() {
            zones.push(AnnotatedZone::bare(zone.clone()));
            continue;
        }

        let conf = confluence::compute_for_base(&batch, i);
        let near = nearby::find_nearby(&batch, i, &conf, thresholds.min_zone_distance, Some(&ath));

        // Target candidates keep batch order: both available sets are
        // ascending, so a plain sort restores the interleaving.
        let candidates: Vec<usize> = conf
            .available_core
            .iter()
            .chain(conf.available_liquidity.iter())
            .copied()
            .sorted_unstable()
            .collect();
        let react = reaction::classify(zone, base_series, &batch, &candidates);

        if config::PRINT_CONFLUENCE_FOR_SYMBOL == symbol {
            log::info!(
                "{} base {} [{:.2}, {:.2}]: {} core hits, {} liquidity hits, {} available",
                symbol,
                zone.kind,
                zone.price_low,
                zone.price_high,
                conf.core_confluence.len(),
                conf.liquidity_confluence.len(),
                candidates.len()
            );
        }

        zones.push(AnnotatedZone {
            zone: zone.clone(),
            confluence: Some(conf),
            nearby: Some(near),
            reaction: Some(react),
        });
    }

    Ok(SymbolReport {
        symbol,
        smallest,
        ath,
        zones,
        combined,
    })
}

/// Groups the collection by symbol, runs every symbol in parallel, then
/// writes updated ATH zones back into the store.
pub fn run_collection(
    collection: &CandleCollection,
    book: &ThresholdBook,
    ath_store: &mut dyn AthStore,
) -> CollectionReport {
    let mut by_symbol: BTreeMap<String, Vec<&CandleSeries>> = BTreeMap::new();
    for series in &collection.series {
        by_symbol
            .entry(series.symbol.clone())
            .or_default()
            .push(series);
    }

    // Store reads happen before the parallel section, writes after it, so
    // the workers never share the store.
    let jobs: Vec<(String, Vec<&CandleSeries>, SymbolThresholds, Option<Zone>)> = by_symbol
        .into_iter()
        .map(|(symbol, set)| {
            let thresholds = book.for_symbol(&symbol);
            let stored = ath_store.get(&symbol);
            (symbol, set, thresholds, stored)
        })
        .collect();

    let results: Vec<(String, Result<SymbolReport, DetectError>)> = jobs
        .par_iter()
        .map(|(symbol, set, thresholds, stored)| {
            (symbol.clone(), run_symbol(set, thresholds, stored.clone()))
        })
        .collect();

    let mut report = CollectionReport::default();
    for (symbol, result) in results {
        match result {
            Ok(symbol_report) => {
                ath_store.set(&symbol, symbol_report.ath.clone());
                report.reports.push(symbol_report);
            }
            Err(e) => {
                log::error!("Detection failed for {}: {}", symbol, e);
                report.failures.push((symbol, e));
            }
        }
    }
    report
}

// Detectors skip malformed bars one by one; the pipeline makes the problem
// visible once per series.
fn warn_on_malformed_bars(series: &CandleSeries) {
    let bad = (0..series.len())
        .filter(|&i| {
            !(series.open_prices[i].is_finite()
                && series.high_prices[i].is_finite()
                && series.low_prices[i].is_finite()
                && series.close_prices[i].is_finite()
                && series.volumes[i].is_finite())
        })
        .count();
    if bad > 0 {
        log::warn!(
            "{} {}: {} bar(s) with non-finite fields, skipped by detectors",
            series.symbol,
            series.timeframe,
            bad
        );
    }
}
