//! Writes a deterministic synthetic candle cache for demo runs: three
//! symbols, a week of 1m bars from a seeded random walk, every coarser
//! timeframe aggregated from it, and naive indicator columns attached.

use std::path::PathBuf;

use anyhow::Result;
use strum::IntoEnumIterator;
use zone_atlas::config::DEFAULT_CACHE_PATH;
use zone_atlas::data::{CacheFile, CandleCollection};
use zone_atlas::domain::Timeframe;
use zone_atlas::models::timeseries::{CandleSeries, IndicatorColumns};
use zone_atlas::utils::maths_utils::{get_max, get_min, window_std};

const DEMO_SYMBOLS: [(&str, u64, f64); 3] = [
    ("BTCUSDT", 0xB7C0_51AF, 50_000.0),
    ("ETHUSDT", 0xE7A1_22D3, 2_500.0),
    ("SOLUSDT", 0x5017_9E41, 150.0),
];
const DEMO_DAYS: usize = 7;
// 2025-01-01 00:00 UTC, so daily bars open at midnight
const FIRST_OPEN_TIME_MS: i64 = 1_735_689_600_000;
// Columns this generator promises to attach; the regression family is not simulated.
const DEMO_INDICATOR_COLUMNS: [&str; 9] = [
    "ma_fast", "ma_slow", "ema", "rsi", "atr", "atr_mean", "bb_high", "bb_mid", "bb_low",
];

fn main() -> Result<()> {
    build_demo_cache()
}

fn build_demo_cache() -> Result<()> {
    let mut collection = CandleCollection {
        name: "Synthetic demo collection".to_string(),
        series: Vec::new(),
    };

    for (symbol, seed, start_price) in DEMO_SYMBOLS {
        let base = random_walk_1m(symbol, seed, start_price, DEMO_DAYS * 24 * 60);
        for timeframe in Timeframe::iter() {
            let mut series = if timeframe == Timeframe::Min1 {
                base.clone()
            } else {
                aggregate(&base, timeframe)?
            };
            attach_indicators(&mut series);
            series.validate()?;
            for column in DEMO_INDICATOR_COLUMNS {
                series.require_indicator(column)?;
            }
            collection.series.push(series);
        }
        println!(
            "Generated {} series for {} from seed {:#x}",
            Timeframe::iter().count(),
            symbol,
            seed
        );
    }

    let output_path = PathBuf::from(DEFAULT_CACHE_PATH);
    let cache = CacheFile::new(collection);
    cache.save_to_path(&output_path)?;

    println!(
        "✅ Demo cache written to {:?} with {} series.",
        output_path,
        cache.collection.series.len()
    );
    Ok(())
}

// Small deterministic generator so the demo cache is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn random_walk_1m(symbol: &str, seed: u64, start_price: f64, bars: usize) -> CandleSeries {
    let mut rng = Lcg(seed);
    let mut series = CandleSeries {
        symbol: symbol.to_string(),
        timeframe: Timeframe::Min1,
        first_open_time_ms: FIRST_OPEN_TIME_MS,
        open_prices: Vec::with_capacity(bars),
        high_prices: Vec::with_capacity(bars),
        low_prices: Vec::with_capacity(bars),
        close_prices: Vec::with_capacity(bars),
        volumes: Vec::with_capacity(bars),
        trade_counts: Vec::with_capacity(bars),
        indicators: IndicatorColumns::default(),
    };

    let mut price = start_price;
    for _ in 0..bars {
        let mut drift = (rng.next_f64() - 0.5) * price * 0.004;
        // Occasional impulse bar so gaps and strong candles exist to detect
        if rng.next_f64() < 0.004 {
            let direction = if rng.next_f64() < 0.5 { 1.0 } else { -1.0 };
            drift = direction * price * 0.02;
        }

        let open = price;
        let close = (price + drift).max(start_price * 0.05);
        let wick_up = rng.next_f64() * price * 0.001;
        let wick_down = rng.next_f64() * price * 0.001;

        series.open_prices.push(open);
        series.close_prices.push(close);
        series.high_prices.push(open.max(close) + wick_up);
        series.low_prices.push(open.min(close) - wick_down);
        series.volumes.push(1.0 + rng.next_f64() * 9.0);
        series.trade_counts.push(10 + (rng.next_f64() * 90.0) as u32);

        price = close;
    }
    series
}

fn aggregate(base: &CandleSeries, target: Timeframe) -> Result<CandleSeries> {
    let factor = Timeframe::multiplier(base.timeframe, target)?;
    let bars = base.len() / factor;

    let mut series = CandleSeries {
        symbol: base.symbol.clone(),
        timeframe: target,
        first_open_time_ms: base.first_open_time_ms,
        open_prices: Vec::with_capacity(bars),
        high_prices: Vec::with_capacity(bars),
        low_prices: Vec::with_capacity(bars),
        close_prices: Vec::with_capacity(bars),
        volumes: Vec::with_capacity(bars),
        trade_counts: Vec::with_capacity(bars),
        indicators: IndicatorColumns::default(),
    };

    for chunk in 0..bars {
        let start = chunk * factor;
        let end = start + factor;
        series.open_prices.push(base.open_prices[start]);
        series.close_prices.push(base.close_prices[end - 1]);
        series
            .high_prices
            .push(get_max(&base.high_prices[start..end]));
        series.low_prices.push(get_min(&base.low_prices[start..end]));
        series
            .volumes
            .push(base.volumes[start..end].iter().sum::<f64>());
        series
            .trade_counts
            .push(base.trade_counts[start..end].iter().sum::<u32>());
    }
    Ok(series)
}

/// Fills nine of the thirteen indicator columns with simple textbook
/// versions. The regression columns stay unattached, so consumers also see
/// partially populated snapshots, as they would with a live feed.
fn attach_indicators(series: &mut CandleSeries) {
    let closes = series.close_prices.clone();

    let ma_fast = sma(&closes, 5);
    let ma_slow = sma(&closes, 20);
    let ema10 = ema(&closes, 10);
    let rsi = naive_rsi(&closes, 14);
    let atr = sma(&true_ranges(series), 14);
    let atr_mean = sma(&atr, 50);

    let bb_mid = sma(&closes, 20);
    let mut bb_high = Vec::with_capacity(closes.len());
    let mut bb_low = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let sd = window_std(&closes, i, 20).unwrap_or(f64::NAN);
        bb_high.push(bb_mid[i] + 2.0 * sd);
        bb_low.push(bb_mid[i] - 2.0 * sd);
    }

    series.indicators = IndicatorColumns {
        ma_fast: Some(ma_fast),
        ma_slow: Some(ma_slow),
        ema: Some(ema10),
        rsi: Some(rsi),
        atr: Some(atr),
        atr_mean: Some(atr_mean),
        bb_high: Some(bb_high),
        bb_mid: Some(bb_mid),
        bb_low: Some(bb_low),
        ..Default::default()
    };
}

// Leading warmup slots stay NaN; downstream snapshotting skips them.
fn sma(values: &[f64], period: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                f64::NAN
            } else {
                values[i + 1 - period..=i].iter().sum::<f64>() / period as f64
            }
        })
        .collect()
}

fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

fn naive_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    (0..closes.len())
        .map(|i| {
            if i < period {
                return f64::NAN;
            }
            let mut gains = 0.0;
            let mut losses = 0.0;
            for j in i + 1 - period..=i {
                let delta = closes[j] - closes[j - 1];
                if delta >= 0.0 {
                    gains += delta;
                } else {
                    losses -= delta;
                }
            }
            if losses == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + gains / losses)
            }
        })
        .collect()
}

fn true_ranges(series: &CandleSeries) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            let bar_range = series.high_prices[i] - series.low_prices[i];
            if i == 0 {
                return bar_range;
            }
            let prev_close = series.close_prices[i - 1];
            bar_range
                .max((series.high_prices[i] - prev_close).abs())
                .max((series.low_prices[i] - prev_close).abs())
        })
        .collect()
}
