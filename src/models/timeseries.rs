use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;
use crate::domain::timeframe::Timeframe;
use crate::errors::DetectError;

// ============================================================================
// CandleSeries: Raw OHLCV series for one (symbol, timeframe)
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CandleSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub first_open_time_ms: i64,

    // Prices
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,

    // Activity
    pub volumes: Vec<f64>,
    pub trade_counts: Vec<u32>,

    // Indicator columns computed upstream and shipped alongside the candles
    pub indicators: IndicatorColumns,
}

impl CandleSeries {
    pub fn len(&self) -> usize {
        self.open_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open_prices.is_empty()
    }

    pub fn get_candle(&self, idx: usize) -> Candle {
        Candle::new(
            self.open_prices[idx],
            self.close_prices[idx],
            self.low_prices[idx],
            self.high_prices[idx],
            self.volumes[idx],
            self.trade_counts[idx],
        )
    }

    // Open time of the bar at `idx`. Bars are contiguous, so this is pure
    // arithmetic off the first open time.
    pub fn timestamp_ms(&self, idx: usize) -> i64 {
        self.first_open_time_ms + idx as i64 * self.timeframe.interval_ms()
    }

    pub fn last_timestamp_ms(&self) -> i64 {
        self.timestamp_ms(self.len().saturating_sub(1))
    }

    // Bar whose open time is exactly `ts_ms`, if in range.
    pub fn index_of_time_ms(&self, ts_ms: i64) -> Option<usize> {
        let interval_ms = self.timeframe.interval_ms();
        let offset_ms = ts_ms - self.first_open_time_ms;
        if offset_ms < 0 || offset_ms % interval_ms != 0 {
            return None;
        }
        let idx = (offset_ms / interval_ms) as usize;
        if idx < self.len() { Some(idx) } else { None }
    }

    /// Checks that every parallel column has the same number of rows as the
    /// price columns. Called once at ingestion; the detectors index freely
    /// after this passes.
    pub fn validate(&self) -> Result<(), DetectError> {
        let expected = self.open_prices.len();
        let parallel: [(&'static str, usize); 5] = [
            ("high_prices", self.high_prices.len()),
            ("low_prices", self.low_prices.len()),
            ("close_prices", self.close_prices.len()),
            ("volumes", self.volumes.len()),
            ("trade_counts", self.trade_counts.len()),
        ];
        for (column, got) in parallel {
            if got != expected {
                return Err(DetectError::MismatchedColumns {
                    column,
                    expected,
                    got,
                });
            }
        }
        for (column, values) in self.indicators.present() {
            if values.len() != expected {
                return Err(DetectError::MismatchedColumns {
                    column,
                    expected,
                    got: values.len(),
                });
            }
        }
        Ok(())
    }

    /// Looks up an indicator column the caller cannot work without. Detection
    /// itself tolerates absent columns (snapshots carry `None`); this is for
    /// ingestion jobs and exporters that promise a complete feed.
    pub fn require_indicator(&self, column: &'static str) -> Result<&[f64], DetectError> {
        self.indicators
            .columns()
            .into_iter()
            .find_map(|(name, values)| (name == column).then_some(values))
            .flatten()
            .map(|v| v.as_slice())
            .ok_or(DetectError::MissingIndicator { column })
    }
}

// ============================================================================
// IndicatorColumns: columns attached upstream, all optional
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IndicatorColumns {
    pub ma_fast: Option<Vec<f64>>,
    pub ma_slow: Option<Vec<f64>>,
    pub ema: Option<Vec<f64>>,
    pub rsi: Option<Vec<f64>>,
    pub atr: Option<Vec<f64>>,
    pub atr_mean: Option<Vec<f64>>,
    pub bb_high: Option<Vec<f64>>,
    pub bb_mid: Option<Vec<f64>>,
    pub bb_low: Option<Vec<f64>>,
    pub reg_alpha: Option<Vec<f64>>,
    pub reg_beta: Option<Vec<f64>>,
    pub reg_gamma: Option<Vec<f64>>,
    pub reg_r2: Option<Vec<f64>>,
}

impl IndicatorColumns {
    // All columns in record-field order, present or not.
    pub fn columns(&self) -> [(&'static str, Option<&Vec<f64>>); 13] {
        [
            ("ma_fast", self.ma_fast.as_ref()),
            ("ma_slow", self.ma_slow.as_ref()),
            ("ema", self.ema.as_ref()),
            ("rsi", self.rsi.as_ref()),
            ("atr", self.atr.as_ref()),
            ("atr_mean", self.atr_mean.as_ref()),
            ("bb_high", self.bb_high.as_ref()),
            ("bb_mid", self.bb_mid.as_ref()),
            ("bb_low", self.bb_low.as_ref()),
            ("reg_alpha", self.reg_alpha.as_ref()),
            ("reg_beta", self.reg_beta.as_ref()),
            ("reg_gamma", self.reg_gamma.as_ref()),
            ("reg_r2", self.reg_r2.as_ref()),
        ]
    }

    pub fn present(&self) -> impl Iterator<Item = (&'static str, &Vec<f64>)> {
        self.columns()
            .into_iter()
            .filter_map(|(name, values)| values.map(|v| (name, v)))
    }
}
