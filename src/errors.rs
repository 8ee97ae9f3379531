use thiserror::Error;

use crate::domain::Timeframe;

/// Fatal detection errors. "Nothing found" outcomes (no touch, no sweep, no nearby
/// zone, no target) are `Option::None` everywhere in this crate, never an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectError {
    /// The candle series is too short for the requested scan window.
    #[error("series too short: need at least {needed} candles, got {got}")]
    TooShortSeries { needed: usize, got: usize },

    /// A required indicator column was not attached by the upstream feed.
    #[error("missing indicator column: {column}")]
    MissingIndicator { column: &'static str },

    /// An attached column does not line up with the price vectors.
    #[error("indicator column {column} has {got} rows, expected {expected}")]
    MismatchedColumns {
        column: &'static str,
        expected: usize,
        got: usize,
    },

    /// No integer bar ratio exists between the two timeframes.
    #[error("no multiplier from {from} to {to}")]
    UnsupportedPair { from: Timeframe, to: Timeframe },

    /// A batch operation was handed zero inputs (no series, or no zones).
    #[error("batch input is empty")]
    EmptyBatch,
}
