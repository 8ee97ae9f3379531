use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::errors::DetectError;
use crate::utils::TimeUtils;

/// Chart timeframes in canonical order, smallest to largest.
/// Declaration order drives the derived `Ord`, so sorting a batch of
/// timeframes always yields the canonical order.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, EnumIter,
)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "3m")]
    Min3,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1D")]
    Day1,
}

impl Timeframe {
    // Single source of truth for durations. Everything else (interval_ms,
    // multipliers) is derived from this table.
    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::Min1 => 1,
            Timeframe::Min3 => 3,
            Timeframe::Min5 => 5,
            Timeframe::Min15 => 15,
            Timeframe::Hour1 => 60,
            Timeframe::Hour4 => 240,
            Timeframe::Day1 => 1440,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.minutes() * TimeUtils::MS_IN_MIN
    }

    // Rank in the canonical order, for index-keyed tables and logs.
    pub fn order(&self) -> usize {
        match self {
            Timeframe::Min1 => 0,
            Timeframe::Min3 => 1,
            Timeframe::Min5 => 2,
            Timeframe::Min15 => 3,
            Timeframe::Hour1 => 4,
            Timeframe::Hour4 => 5,
            Timeframe::Day1 => 6,
        }
    }

    // The label used on the wire, in record fields and on the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Min1 => "1m",
            Timeframe::Min3 => "3m",
            Timeframe::Min5 => "5m",
            Timeframe::Min15 => "15m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1D",
        }
    }

    /// Whole number of `from` bars that make up one `to` bar.
    /// Fails when the larger timeframe is not an exact multiple of the
    /// smaller one (e.g. 3m vs 5m), or when `to` is smaller than `from`.
    pub fn multiplier(from: Timeframe, to: Timeframe) -> Result<usize, DetectError> {
        if to < from || to.minutes() % from.minutes() != 0 {
            return Err(DetectError::UnsupportedPair { from, to });
        }
        Ok((to.minutes() / from.minutes()) as usize)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;
        Timeframe::iter()
            .find(|tf| tf.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown timeframe label: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_multiplier_known_pairs() {
        assert_eq!(
            Timeframe::multiplier(Timeframe::Min1, Timeframe::Hour1),
            Ok(60)
        );
        assert_eq!(
            Timeframe::multiplier(Timeframe::Hour1, Timeframe::Day1),
            Ok(24)
        );
        assert_eq!(
            Timeframe::multiplier(Timeframe::Min1, Timeframe::Day1),
            Ok(1440)
        );
        assert_eq!(
            Timeframe::multiplier(Timeframe::Min15, Timeframe::Min15),
            Ok(1)
        );
    }

    #[test]
    fn test_multiplier_round_trip() {
        // Multipliers compose along any divisible chain
        let a = Timeframe::multiplier(Timeframe::Min1, Timeframe::Hour1).unwrap();
        let b = Timeframe::multiplier(Timeframe::Hour1, Timeframe::Day1).unwrap();
        let c = Timeframe::multiplier(Timeframe::Min1, Timeframe::Day1).unwrap();
        assert_eq!(a * b, c, "1m->1h->1D should compose to 1m->1D");
    }

    #[test]
    fn test_multiplier_rejects_non_divisible() {
        assert_eq!(
            Timeframe::multiplier(Timeframe::Min3, Timeframe::Min5),
            Err(DetectError::UnsupportedPair {
                from: Timeframe::Min3,
                to: Timeframe::Min5,
            })
        );
        // Larger into smaller never divides
        assert!(Timeframe::multiplier(Timeframe::Hour1, Timeframe::Min5).is_err());
    }

    #[test]
    fn test_canonical_order_matches_duration() {
        let mut prev_minutes = 0;
        for (rank, tf) in Timeframe::iter().enumerate() {
            assert_eq!(tf.order(), rank);
            assert!(tf.minutes() > prev_minutes);
            prev_minutes = tf.minutes();
        }
    }

    #[test]
    fn test_label_round_trip() {
        for tf in Timeframe::iter() {
            let parsed: Timeframe = tf.label().parse().unwrap();
            assert_eq!(parsed, tf);
        }
        assert!("2h".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_interval_ms() {
        assert_eq!(Timeframe::Min1.interval_ms(), TimeUtils::MS_IN_MIN);
        assert_eq!(Timeframe::Hour4.interval_ms(), TimeUtils::MS_IN_4_H);
        assert_eq!(Timeframe::Day1.interval_ms(), TimeUtils::MS_IN_D);
    }
}
