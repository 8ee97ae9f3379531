//! Per-symbol detection thresholds.
//!
//! Gap and order-block significance is measured in absolute quote-price
//! units, so a workable threshold depends on where the instrument trades:
//! hundreds of dollars on BTCUSDT, single dollars on SOLUSDT. Unknown
//! symbols fall back to the book's default entry.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SymbolThresholds {
    /// Minimum gap width / candle range (quote units) for a structure zone.
    pub zone_threshold: f64,
    /// Minimum distance for the nearest-zone search. Usually the same order
    /// of magnitude as `zone_threshold`.
    pub min_zone_distance: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThresholdBook {
    pub default: SymbolThresholds,
    pub symbols: HashMap<String, SymbolThresholds>,
}

impl ThresholdBook {
    /// Built-in book covering the majors. Callers wanting different tuning
    /// load a JSON file with the same shape via [`ThresholdBook::load`].
    pub fn builtin() -> Self {
        let mut symbols = HashMap::new();
        symbols.insert(
            "BTCUSDT".to_string(),
            SymbolThresholds {
                zone_threshold: 300.0,
                min_zone_distance: 300.0,
            },
        );
        symbols.insert(
            "ETHUSDT".to_string(),
            SymbolThresholds {
                zone_threshold: 15.0,
                min_zone_distance: 5.0,
            },
        );
        symbols.insert(
            "SOLUSDT".to_string(),
            SymbolThresholds {
                zone_threshold: 2.0,
                min_zone_distance: 2.0,
            },
        );
        ThresholdBook {
            default: SymbolThresholds {
                zone_threshold: 10.0,
                min_zone_distance: 10.0,
            },
            symbols,
        }
    }

    pub fn for_symbol(&self, symbol: &str) -> SymbolThresholds {
        self.symbols.get(symbol).copied().unwrap_or(self.default)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open threshold book {}", path.display()))?;
        let book: ThresholdBook = serde_json::from_reader(BufReader::new(file))
            .context(format!("Failed to parse threshold book {}", path.display()))?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbol_uses_its_entry() {
        let book = ThresholdBook::builtin();
        let btc = book.for_symbol("BTCUSDT");
        assert_eq!(btc.zone_threshold, 300.0);
        let sol = book.for_symbol("SOLUSDT");
        assert_eq!(sol.zone_threshold, 2.0);
    }

    #[test]
    fn test_unknown_symbol_falls_back_to_default() {
        let book = ThresholdBook::builtin();
        let other = book.for_symbol("DOGEUSDT");
        assert_eq!(other, book.default);
    }

    #[test]
    fn test_book_round_trips_through_json() {
        let book = ThresholdBook::builtin();
        let json = serde_json::to_string(&book).expect("serialize");
        let back: ThresholdBook = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.for_symbol("ETHUSDT").zone_threshold, 15.0);
        assert_eq!(back.default, book.default);
    }
}
