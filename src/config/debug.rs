//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so batch
//! runs stay quiet.

/// Emit per-timeframe zone counts after each symbol scan.
pub const PRINT_SCAN_SUMMARY: bool = false;

/// If non-empty, emit per-base-zone confluence details only for this symbol.
/// Example: "BTCUSDT". Use "" to disable.
pub const PRINT_CONFLUENCE_FOR_SYMBOL: &str = "";

/// Emit liquidity pool membership details during clustering.
pub const PRINT_POOL_MEMBERS: bool = false;

/// Emit absorption steps while merging zones across timeframes.
pub const PRINT_MERGE_STEPS: bool = false;
