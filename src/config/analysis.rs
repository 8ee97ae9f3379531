//! Detection and computation configuration

/// Settings for swing extrema detection
pub struct SwingConfig {
    // Bars on each side of the candidate extremum. The window is clipped at
    // the series edges, so boundary bars still classify.
    pub window: usize,
}

/// Settings for liquidity pool clustering
pub struct LiquidityConfig {
    // Fraction of the full series price span used as the clustering radius
    // (0.01 corresponds to 1% of max(high) - min(low))
    pub range_pct: f64,
}

/// Settings for cross-timeframe zone merging
pub struct MergeConfig {
    // Relative band expansion applied before testing overlap between zones
    pub overlap_threshold: f64,
}

/// The Master Detection Configuration
pub struct DetectionConfig {
    // Sub-groups
    pub swings: SwingConfig,
    pub liquidity: LiquidityConfig,
    pub merge: MergeConfig,
}

pub const DETECTION: DetectionConfig = DetectionConfig {
    swings: SwingConfig { window: 20 },

    liquidity: LiquidityConfig { range_pct: 0.01 },

    merge: MergeConfig {
        overlap_threshold: 0.001,
    },
};
