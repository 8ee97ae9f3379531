use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::domain::timeframe::Timeframe;
use crate::utils::maths_utils::bands_overlap;

// ============================================================================
// ZoneKind: every zone the detectors can emit
// ============================================================================

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, EnumIter,
)]
pub enum ZoneKind {
    #[serde(rename = "bull_fvg")]
    BullishFvg,
    #[serde(rename = "bear_fvg")]
    BearishFvg,
    #[serde(rename = "bull_ob")]
    BullishOb,
    #[serde(rename = "bear_ob")]
    BearishOb,
    #[serde(rename = "bsl")]
    BuySideLiquidity,
    #[serde(rename = "ssl")]
    SellSideLiquidity,
    #[serde(rename = "ath")]
    Ath,
}

impl ZoneKind {
    // Short names used in record fields and confluence counters.
    // These are load-bearing for downstream consumers; never rename.
    pub fn abbrev(&self) -> &'static str {
        match self {
            ZoneKind::BullishFvg => "bull_fvg",
            ZoneKind::BearishFvg => "bear_fvg",
            ZoneKind::BullishOb => "bull_ob",
            ZoneKind::BearishOb => "bear_ob",
            ZoneKind::BuySideLiquidity => "bsl",
            ZoneKind::SellSideLiquidity => "ssl",
            ZoneKind::Ath => "ath",
        }
    }

    pub fn is_liquidity(&self) -> bool {
        matches!(self, ZoneKind::BuySideLiquidity | ZoneKind::SellSideLiquidity)
    }

    // FVGs and order blocks. The ATH zone belongs to neither family.
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            ZoneKind::BullishFvg | ZoneKind::BearishFvg | ZoneKind::BullishOb | ZoneKind::BearishOb
        )
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

// ============================================================================
// Zone: one detected zone, immutable once built
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Zone {
    pub kind: ZoneKind,
    pub symbol: String,
    pub timeframe: Timeframe,

    // Price band, always high >= low
    pub price_high: f64,
    pub price_low: f64,

    // Bar the zone was created at, in its own timeframe's units until the
    // batch is normalized
    pub created_index: usize,
    pub created_time_ms: i64,

    // First bar that invalidated/filled the zone (for liquidity: the sweep)
    pub touch: Option<Touch>,

    pub snapshot: IndicatorSnapshot,
    pub stats: DerivedStats,
    pub payload: ZonePayload,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub index: usize,
    pub time_ms: i64,
}

impl Zone {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: ZoneKind,
        symbol: &str,
        timeframe: Timeframe,
        price_low: f64,
        price_high: f64,
        created_index: usize,
        created_time_ms: i64,
        snapshot: IndicatorSnapshot,
        stats: DerivedStats,
        payload: ZonePayload,
    ) -> Self {
        debug_assert!(
            price_high >= price_low,
            "inverted zone band for {kind}: low {price_low} > high {price_high}"
        );
        Zone {
            kind,
            symbol: symbol.to_string(),
            timeframe,
            price_high,
            price_low,
            created_index,
            created_time_ms,
            touch: None,
            snapshot,
            stats,
            payload,
        }
    }

    pub fn zone_width(&self) -> f64 {
        self.price_high - self.price_low
    }

    pub fn overlaps(&self, other: &Zone) -> bool {
        bands_overlap(
            self.price_low,
            self.price_high,
            other.price_low,
            other.price_high,
        )
    }
}

// ============================================================================
// Kind-specific payloads
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ZonePayload {
    Structure {
        body_size: f64,
        wick_ratio: f64,
        zone_width: f64,
    },
    Liquidity {
        member_count: usize,
        level: f64,
        level_deviation: f64,
        avg_volume_around_zone: f64,
        duration_between_first_last_touch_ms: i64,
        member_indices: Vec<usize>,
    },
    Ath,
}

// ============================================================================
// Per-zone context captured at creation
// ============================================================================

/// Indicator values at the creation bar (for liquidity pools: the per-column
/// mean over the member bars). Columns missing upstream stay `None`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub ma_fast: Option<f64>,
    pub ma_slow: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub atr_mean: Option<f64>,
    pub bb_high: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_low: Option<f64>,
    pub reg_alpha: Option<f64>,
    pub reg_beta: Option<f64>,
    pub reg_gamma: Option<f64>,
    pub reg_r2: Option<f64>,
}

impl IndicatorSnapshot {
    // Record-field order, matching IndicatorColumns::columns.
    pub fn fields(&self) -> [(&'static str, Option<f64>); 13] {
        [
            ("ma_fast", self.ma_fast),
            ("ma_slow", self.ma_slow),
            ("ema", self.ema),
            ("rsi", self.rsi),
            ("atr", self.atr),
            ("atr_mean", self.atr_mean),
            ("bb_high", self.bb_high),
            ("bb_mid", self.bb_mid),
            ("bb_low", self.bb_low),
            ("reg_alpha", self.reg_alpha),
            ("reg_beta", self.reg_beta),
            ("reg_gamma", self.reg_gamma),
            ("reg_r2", self.reg_r2),
        ]
    }

    pub fn set_field(&mut self, name: &str, value: f64) {
        match name {
            "ma_fast" => self.ma_fast = Some(value),
            "ma_slow" => self.ma_slow = Some(value),
            "ema" => self.ema = Some(value),
            "rsi" => self.rsi = Some(value),
            "atr" => self.atr = Some(value),
            "atr_mean" => self.atr_mean = Some(value),
            "bb_high" => self.bb_high = Some(value),
            "bb_mid" => self.bb_mid = Some(value),
            "bb_low" => self.bb_low = Some(value),
            "reg_alpha" => self.reg_alpha = Some(value),
            "reg_beta" => self.reg_beta = Some(value),
            "reg_gamma" => self.reg_gamma = Some(value),
            "reg_r2" => self.reg_r2 = Some(value),
            _ => {}
        }
    }
}

/// Local market context over the 5 bars up to the creation bar.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedStats {
    pub avg_volume_5: f64,
    pub close_std_5: f64,
    pub momentum_5: f64,
}

// ============================================================================
// Annotations accreted by the later pipeline stages
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ConfluenceHit {
    pub kind: ZoneKind,
    pub timeframe: Timeframe,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfluenceSet {
    pub core_confluence: Vec<ConfluenceHit>,
    pub liquidity_confluence: Vec<ConfluenceHit>,

    // Indices into the normalized batch of every candidate that passed the
    // availability test, whether or not it overlaps the base zone. Kept for
    // the nearby and reaction stages.
    pub available_core: Vec<usize>,
    pub available_liquidity: Vec<usize>,
}

/// The full attribute set of a matched nearest zone, flattened into the
/// record under an `above_`/`below_` prefix.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NearbySummary {
    pub kind: ZoneKind,
    pub timeframe: Timeframe,
    pub price_high: f64,
    pub price_low: f64,
    pub created_index: usize,
    pub created_time_ms: i64,
    pub touch_index: Option<usize>,
    pub touch_time_ms: Option<i64>,
    pub snapshot: IndicatorSnapshot,
    pub stats: DerivedStats,
    pub payload: ZonePayload,
}

impl From<&Zone> for NearbySummary {
    fn from(zone: &Zone) -> Self {
        NearbySummary {
            kind: zone.kind,
            timeframe: zone.timeframe,
            price_high: zone.price_high,
            price_low: zone.price_low,
            created_index: zone.created_index,
            created_time_ms: zone.created_time_ms,
            touch_index: zone.touch.map(|t| t.index),
            touch_time_ms: zone.touch.map(|t| t.time_ms),
            snapshot: zone.snapshot,
            stats: zone.stats,
            payload: zone.payload.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NearbyAnnotation {
    pub distance_above: f64,
    pub distance_below: f64,
    pub above: Option<NearbySummary>,
    pub below: Option<NearbySummary>,
}

impl Default for NearbyAnnotation {
    fn default() -> Self {
        NearbyAnnotation {
            distance_above: f64::INFINITY,
            distance_below: f64::INFINITY,
            above: None,
            below: None,
        }
    }
}

// ============================================================================
// Reaction: what price did when it came back
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, EnumIter)]
pub enum TouchType {
    #[serde(rename = "body_close_inside")]
    BodyCloseInside,
    #[serde(rename = "engulf")]
    Engulf,
    #[serde(rename = "body_close_above")]
    BodyCloseAbove,
    #[serde(rename = "body_close_below")]
    BodyCloseBelow,
    #[serde(rename = "wick_touch")]
    WickTouch,
}

impl TouchType {
    pub fn label(&self) -> &'static str {
        match self {
            TouchType::BodyCloseInside => "body_close_inside",
            TouchType::Engulf => "engulf",
            TouchType::BodyCloseAbove => "body_close_above",
            TouchType::BodyCloseBelow => "body_close_below",
            TouchType::WickTouch => "wick_touch",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CandleSnapshot {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TargetHit {
    pub kind: ZoneKind,
    pub timeframe: Timeframe,
    pub price_high: f64,
    pub price_low: f64,
    pub crossed_at_index: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub touch_type: Option<TouchType>,
    pub touch_index: Option<usize>,
    pub touch_candle: Option<CandleSnapshot>,
    pub target: Option<TargetHit>,
}

// ============================================================================
// AnnotatedZone: immutable core + accreted annotations
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnnotatedZone {
    pub zone: Zone,
    pub confluence: Option<ConfluenceSet>,
    pub nearby: Option<NearbyAnnotation>,
    pub reaction: Option<Reaction>,
}

impl AnnotatedZone {
    pub fn bare(zone: Zone) -> Self {
        AnnotatedZone {
            zone,
            confluence: None,
            nearby: None,
            reaction: None,
        }
    }
}
