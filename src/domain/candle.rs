// Define the CandleType enum
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

// Define the Candle struct with all its properties
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub volume: f64,
    pub trade_count: u32,
}

// Implement methods for the Candle struct
impl Candle {
    // A constructor for convenience
    pub fn new(
        open_price: f64,
        close_price: f64,
        low_price: f64,
        high_price: f64,
        volume: f64,
        trade_count: u32,
    ) -> Self {
        Candle {
            open_price,
            high_price,
            low_price,
            close_price,
            volume,
            trade_count,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close_price >= self.open_price {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open_price, self.close_price),
            CandleType::Bearish => (self.close_price, self.open_price),
        }
    }

    // Absolute size of the candle body
    pub fn body_size(&self) -> f64 {
        (self.close_price - self.open_price).abs()
    }

    // Combined wick length over the full candle range.
    // A zero-range candle has no wicks by convention.
    pub fn wick_ratio(&self) -> f64 {
        let full_range = self.high_price - self.low_price;
        if full_range <= 0.0 {
            return 0.0;
        }
        let (body_low, body_high) = self.body_range();
        let upper_wick = self.high_price - body_high;
        let lower_wick = body_low - self.low_price;
        (upper_wick + lower_wick) / full_range
    }
}
