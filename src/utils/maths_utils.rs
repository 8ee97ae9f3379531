use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

/// Index of the largest value (first occurrence wins on ties).
pub fn argmax_index(vec: &[f64]) -> usize {
    vec.argmax()
}

/// Mean over a window of up to `width` bars ending at `end` (inclusive).
/// The window is clipped at the start of the series; `None` only when `end`
/// is out of bounds or the window is empty.
pub fn window_mean(values: &[f64], end: usize, width: usize) -> Option<f64> {
    if end >= values.len() || width == 0 {
        return None;
    }
    let start = end.saturating_sub(width - 1);
    Some(values[start..=end].iter().mean())
}

/// Population standard deviation over a window of up to `width` bars ending
/// at `end`, clipped like `window_mean`.
pub fn window_std(values: &[f64], end: usize, width: usize) -> Option<f64> {
    if end >= values.len() || width == 0 {
        return None;
    }
    let start = end.saturating_sub(width - 1);
    Some(values[start..=end].iter().population_std_dev())
}

/// Two closed price bands intersect (covers contains / contained / edge overlaps).
pub fn bands_overlap(a_low: f64, a_high: f64, b_low: f64, b_high: f64) -> bool {
    a_low <= b_high && a_high >= b_low
}
