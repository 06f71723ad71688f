const EPSILON: f64 = 1e-9;

/// Division that yields 0 for a zero or non-finite operand.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

pub fn percent_of(value: f64, total: f64) -> f64 {
    safe_ratio(value, total) * 100.0
}

/// Multiplier that turns raw weight units into percent of `total`.
pub fn percentage_factor(total: f64) -> f64 {
    safe_ratio(100.0, total)
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= EPSILON * left.abs().max(right.abs()).max(1.0)
}
