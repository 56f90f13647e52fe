use num_traits::Float;

use crate::errors::*;

/// Formats a number the shortest way that still reads back to the same value
pub fn format_f64(g: f64) -> String {
    if !g.is_finite() {
        return format!("{}", g);
    }
    let mut buf = dtoa::Buffer::new();
    let s = buf.format(g);
    // dtoa always prints a fractional part
    match s.strip_suffix(".0") {
        Some(int) => int.to_string(),
        None => s.to_string(),
    }
}

pub(crate) fn f64_equal(f1: f64, f2: f64) -> bool {
    (f1 - f2).abs() <= f64::EPSILON
}

/// Returns true if a number has no fractional part. NaN and infinities are
/// not integers.
pub fn is_integer<T: Float>(n: T) -> bool {
    n.is_finite() && n.fract().is_zero()
}

/// Rejects NaN and infinite results of a calculation named `what`
pub(crate) fn ensure_finite(what: &str, v: f64) -> CalcResult {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CalcError::NotFinite(what.to_string()))
    }
}
