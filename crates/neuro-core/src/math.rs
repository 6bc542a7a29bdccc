//! Scalar math helpers shared by the color model and the channel processors.
//!
//! Every function here is total: degenerate input (zero-width ranges, zero
//! normalisation factors, non-finite values) produces a defined fallback
//! instead of NaN or a panic.
//!
//! # Remapping
//!
//! - [`remap_range`] - affine map from one interval onto another
//! - [`clamped_remap_range`] - same, bounded to the target interval
//!
//! # Interpolation
//!
//! All interpolators are generic over [`Interpolate`], which is implemented
//! for `f32`, `f64` and [`Color`](crate::Color):
//!
//! | Function | Weight curve |
//! |----------|--------------|
//! | [`linear_interpolate`] | `t` |
//! | [`cosine_interpolate`] | `(1 - cos(t·π)) / 2` |
//! | [`ease_in_out_interpolate`] | area-preserving sine / linear / sine |
//!
//! # Axis helpers
//!
//! - [`nice_number_floor`] / [`nice_number_ceil`] - snap to `{1, 2, 5}·10ⁿ`
//! - [`next_power_of_two`]

use core::f64::consts::{FRAC_PI_2, PI};

use libm::{cos, fabs, floor, log10, pow, sin};

/// Tolerance used for degenerate-interval and equality checks.
pub const EPSILON: f64 = 1e-6;

/// Values that can be blended as `a·(1-t) + b·t`.
pub trait Interpolate: Copy {
    /// Blends `self` towards `other` by the weight `t`.
    fn interpolate(self, other: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline]
    fn interpolate(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(self, other: Self, t: f64) -> Self {
        let t = t as f32;
        self * (1.0 - t) + other * t
    }
}

/// Bounds `x` to `[lo, hi]`.
///
/// Unlike [`f64::clamp`] this never panics: when `lo > hi` the lower bound
/// wins for inputs below it and the upper bound for inputs above it.
#[inline]
pub fn clamp<T: PartialOrd>(x: T, lo: T, hi: T) -> T {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Maps `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
///
/// A source interval narrower than [`EPSILON`] yields `to_min`.
///
/// # Example
/// ```rust
/// use neuro_core::remap_range;
///
/// assert_eq!(remap_range(0.5, 0.0, 1.0, 10.0, 20.0), 15.0);
/// assert_eq!(remap_range(3.0, 2.0, 2.0, 10.0, 20.0), 10.0);
/// ```
#[inline]
pub fn remap_range(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    let from_range = from_max - from_min;
    if fabs(from_range) <= EPSILON {
        return to_min;
    }
    to_min + (value - from_min) / from_range * (to_max - to_min)
}

/// [`remap_range`] followed by a clamp into `[min(to), max(to)]`.
#[inline]
pub fn clamped_remap_range(
    value: f64,
    from_min: f64,
    from_max: f64,
    to_min: f64,
    to_max: f64,
) -> f64 {
    let result = remap_range(value, from_min, from_max, to_min, to_max);
    let (lo, hi) = if to_min <= to_max {
        (to_min, to_max)
    } else {
        (to_max, to_min)
    };
    clamp(result, lo, hi)
}

/// `a·(1-t) + b·t`.
#[inline]
pub fn linear_interpolate<T: Interpolate>(a: T, b: T, t: f64) -> T {
    a.interpolate(b, t)
}

/// Cosine blend weight: `(1 - cos(t·π)) / 2`.
#[inline]
pub fn cosine_weight(t: f64) -> f64 {
    (1.0 - cos(t * PI)) * 0.5
}

/// Interpolates with an S-shaped cosine weight instead of `t`.
#[inline]
pub fn cosine_interpolate<T: Interpolate>(a: T, b: T, t: f64) -> T {
    a.interpolate(b, cosine_weight(t))
}

/// Samples the ease-in / linear / ease-out curve at `t`.
///
/// The curve accelerates along a sine quarter-wave until `k1`, moves at a
/// constant velocity until `k2` and decelerates along a sine quarter-wave
/// until 1. Every segment is divided by the same factor so the curve runs
/// from 0 at `t = 0` to 1 at `t = 1`.
///
/// `t` is clamped to `[0, 1]`; when the breakpoints leave nothing to
/// normalise the curve degrades to `t`.
pub fn sample_ease_in_out_curve(t: f64, k1: f64, k2: f64) -> f64 {
    let t = clamp(t, 0.0, 1.0);
    let k1 = clamp(k1, 0.0, 1.0);
    let k2 = clamp(k2, k1, 1.0);

    let f = k1 * 2.0 / PI + k2 - k1 + (1.0 - k2) * 2.0 / PI;
    if f <= EPSILON {
        return t;
    }

    let value = if t < k1 {
        k1 * (2.0 / PI) * (sin((t / k1) * FRAC_PI_2 - FRAC_PI_2) + 1.0)
    } else if t < k2 || 1.0 - k2 <= EPSILON {
        k1 / FRAC_PI_2 + t - k1
    } else {
        k1 / FRAC_PI_2 + k2 - k1 + (1.0 - k2) * (2.0 / PI) * sin(((t - k2) / (1.0 - k2)) * FRAC_PI_2)
    };

    value / f
}

/// Interpolates along [`sample_ease_in_out_curve`].
///
/// `k1 = k2 = 0.5` gives a symmetric ease with no linear section.
#[inline]
pub fn ease_in_out_interpolate<T: Interpolate>(a: T, b: T, t: f64, k1: f64, k2: f64) -> T {
    a.interpolate(b, sample_ease_in_out_curve(t, k1, k2))
}

/// Smallest power of two `>= value`.
///
/// `0` maps to `1`; values above `2^31` saturate at `2^31`.
#[inline]
pub fn next_power_of_two(value: u32) -> u32 {
    value.checked_next_power_of_two().unwrap_or(1 << 31)
}

const NICE_STEPS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];

/// Splits a positive finite `x` into `(fraction, base)` with `x = fraction·base`
/// and `fraction` in `[1, 10)`.
fn decompose(x: f64) -> (f64, f64) {
    let base = pow(10.0, floor(log10(x)));
    (x / base, base)
}

/// Rounds `x` down to the nearest member of `{1, 2, 5}·10ⁿ`.
///
/// Negative input mirrors [`nice_number_ceil`]; zero and non-finite input
/// are returned unchanged.
///
/// # Example
/// ```rust
/// use neuro_core::nice_number_floor;
///
/// assert_eq!(nice_number_floor(7.3), 5.0);
/// assert_eq!(nice_number_floor(130.0), 100.0);
/// ```
pub fn nice_number_floor(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    if x < 0.0 {
        return -nice_number_ceil(-x);
    }
    let (fraction, base) = decompose(x);
    let mut best = NICE_STEPS[0];
    for &step in &NICE_STEPS {
        if step <= fraction * (1.0 + EPSILON) {
            best = step;
        }
    }
    best * base
}

/// Rounds `x` up to the nearest member of `{1, 2, 5}·10ⁿ`.
///
/// Negative input mirrors [`nice_number_floor`]; zero and non-finite input
/// are returned unchanged.
pub fn nice_number_ceil(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    if x < 0.0 {
        return -nice_number_floor(-x);
    }
    let (fraction, base) = decompose(x);
    for &step in &NICE_STEPS {
        if step >= fraction * (1.0 - EPSILON) {
            return step * base;
        }
    }
    10.0 * base
}

/// `|a - b| <= threshold`.
#[inline]
pub fn is_close(a: f64, b: f64, threshold: f64) -> bool {
    fabs(a - b) <= threshold
}

/// Inclusive range test.
#[inline]
pub fn in_range(x: f64, lo: f64, hi: f64) -> bool {
    x >= lo && x <= hi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_ties_resolve_to_bound() {
        assert_eq!(clamp(1.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-3.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(4, 0, 3), 3);
        // inverted bounds do not panic
        assert_eq!(clamp(0.5, 1.0, 0.0), 1.0);
    }

    #[test]
    fn test_remap_endpoints() {
        assert_eq!(remap_range(2.0, 2.0, 4.0, -1.0, 1.0), -1.0);
        assert_eq!(remap_range(4.0, 2.0, 4.0, -1.0, 1.0), 1.0);
        assert_eq!(remap_range(3.0, 2.0, 4.0, -1.0, 1.0), 0.0);
    }

    #[test]
    fn test_remap_degenerate_interval() {
        assert_eq!(remap_range(100.0, 1.0, 1.0 + 1e-7, 5.0, 9.0), 5.0);
    }

    #[test]
    fn test_clamped_remap_inverted_target() {
        let v = clamped_remap_range(2.0, 0.0, 1.0, 10.0, 0.0);
        assert_eq!(v, 0.0);
        let v = clamped_remap_range(-1.0, 0.0, 1.0, 10.0, 0.0);
        assert_eq!(v, 10.0);
    }

    #[test]
    fn test_linear_interpolate() {
        assert_eq!(linear_interpolate(0.0, 10.0, 0.0), 0.0);
        assert_eq!(linear_interpolate(0.0, 10.0, 0.25), 2.5);
        assert_eq!(linear_interpolate(2.0f32, 4.0f32, 0.5), 3.0);
    }

    #[test]
    fn test_cosine_weight_shape() {
        assert!(cosine_weight(0.0).abs() < 1e-12);
        assert!((cosine_weight(0.5) - 0.5).abs() < 1e-12);
        assert!((cosine_weight(1.0) - 1.0).abs() < 1e-12);
        assert!(cosine_weight(0.25) < 0.25);
    }

    #[test]
    fn test_ease_in_out_endpoints() {
        for &(k1, k2) in &[(0.5, 0.5), (0.2, 0.8), (0.0, 1.0), (0.3, 0.3)] {
            let start = sample_ease_in_out_curve(0.0, k1, k2);
            let end = sample_ease_in_out_curve(1.0, k1, k2);
            assert!(start.abs() < 1e-9, "k1={k1} k2={k2} start={start}");
            assert!((end - 1.0).abs() < 1e-9, "k1={k1} k2={k2} end={end}");
        }
    }

    #[test]
    fn test_ease_in_out_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = sample_ease_in_out_curve(i as f64 / 100.0, 0.25, 0.75);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_ease_in_out_interpolate_midpoint_symmetric() {
        let v: f64 = ease_in_out_interpolate(0.0, 2.0, 0.5, 0.5, 0.5);
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(5), 8);
        assert_eq!(next_power_of_two(1024), 1024);
        assert_eq!(next_power_of_two(u32::MAX), 1 << 31);
    }

    #[test]
    fn test_nice_numbers() {
        assert_eq!(nice_number_floor(7.3), 5.0);
        assert_eq!(nice_number_ceil(7.3), 10.0);
        assert_eq!(nice_number_floor(2.0), 2.0);
        assert_eq!(nice_number_ceil(2.0), 2.0);
        assert_eq!(nice_number_ceil(130.0), 200.0);
        assert!((nice_number_floor(0.031) - 0.02).abs() < 1e-12);
        assert_eq!(nice_number_floor(-7.3), -10.0);
        assert_eq!(nice_number_floor(0.0), 0.0);
    }

    #[test]
    fn test_is_close_and_in_range() {
        assert!(is_close(1.0, 1.0 + 1e-7, EPSILON));
        assert!(!is_close(1.0, 1.1, EPSILON));
        assert!(in_range(1.0, 1.0, 2.0));
        assert!(in_range(2.0, 1.0, 2.0));
        assert!(!in_range(2.1, 1.0, 2.0));
    }
}
