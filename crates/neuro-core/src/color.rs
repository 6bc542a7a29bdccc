//! RGBA floating-point color with HSV, packed-integer and hex conversions.
//!
//! Channels are unconstrained until [`Color::clamp`] is called, so colors can
//! be summed and scaled freely before being brought back into `[0, 1]`.
//!
//! # Packed layout
//!
//! Packed integers use `0xAARRGGBB`: alpha in the top byte, then red, green
//! and blue in the low byte. See [`rgba`] and the `extract_*` helpers.
//!
//! # Example
//!
//! ```rust
//! use neuro_core::Color;
//!
//! let red = Color::hsv(0.0, 1.0, 1.0);
//! assert_eq!(red.to_hex_string(), "#FF0000");
//!
//! let parsed = Color::parse_hex("#FF8000").unwrap();
//! assert_eq!(parsed.to_u32(), 0xFFFF8000);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{format, string::String};

use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

use libm::{fabs, floor, fmod};

use crate::math::{Interpolate, clamp};

/// Golden ratio conjugate used to spread unique hues.
const GOLDEN_RATIO_CONJUGATE: f64 = 0.6180339887498;

/// Hue of the first unique color.
const UNIQUE_HUE_START: f64 = 0.3;

/// Extracts the red byte of a packed `0xAARRGGBB` value.
#[inline]
pub fn extract_red(color: u32) -> u8 {
    ((color >> 16) & 0xff) as u8
}

/// Extracts the green byte of a packed `0xAARRGGBB` value.
#[inline]
pub fn extract_green(color: u32) -> u8 {
    ((color >> 8) & 0xff) as u8
}

/// Extracts the blue byte of a packed `0xAARRGGBB` value.
#[inline]
pub fn extract_blue(color: u32) -> u8 {
    (color & 0xff) as u8
}

/// Extracts the alpha byte of a packed `0xAARRGGBB` value.
#[inline]
pub fn extract_alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

/// Packs four bytes into `0xAARRGGBB`.
#[inline]
pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Floating-point RGBA color.
///
/// Equality is exact per channel; there is no tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Default for Color {
    /// Opaque black.
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its four channels.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from red, green and blue.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Sets all four channels, alpha included, to `value`.
    #[inline]
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Creates a color from a packed `0xAARRGGBB` value.
    pub fn from_u32(packed: u32) -> Self {
        Self::new(
            f32::from(extract_red(packed)) / 255.0,
            f32::from(extract_green(packed)) / 255.0,
            f32::from(extract_blue(packed)) / 255.0,
            f32::from(extract_alpha(packed)) / 255.0,
        )
    }

    /// Creates a color from hue, saturation and value, each in `[0, 1]`.
    pub fn hsv(h: f32, s: f32, v: f32) -> Self {
        let mut color = Self::default();
        color.set_hsv(h, s, v);
        color
    }

    /// Parses `"#RRGGBB"`. Returns `None` for anything else.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let mut color = Self::default();
        color.set_hex_string(text).then_some(color)
    }

    /// The unique color for `index`; see [`set_unique_color`](Self::set_unique_color).
    pub fn unique(index: u32) -> Self {
        let mut color = Self::default();
        color.set_unique_color(index);
        color
    }

    /// Overwrites all four channels.
    #[inline]
    pub fn set(&mut self, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        *self = Self::new(r, g, b, a);
        self
    }

    /// Sets every channel, alpha included, to zero.
    #[inline]
    pub fn zero(&mut self) -> &mut Self {
        *self = Self::splat(0.0);
        self
    }

    /// Clamps all four channels to `[0, 1]` in place.
    pub fn clamp(&mut self) -> &mut Self {
        self.r = clamp(self.r, 0.0, 1.0);
        self.g = clamp(self.g, 0.0, 1.0);
        self.b = clamp(self.b, 0.0, 1.0);
        self.a = clamp(self.a, 0.0, 1.0);
        self
    }

    /// Returns a clamped copy.
    #[inline]
    pub fn clamped(mut self) -> Self {
        self.clamp();
        self
    }

    /// Replaces red, green and blue with the RGB equivalent of `(h, s, v)`.
    ///
    /// `h` is in turns, not degrees. Alpha is left untouched and the result
    /// is clamped.
    pub fn set_hsv(&mut self, h: f32, s: f32, v: f32) -> &mut Self {
        let h = f64::from(h) * 6.0;
        let s = f64::from(s);
        let v = f64::from(v);

        let chroma = s * v;
        let x = chroma * (1.0 - fabs(fmod(h, 2.0) - 1.0));
        let m = v - chroma;

        let (r, g, b) = if (0.0..1.0).contains(&h) {
            (chroma, x, 0.0)
        } else if (1.0..2.0).contains(&h) {
            (x, chroma, 0.0)
        } else if (2.0..3.0).contains(&h) {
            (0.0, chroma, x)
        } else if (3.0..4.0).contains(&h) {
            (0.0, x, chroma)
        } else if (4.0..5.0).contains(&h) {
            (x, 0.0, chroma)
        } else if (5.0..6.0).contains(&h) {
            (chroma, 0.0, x)
        } else {
            (0.0, 0.0, 0.0)
        };

        self.r = (r + m) as f32;
        self.g = (g + m) as f32;
        self.b = (b + m) as f32;
        self.clamp()
    }

    /// Parses `"#RRGGBB"` into red, green and blue, sets alpha to 1 and clamps.
    ///
    /// Returns `false` and leaves the color untouched when `text` is not
    /// exactly seven characters of `#` followed by hex digits.
    pub fn set_hex_string(&mut self, text: &str) -> bool {
        let Some(digits) = text.strip_prefix('#') else {
            return false;
        };
        if text.len() != 7 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
        let Ok(packed) = u32::from_str_radix(digits, 16) else {
            return false;
        };

        self.r = f32::from(extract_red(packed)) / 255.0;
        self.g = f32::from(extract_green(packed)) / 255.0;
        self.b = f32::from(extract_blue(packed)) / 255.0;
        self.a = 1.0;
        self.clamp();
        true
    }

    /// Formats the clamped color as `"#RRGGBB"`; alpha is dropped.
    pub fn to_hex_string(&self) -> String {
        let c = self.clamped();
        format!(
            "#{:02X}{:02X}{:02X}",
            channel_to_byte(c.r),
            channel_to_byte(c.g),
            channel_to_byte(c.b)
        )
    }

    /// Packs the color into `0xAARRGGBB`.
    ///
    /// Channels are scaled by 255 and truncated; clamp first for
    /// out-of-range colors.
    pub fn to_u32(&self) -> u32 {
        rgba(
            channel_to_byte(self.r),
            channel_to_byte(self.g),
            channel_to_byte(self.b),
            channel_to_byte(self.a),
        )
    }

    /// Picks a well-separated hue for `index` along the golden-ratio sequence.
    ///
    /// Saturation is fixed at 0.85 and value at 1.0. The same index always
    /// gives the same color.
    pub fn set_unique_color(&mut self, index: u32) -> &mut Self {
        let hue = UNIQUE_HUE_START + f64::from(index) * GOLDEN_RATIO_CONJUGATE;
        let hue = hue - floor(hue);
        self.set_hsv(hue as f32, 0.85, 1.0)
    }
}

// Truncates, but absorbs the f32 error of `byte / 255 * 255` so packed
// values survive a round trip.
#[inline]
fn channel_to_byte(value: f32) -> u8 {
    (value * 255.0 + 1e-3) as u8
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Self::from_u32(packed)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_u32()
    }
}

impl Interpolate for Color {
    #[inline]
    fn interpolate(self, other: Self, t: f64) -> Self {
        let t = t as f32;
        self * (1.0 - t) + other * t
    }
}

impl Add for Color {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Sub for Color {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b, self.a - rhs.a)
    }
}

impl Mul for Color {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

impl Mul<f32> for Color {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}

impl Div for Color {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b, self.a / rhs.a)
    }
}

impl Div<f32> for Color {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.r / rhs, self.g / rhs, self.b / rhs, self.a / rhs)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Color {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Color {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl MulAssign<f32> for Color {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl DivAssign for Color {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl DivAssign<f32> for Color {
    fn div_assign(&mut self, rhs: f32) {
        *self = *self / rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_opaque_black() {
        assert_eq!(Color::default(), Color::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_splat_sets_alpha() {
        assert_eq!(Color::splat(0.5), Color::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_packed_layout() {
        let packed = rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(packed, 0x44112233);
        assert_eq!(extract_red(packed), 0x11);
        assert_eq!(extract_green(packed), 0x22);
        assert_eq!(extract_blue(packed), 0x33);
        assert_eq!(extract_alpha(packed), 0x44);
    }

    #[test]
    fn test_packed_roundtrip() {
        for packed in [0xFF000000u32, 0xFFFFFFFF, 0x80402010, 0x00FF7F01] {
            assert_eq!(Color::from_u32(packed).to_u32(), packed);
        }
    }

    #[test]
    fn test_hsv_primary_sectors() {
        assert_eq!(Color::hsv(0.0, 1.0, 1.0), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::hsv(1.0 / 3.0, 1.0, 1.0).to_hex_string(), "#00FF00");
        assert_eq!(Color::hsv(2.0 / 3.0, 1.0, 1.0).to_hex_string(), "#0000FF");
        // zero saturation gives grey
        assert_eq!(Color::hsv(0.4, 0.0, 0.5), Color::rgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_hsv_outside_sectors_is_black() {
        let c = Color::hsv(1.0, 1.0, 1.0);
        assert_eq!((c.r, c.g, c.b), (0.0, 0.0, 0.0));
        let c = Color::hsv(-0.2, 1.0, 1.0);
        assert_eq!((c.r, c.g, c.b), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_hsv_keeps_alpha() {
        let mut c = Color::new(0.0, 0.0, 0.0, 0.25);
        c.set_hsv(0.0, 1.0, 1.0);
        assert_eq!(c.a, 0.25);
    }

    #[test]
    fn test_hex_parse() {
        let mut c = Color::new(0.1, 0.2, 0.3, 0.4);
        assert!(c.set_hex_string("#FF0080"));
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_hex_parse_failure_leaves_color() {
        let original = Color::new(0.1, 0.2, 0.3, 0.4);
        for bad in ["", "FF0080", "#FF008", "#FF00800", "#GG0080", "#+F0080"] {
            let mut c = original;
            assert!(!c.set_hex_string(bad), "accepted {bad:?}");
            assert_eq!(c, original);
        }
    }

    #[test]
    fn test_hex_output_clamps() {
        let c = Color::new(2.0, -1.0, 0.5, 0.0);
        assert_eq!(c.to_hex_string(), "#FF007F");
    }

    #[test]
    fn test_unique_color_deterministic() {
        assert_eq!(Color::unique(7), Color::unique(7));
        assert_ne!(Color::unique(0), Color::unique(1));
        let first = Color::unique(0);
        assert_eq!(first, Color::hsv(0.3, 0.85, 1.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Color::new(0.5, 0.5, 0.5, 1.0);
        let b = Color::new(0.25, 0.0, 1.0, 0.5);
        assert_eq!(a + b, Color::new(0.75, 0.5, 1.5, 1.5));
        assert_eq!(a - b, Color::new(0.25, 0.5, -0.5, 0.5));
        assert_eq!(a * 2.0, Color::new(1.0, 1.0, 1.0, 2.0));
        assert_eq!(a * b, Color::new(0.125, 0.0, 0.5, 0.5));
        assert_eq!(b / 0.5, Color::new(0.5, 0.0, 2.0, 1.0));
        let mut c = a;
        c += b;
        c -= b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_interpolate_color() {
        let c = Color::BLACK.interpolate(Color::WHITE, 0.5);
        assert_eq!(c, Color::new(0.5, 0.5, 0.5, 1.0));
    }
}
