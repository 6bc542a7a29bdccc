//! Piecewise-linear color gradients.
//!
//! A [`ColorMapper`] holds an ordered list of [`Keyframe`]s and evaluates a
//! color for any normalized scalar by interpolating between the two
//! keyframes that bracket it.
//!
//! Keyframes are kept in insertion order. Callers add them in ascending
//! value order; the mapper does not sort.
//!
//! # Out-of-range input
//!
//! Values below the first keyframe evaluate to the first keyframe's color
//! and values above the last keyframe evaluate to the last keyframe's color.
//! A mapper with a single keyframe always returns that keyframe's color; an
//! empty mapper returns [`Color::default`].
//!
//! # Example
//!
//! ```rust
//! use neuro_core::{Color, ColorMapper, ColorMapping};
//!
//! let mapper = ColorMapper::with_mapping(ColorMapping::Greyscale);
//! assert_eq!(mapper.calc_color(0.0), Color::BLACK);
//! assert_eq!(mapper.calc_color(1.0), Color::WHITE);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::color::Color;
use crate::math::{clamp, linear_interpolate};

/// Built-in gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMapping {
    /// Green, yellow, red.
    #[default]
    Rainbow,
    /// Blue, pink, red.
    BluePinkRed,
    /// Black to white.
    Greyscale,
    /// Black, orange, white.
    BlackBodyRadiation,
    /// Green to red.
    IsoluminantGreenRed,
    /// Blue to red.
    IsoluminantBlueRed,
    /// Blue, green, yellow, red.
    RedYellowGreenBlue,
}

impl ColorMapping {
    /// All presets in display order.
    pub const ALL: [ColorMapping; 7] = [
        ColorMapping::Rainbow,
        ColorMapping::BluePinkRed,
        ColorMapping::Greyscale,
        ColorMapping::BlackBodyRadiation,
        ColorMapping::IsoluminantGreenRed,
        ColorMapping::IsoluminantBlueRed,
        ColorMapping::RedYellowGreenBlue,
    ];

    /// Display name of the preset.
    pub fn name(self) -> &'static str {
        match self {
            ColorMapping::Rainbow => "Rainbow",
            ColorMapping::BluePinkRed => "Blue-Pink-Red",
            ColorMapping::Greyscale => "Grey-Scale",
            ColorMapping::BlackBodyRadiation => "Black-Body-Radiation",
            ColorMapping::IsoluminantGreenRed => "Isoluminant Green-Red",
            ColorMapping::IsoluminantBlueRed => "Isoluminant Blue-Red",
            ColorMapping::RedYellowGreenBlue => "Red-Yellow-Green-Blue",
        }
    }

    /// Looks a preset up by its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name().eq_ignore_ascii_case(name))
    }

    fn keyframes(self) -> &'static [(f32, f32, f32, f64)] {
        match self {
            ColorMapping::Rainbow => &[(0.0, 1.0, 0.0, 0.0), (1.0, 1.0, 0.0, 0.5), (1.0, 0.0, 0.0, 1.0)],
            ColorMapping::BluePinkRed => &[(0.0, 0.0, 1.0, 0.0), (1.0, 0.0, 1.0, 0.5), (1.0, 0.0, 0.0, 1.0)],
            ColorMapping::Greyscale => &[(0.0, 0.0, 0.0, 0.0), (1.0, 1.0, 1.0, 1.0)],
            ColorMapping::BlackBodyRadiation => {
                &[(0.0, 0.0, 0.0, 0.0), (1.0, 0.5, 0.0, 0.5), (1.0, 1.0, 1.0, 1.0)]
            }
            ColorMapping::IsoluminantGreenRed => &[(0.0, 1.0, 0.0, 0.0), (1.0, 0.0, 0.0, 1.0)],
            ColorMapping::IsoluminantBlueRed => &[(0.0, 0.0, 1.0, 0.0), (1.0, 0.0, 0.0, 1.0)],
            ColorMapping::RedYellowGreenBlue => &[
                (0.0, 0.0, 1.0, 0.0),
                (0.0, 1.0, 0.5, 0.33),
                (1.0, 1.0, 0.0, 0.66),
                (1.0, 0.0, 0.0, 1.0),
            ],
        }
    }
}

impl core::fmt::Display for ColorMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A `(value, color)` anchor in a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Normalized position in `[0, 1]`.
    pub value: f64,
    /// Color at `value`.
    pub color: Color,
}

/// Gradient built from keyframes.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    keyframes: Vec<Keyframe>,
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::with_mapping(ColorMapping::default())
    }
}

impl ColorMapper {
    /// Creates an empty mapper.
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }

    /// Creates a mapper populated with `mapping`.
    pub fn with_mapping(mapping: ColorMapping) -> Self {
        let mut mapper = Self::new();
        mapper.set_color_mapping(mapping);
        mapper
    }

    /// Appends a keyframe. `value` is clamped to `[0, 1]`.
    pub fn add(&mut self, color: Color, value: f64) {
        self.keyframes.push(Keyframe {
            value: clamp(value, 0.0, 1.0),
            color,
        });
    }

    /// Removes every keyframe.
    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Replaces the keyframes with the preset's.
    pub fn set_color_mapping(&mut self, mapping: ColorMapping) {
        self.clear();
        for &(r, g, b, value) in mapping.keyframes() {
            self.add(Color::rgb(r, g, b), value);
        }
    }

    /// Keyframes in insertion order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the mapper has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Evaluates the gradient at `value`.
    pub fn calc_color(&self, value: f64) -> Color {
        match self.keyframes.as_slice() {
            [] => {
                #[cfg(feature = "tracing")]
                tracing::trace!("color_mapper: no keyframes, using default color");
                Color::default()
            }
            [only] => only.color,
            [a, b] => linear_interpolate(a.color, b.color, clamp(value, 0.0, 1.0)),
            [first, .., last] => {
                if value <= first.value {
                    return first.color;
                }
                for pair in self.keyframes.windows(2) {
                    let (lower, upper) = (&pair[0], &pair[1]);
                    if upper.value >= value {
                        let width = upper.value - lower.value;
                        if width <= 0.0 {
                            return upper.color;
                        }
                        let t = (value - lower.value) / width;
                        return linear_interpolate(lower.color, upper.color, t);
                    }
                }
                last.color
            }
        }
    }
}
