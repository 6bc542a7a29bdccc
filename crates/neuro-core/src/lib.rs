//! Neuro Core - sample streams and processors for neurofeedback graphs
//!
//! This crate provides the data model every node in a neurofeedback signal
//! graph works with: time-stamped sample channels, per-consumer read cursors,
//! the small DSP units that transform channels, and the color utilities used
//! both for theming and for feedback output.
//!
//! # Core Abstractions
//!
//! ## Sample Streams
//!
//! - [`Channel`] - Typed, time-stamped, append-only stream with optional ring storage
//! - [`ChannelReader`] - Per-consumer cursor tracking unconsumed samples
//! - [`Clock`] - Fixed-frequency tick source for clocked outputs
//!
//! ## Channel Processors
//!
//! - [`ChannelProcessor`] - Shared `setup` / `reinit` / `update` contract
//! - [`DelayProcessor`] - Fixed sample delay with zero fill
//! - [`FreezeProcessor`] - Capture and hold after N samples
//! - [`SmoothProcessor`] - One-pole exponential smoothing
//! - [`RemapProcessor`] - Range remap with modulated bounds
//! - [`ColorWheelProcessor`] - HSV streams to R, G, B streams
//!
//! ## Spectral Types
//!
//! - [`FftSettings`] - Order, window, hop and padding of a spectral transform
//! - [`Window`] - Window functions
//! - [`Spectrum`] - One magnitude spectrum sample
//!
//! ## Configuration
//!
//! - [`AttributeSet`] / [`Attribute`] - Named, typed, bounded node settings
//!
//! ## Color
//!
//! - [`Color`] - RGBA float color with HSV and hex conversion
//! - [`ColorMapper`] - Piecewise-linear gradients with built-in [`ColorMapping`] presets
//!
//! ## Utilities
//!
//! - Remapping: [`remap_range`], [`clamped_remap_range`]
//! - Interpolation: [`linear_interpolate`], [`cosine_interpolate`], [`ease_in_out_interpolate`]
//! - Axis helpers: [`nice_number_floor`], [`nice_number_ceil`], [`next_power_of_two`]
//!
//! # no_std Support
//!
//! The crate builds without `std` (it still needs `alloc`). Disable the
//! default feature:
//!
//! ```toml
//! [dependencies]
//! neuro-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use neuro_core::{Channel, ChannelProcessor, SmoothProcessor, SmoothSettings};
//!
//! let mut input = Channel::<f64>::new(0);
//! input.set_sample_rate(1.0);
//!
//! let mut smooth = SmoothProcessor::new(SmoothSettings { speed: 0.5, start_value: 0.0 });
//! let mut output = [Channel::new(0)];
//! assert!(smooth.reinit(&[Some(&input)], &mut output));
//!
//! input.add_sample(1.0);
//! smooth.update(&[Some(&input)], &mut output);
//! assert_eq!(output[0].last_sample(), Some(&0.5));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod attribute;
pub mod channel;
pub mod clock;
pub mod color;
pub mod color_mapper;
pub mod fft;
pub mod math;
pub mod processor;
pub mod reader;

// Re-export main types at crate root
pub use attribute::{Attribute, AttributeError, AttributeSet, AttributeValue};
pub use channel::{ACTIVITY_TIMEOUT, Channel};
pub use clock::Clock;
pub use color::{Color, extract_alpha, extract_blue, extract_green, extract_red, rgba};
pub use color_mapper::{ColorMapper, ColorMapping, Keyframe};
pub use fft::{FftSettings, MAX_FFT_ORDER, MIN_FFT_ORDER, Spectrum, Window};
pub use math::{
    EPSILON, Interpolate, clamp, clamped_remap_range, cosine_interpolate, cosine_weight,
    ease_in_out_interpolate, in_range, is_close, linear_interpolate, next_power_of_two,
    nice_number_ceil, nice_number_floor, remap_range, sample_ease_in_out_curve,
};
pub use processor::{
    ChannelProcessor, ColorWheelProcessor, DelayProcessor, DelaySettings, FreezeProcessor,
    FreezeSettings, Inputs, RemapProcessor, RemapSettings, SmoothProcessor, SmoothSettings,
};
pub use reader::{ChannelReader, InputChanges};
