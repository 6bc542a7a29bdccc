//! Time-stamped sample streams.
//!
//! A [`Channel`] is the single-writer buffer a node output produces into.
//! Samples are addressed by a logical index that counts up forever; the
//! backing storage either grows without bound (`buffer_size == 0`) or is a
//! ring of `buffer_size` slots where the physical slot is
//! `index % buffer_size`.
//!
//! # Timing
//!
//! With a sample rate `r > 0` and a start time `t0`, sample `i` is stamped at
//! `t0 + (i + 1) / r`. There is no sample at `t0` itself. Channels with
//! `r == 0` are event based; all time queries return `0.0` for them.
//!
//! | query                   | value                        |
//! |-------------------------|------------------------------|
//! | `sample_time(i)`        | `t0 + (i + 1) / r`           |
//! | `duration()`            | `counter / r`                |
//! | `last_sample_time()`    | `t0 + counter / r`           |
//! | `find_index_by_time(t)` | `(t - t0) * r - 1`           |
//!
//! # Example
//!
//! ```rust
//! use neuro_core::Channel;
//!
//! let mut channel = Channel::<f64>::new(4);
//! channel.set_sample_rate(2.0);
//! for i in 0..6 {
//!     channel.add_sample(f64::from(i));
//! }
//! assert_eq!(channel.sample_counter(), 6);
//! assert_eq!(channel.num_samples(), 4);
//! assert_eq!(channel.sample(1), None);
//! assert_eq!(channel.sample(5), Some(&5.0));
//! assert_eq!(channel.sample_time(3), 2.0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::color::Color;
use crate::math::clamp;
use libm::fabs;

/// Seconds without a new sample after which a channel counts as inactive.
pub const ACTIVITY_TIMEOUT: f64 = 2.0;

const INACTIVE_AGE: f64 = 100.0;

/// A typed, time-stamped, append-only sample stream.
#[derive(Debug, Clone)]
pub struct Channel<T> {
    name: String,
    unit: String,
    color: Color,
    samples: Vec<T>,
    buffer_size: usize,
    num_samples: usize,
    num_new_samples: usize,
    sample_counter: u64,
    sample_rate: f64,
    start_time: f64,
    latency: f64,
    time_since_last_add: f64,
    generation: u32,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> Channel<T> {
    /// Creates an empty channel. `buffer_size == 0` makes it grow without bound.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            name: String::new(),
            unit: String::new(),
            color: Color::WHITE,
            samples: Vec::new(),
            buffer_size,
            num_samples: 0,
            num_new_samples: 0,
            sample_counter: 0,
            sample_rate: 0.0,
            start_time: 0.0,
            latency: 0.0,
            time_since_last_add: INACTIVE_AGE,
            generation: 0,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Unit label, e.g. `"uV"`.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Sets the unit label.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
    }

    /// Display color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the display color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Picks a distinct display color from the golden-ratio hue sequence.
    pub fn set_color_by_id(&mut self, index: u32) {
        self.color = Color::unique(index);
    }

    /// Samples per second; `0.0` for event-based streams.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Sets the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    /// Whether samples arrive at a constant rate.
    pub fn has_fixed_rate(&self) -> bool {
        self.sample_rate > 0.0
    }

    /// Time offset of the stream in seconds.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Sets the time offset of the stream.
    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    /// Ring capacity, `0` for a growing channel.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether storage is a fixed-size ring.
    pub fn is_buffer(&self) -> bool {
        self.buffer_size > 0
    }

    /// Changes the ring capacity. All samples are discarded.
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size;
        self.clear();
    }

    /// Total number of samples ever added.
    pub fn sample_counter(&self) -> u64 {
        self.sample_counter
    }

    /// Number of samples currently retrievable.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Samples added since the last [`begin_add_samples`](Self::begin_add_samples).
    pub fn num_new_samples(&self) -> usize {
        self.num_new_samples
    }

    /// Whether no sample is retrievable.
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    /// Bumped by every [`clear`](Self::clear); readers compare it to detect resets.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Marks the start of a producer's batch.
    pub fn begin_add_samples(&mut self) {
        self.num_new_samples = 0;
    }

    /// Appends a sample and marks the channel active.
    pub fn add_sample(&mut self, value: T) {
        if self.buffer_size > 0 && self.samples.len() >= self.buffer_size {
            let slot = self.physical_index(self.sample_counter);
            self.samples[slot] = value;
        } else {
            self.samples.push(value);
        }

        self.sample_counter += 1;
        self.num_new_samples += 1;
        if self.buffer_size == 0 || self.num_samples < self.buffer_size {
            self.num_samples += 1;
        }
        self.time_since_last_add = 0.0;
    }

    fn physical_index(&self, index: u64) -> usize {
        if self.buffer_size > 0 {
            (index % self.buffer_size as u64) as usize
        } else {
            index as usize
        }
    }

    /// Oldest retrievable index, `None` when empty.
    pub fn min_sample_index(&self) -> Option<u64> {
        (self.num_samples > 0).then(|| self.sample_counter - self.num_samples as u64)
    }

    /// Newest index, `None` when empty.
    pub fn max_sample_index(&self) -> Option<u64> {
        (self.num_samples > 0).then(|| self.sample_counter - 1)
    }

    /// Whether `index` still lives in storage.
    pub fn is_valid_index(&self, index: u64) -> bool {
        match (self.min_sample_index(), self.max_sample_index()) {
            (Some(min), Some(max)) => index >= min && index <= max,
            _ => false,
        }
    }

    /// Sample at a logical index, `None` if it was never added or was overwritten.
    pub fn sample(&self, index: u64) -> Option<&T> {
        if !self.is_valid_index(index) {
            return None;
        }
        self.samples.get(self.physical_index(index))
    }

    /// Newest sample.
    pub fn last_sample(&self) -> Option<&T> {
        self.max_sample_index().and_then(|i| self.sample(i))
    }

    /// Iterates the retrievable samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = self.min_sample_index().unwrap_or(0);
        (start..self.sample_counter).filter_map(move |i| self.sample(i))
    }

    /// Timestamp of sample `index`.
    pub fn sample_time(&self, index: u64) -> f64 {
        if self.sample_rate == 0.0 {
            return 0.0;
        }
        self.start_time + (index + 1) as f64 / self.sample_rate
    }

    /// Length of the stream in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0.0 {
            return 0.0;
        }
        self.sample_counter as f64 / self.sample_rate
    }

    /// Timestamp of the newest sample.
    pub fn last_sample_time(&self) -> f64 {
        if self.sample_rate == 0.0 {
            return 0.0;
        }
        self.start_time + self.sample_counter as f64 / self.sample_rate
    }

    /// Index of the sample stamped at or just before `time`.
    ///
    /// With `round_to_closest` the fractional index is rounded instead of
    /// truncated. Returns `None` before the start time or past the end.
    pub fn find_index_by_time(&self, time: f64, round_to_closest: bool) -> Option<u64> {
        if time < self.start_time {
            return None;
        }
        let float_index = (time - self.start_time) * self.sample_rate - 1.0;
        if !(0.0..=self.sample_counter as f64).contains(&float_index) {
            return None;
        }
        let index = if round_to_closest {
            float_index + 0.5
        } else {
            float_index
        };
        Some(index as u64)
    }

    /// Smoothed transport latency in seconds.
    pub fn latency(&self) -> f64 {
        self.latency
    }

    /// Folds the distance between `elapsed` and the newest timestamp into the latency average.
    pub fn update_latency(&mut self, elapsed: f64) {
        if self.is_empty() {
            return;
        }
        let current = fabs(elapsed - self.last_sample_time());
        self.latency = if self.latency == 0.0 {
            current
        } else {
            (self.latency * 5.0 + current) / 6.0
        };
    }

    /// Ages the activity timer by `delta` seconds.
    pub fn update_activity(&mut self, delta: f64) {
        self.time_since_last_add += delta;
    }

    /// Whether a sample was added within [`ACTIVITY_TIMEOUT`].
    pub fn is_active(&self) -> bool {
        self.time_since_last_add <= ACTIVITY_TIMEOUT
    }

    /// Drops the newest sample. Storage is not released.
    pub fn remove_last_sample(&mut self) {
        if self.num_samples == 0 || self.sample_counter == 0 {
            return;
        }
        if self.samples.len() as u64 == self.sample_counter {
            self.samples.pop();
        }
        self.num_samples -= 1;
        self.sample_counter -= 1;
        self.num_new_samples = self.num_new_samples.saturating_sub(1);
    }

    /// Discards every sample and marks the channel inactive.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.num_samples = 0;
        self.num_new_samples = 0;
        self.sample_counter = 0;
        self.time_since_last_add = INACTIVE_AGE;
        self.generation = self.generation.wrapping_add(1);
    }

    /// [`clear`](Self::clear) plus latency and start time.
    pub fn reset(&mut self) {
        self.clear();
        self.latency = 0.0;
        self.start_time = 0.0;
    }
}

impl Channel<f64> {
    /// Smallest and largest retrievable value, `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Newest value clamped to `[lo, hi]`, or `fallback` when empty.
    pub fn last_value_clamped(&self, lo: f64, hi: f64, fallback: f64) -> f64 {
        self.last_sample().map_or(fallback, |&v| clamp(v, lo, hi))
    }
}
