//! Spectral analysis types shared by the FFT processor and its consumers.
//!
//! - [`FftSettings`] - transform size, window, hop and padding
//! - [`Window`] - tapering functions applied to each input epoch
//! - [`Spectrum`] - magnitude bins from DC up to the Nyquist frequency
//!
//! The transform itself lives in `neuro-analysis`, which pulls in `rustfft`;
//! these types stay allocation-light and `no_std` compatible so that graph
//! code can route spectra without depending on the FFT backend.
//!
//! # Window Functions
//!
//! All windows are the symmetric forms over `n` samples, evaluated at
//! sample index `i` with `x = i / (n - 1)`:
//!
//! | window           | formula                                             |
//! |------------------|-----------------------------------------------------|
//! | Rectangular      | `1`                                                 |
//! | Triangular       | `1 - |(i - (n-1)/2) / ((n+1)/2)|`                   |
//! | Welch            | `1 - ((i - (n-1)/2) / ((n+1)/2))^2`                 |
//! | Hann             | `0.5 - 0.5 cos(2 pi x)`                             |
//! | Hamming          | `0.53836 - 0.46164 cos(2 pi x)`                     |
//! | Blackman         | exact Blackman coefficients                         |
//! | Nuttall          | 4-term cosine sum                                   |
//! | Blackman-Nuttall | 4-term cosine sum                                   |
//! | Blackman-Harris  | 4-term cosine sum                                   |
//! | Flat top         | 5-term cosine sum                                   |
//! | Cosine           | `sin(pi x)`                                         |

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;
use libm::{cos, fabs, sin};

/// Smallest supported FFT order.
pub const MIN_FFT_ORDER: u32 = 2;
/// Largest supported FFT order.
pub const MAX_FFT_ORDER: u32 = 20;

/// Epoch tapering function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Window {
    /// No tapering.
    Rectangular,
    /// Bartlett-style triangle.
    Triangular,
    /// Parabolic.
    Welch,
    /// Raised cosine.
    #[default]
    Hann,
    /// Optimal-sidelobe raised cosine.
    Hamming,
    /// Exact Blackman.
    Blackman,
    /// Nuttall, continuous first derivative.
    Nuttall,
    /// Blackman-Nuttall.
    BlackmanNuttall,
    /// Blackman-Harris.
    BlackmanHarris,
    /// Flat top, for amplitude accuracy.
    FlatTop,
    /// Sine.
    Cosine,
}

impl Window {
    /// Every window in display order.
    pub const ALL: [Window; 11] = [
        Window::Rectangular,
        Window::Triangular,
        Window::Welch,
        Window::Hann,
        Window::Hamming,
        Window::Blackman,
        Window::Nuttall,
        Window::BlackmanNuttall,
        Window::BlackmanHarris,
        Window::FlatTop,
        Window::Cosine,
    ];

    /// Display names, index-aligned with [`ALL`](Self::ALL).
    pub const NAMES: [&'static str; 11] = [
        "Rectangular",
        "Triangular",
        "Welch",
        "Hann",
        "Hamming",
        "Blackman",
        "Nuttall",
        "Blackman-Nuttall",
        "Blackman-Harris",
        "Flat top",
        "Cosine",
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Position in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Window at position `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Weight of sample `index` in a window of `len` samples. Zero outside the window.
    pub fn coefficient(self, index: usize, len: usize) -> f64 {
        if index >= len {
            return 0.0;
        }
        if len == 1 {
            return 1.0;
        }

        let i = index as f64;
        let n = len as f64;
        let x = i / (n - 1.0);
        let cosine_sum = |a: &[f64]| {
            a.iter().enumerate().fold(0.0, |acc, (k, &ak)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                acc + sign * ak * cos(2.0 * PI * k as f64 * x)
            })
        };

        match self {
            Window::Rectangular => 1.0,
            Window::Triangular => 1.0 - fabs((i - (n - 1.0) * 0.5) / ((n + 1.0) * 0.5)),
            Window::Welch => {
                let f = (i - (n - 1.0) * 0.5) / ((n + 1.0) * 0.5);
                1.0 - f * f
            }
            Window::Hann => cosine_sum(&[0.5, 0.5]),
            Window::Hamming => cosine_sum(&[0.53836, 0.46164]),
            Window::Blackman => cosine_sum(&[0.42659, 0.49656, 0.076849]),
            Window::Nuttall => cosine_sum(&[0.355768, 0.487396, 0.144232, 0.012604]),
            Window::BlackmanNuttall => cosine_sum(&[0.3635819, 0.4891775, 0.1365995, 0.0106411]),
            Window::BlackmanHarris => cosine_sum(&[0.35875, 0.48829, 0.14128, 0.01168]),
            Window::FlatTop => cosine_sum(&[1.0, 1.93, 1.29, 0.388, 0.028]),
            Window::Cosine => sin(PI * x),
        }
    }

    /// Multiplies `buffer` by the window in place.
    pub fn apply(self, buffer: &mut [f64]) {
        if self == Window::Rectangular {
            return;
        }
        let len = buffer.len();
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.coefficient(i, len);
        }
    }

    /// Window weights for `len` samples.
    pub fn coefficients(self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.coefficient(i, len)).collect()
    }
}

impl core::fmt::Display for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// FFT node parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftSettings {
    /// Transform size exponent, `2^order` samples.
    pub order: u32,
    /// Epoch tapering.
    pub window: Window,
    /// Hop between epochs in samples. `0` means non-overlapping epochs.
    pub shift: u32,
    /// Transform incomplete epochs with zeros in place of missing samples.
    pub zero_padding: bool,
}

impl Default for FftSettings {
    fn default() -> Self {
        Self {
            order: 8,
            window: Window::Hann,
            shift: 32,
            zero_padding: false,
        }
    }
}

impl FftSettings {
    /// Samples per transform.
    pub fn num_fft_samples(&self) -> usize {
        1usize << self.order.clamp(1, MAX_FFT_ORDER)
    }

    /// Bins per spectrum, DC through Nyquist.
    pub fn num_bins(&self) -> usize {
        self.num_fft_samples() / 2 + 1
    }

    /// Hop in samples, resolving `0` to the epoch length.
    pub fn effective_shift(&self) -> usize {
        match self.shift {
            0 => self.num_fft_samples(),
            s => s as usize,
        }
    }

    /// Output spectra per second for a given input rate.
    pub fn output_sample_rate(&self, input_rate: f64) -> f64 {
        input_rate / self.effective_shift() as f64
    }
}

/// Magnitude spectrum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    /// Frequency of the last bin, usually half the input rate.
    pub max_frequency: f64,
    /// Bin magnitudes, DC first.
    pub bins: Vec<f64>,
    /// Timestamp of the epoch the spectrum was computed from.
    pub time: f64,
}

impl Spectrum {
    /// Zeroed spectrum with `num_bins` bins.
    pub fn new(max_frequency: f64, num_bins: usize) -> Self {
        Self {
            max_frequency,
            bins: core::iter::repeat_n(0.0, num_bins).collect(),
            time: 0.0,
        }
    }

    /// Number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Magnitude of bin `index`, zero when out of range.
    pub fn bin(&self, index: usize) -> f64 {
        self.bins.get(index).copied().unwrap_or(0.0)
    }

    /// Center frequency of bin `index`.
    pub fn frequency(&self, index: usize) -> f64 {
        match self.bins.len() {
            0 => 0.0,
            1 => self.max_frequency,
            n => index as f64 / (n - 1) as f64 * self.max_frequency,
        }
    }

    /// Bin whose center frequency is closest below `frequency`.
    pub fn bin_index(&self, frequency: f64) -> usize {
        let last = self.bins.len().saturating_sub(1);
        if frequency <= 0.0 || self.max_frequency <= 0.0 {
            return 0;
        }
        if frequency >= self.max_frequency {
            return last;
        }
        (frequency / self.max_frequency * last as f64) as usize
    }

    /// Frequency of the strongest non-DC bin within `[min, max]` Hz.
    pub fn dominant_frequency(&self, min: f64, max: f64) -> Option<f64> {
        (1..self.bins.len())
            .filter(|&i| (min..=max).contains(&self.frequency(i)))
            .filter(|&i| self.bins[i] > 0.0)
            .max_by(|&a, &b| self.bins[a].total_cmp(&self.bins[b]))
            .map(|i| self.frequency(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FftSettings::default();
        assert_eq!(settings.num_fft_samples(), 256);
        assert_eq!(settings.num_bins(), 129);
        assert_eq!(settings.effective_shift(), 32);
        assert_eq!(settings.output_sample_rate(256.0), 8.0);
    }

    #[test]
    fn test_zero_shift_is_non_overlapping() {
        let settings = FftSettings {
            order: 4,
            shift: 0,
            ..FftSettings::default()
        };
        assert_eq!(settings.effective_shift(), 16);
    }

    #[test]
    fn test_zero_order_falls_back() {
        let settings = FftSettings {
            order: 0,
            ..FftSettings::default()
        };
        assert_eq!(settings.num_fft_samples(), 2);
    }

    #[test]
    fn test_window_names_align() {
        for (i, window) in Window::ALL.iter().enumerate() {
            assert_eq!(window.index(), i);
            assert_eq!(Window::from_index(i), Some(*window));
        }
        assert_eq!(Window::FlatTop.name(), "Flat top");
        assert_eq!(Window::from_index(11), None);
    }

    #[test]
    fn test_hann_endpoints_and_center() {
        let w = Window::Hann.coefficients(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_windows() {
        for window in Window::ALL {
            let w = window.coefficients(16);
            for i in 0..8 {
                assert!(
                    (w[i] - w[15 - i]).abs() < 1e-9,
                    "{window} asymmetric at {i}"
                );
            }
        }
    }

    #[test]
    fn test_out_of_window_is_zero() {
        assert_eq!(Window::Rectangular.coefficient(5, 5), 0.0);
        assert_eq!(Window::Hann.coefficient(0, 1), 1.0);
    }

    #[test]
    fn test_apply_rectangular_is_identity() {
        let mut buffer = [1.0, 2.0, 3.0];
        Window::Rectangular.apply(&mut buffer);
        assert_eq!(buffer, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_spectrum_frequencies() {
        let spectrum = Spectrum::new(64.0, 65);
        assert_eq!(spectrum.frequency(0), 0.0);
        assert_eq!(spectrum.frequency(64), 64.0);
        assert_eq!(spectrum.frequency(10), 10.0);
        assert_eq!(spectrum.bin_index(10.5), 10);
        assert_eq!(spectrum.bin_index(-1.0), 0);
        assert_eq!(spectrum.bin_index(100.0), 64);
    }

    #[test]
    fn test_dominant_frequency_skips_dc() {
        let mut spectrum = Spectrum::new(8.0, 9);
        spectrum.bins[0] = 100.0;
        spectrum.bins[3] = 2.0;
        spectrum.bins[6] = 5.0;
        assert_eq!(spectrum.dominant_frequency(0.0, 8.0), Some(6.0));
        assert_eq!(spectrum.dominant_frequency(0.0, 4.0), Some(3.0));
        assert_eq!(spectrum.dominant_frequency(7.0, 8.0), None);
        assert_eq!(spectrum.bin(99), 0.0);
    }
}
