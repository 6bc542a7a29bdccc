//! Neuro Analysis - spectral processing for neurofeedback graphs
//!
//! - [`fft`] - Hop-based FFT channel processor producing [`Spectrum`](neuro_core::Spectrum) streams
//!
//! The transform is backed by `rustfft`; settings, windows and the spectrum
//! type live in `neuro-core` so that graph code can route spectra without
//! depending on this crate.
//!
//! ## Example
//!
//! ```rust
//! use neuro_analysis::FftProcessor;
//! use neuro_core::{Channel, ChannelProcessor, FftSettings, Window};
//!
//! let mut eeg = Channel::<f64>::new(0);
//! eeg.set_sample_rate(64.0);
//!
//! let settings = FftSettings { order: 6, window: Window::Rectangular, shift: 0, zero_padding: false };
//! let mut fft = FftProcessor::new(settings);
//! let mut spectra = [Channel::new(0)];
//! assert!(fft.reinit(&[Some(&eeg)], &mut spectra));
//! assert_eq!(spectra[0].sample_rate(), 1.0);
//! ```

pub mod fft;

pub use fft::FftProcessor;
