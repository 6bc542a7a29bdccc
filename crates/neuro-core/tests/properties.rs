//! Property-based tests for neuro-core primitives.
//!
//! Tests remap endpoints and bounds, color packing and hex round-trips,
//! gradient equivalences and channel/processor invariants using proptest
//! for randomized input generation.

use neuro_core::{
    Channel, ChannelProcessor, Color, ColorMapper, DelayProcessor, DelaySettings, SmoothProcessor,
    SmoothSettings, clamped_remap_range, linear_interpolate, nice_number_ceil, nice_number_floor,
    remap_range,
};
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f64> {
    -1.0e6f64..1.0e6f64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The source interval's endpoints land exactly on the target endpoints.
    #[test]
    fn remap_maps_endpoints(
        from_min in finite(),
        width in 1.0e-3f64..1.0e3,
        to_min in finite(),
        to_max in finite(),
    ) {
        let from_max = from_min + width;
        let lo = remap_range(from_min, from_min, from_max, to_min, to_max);
        let hi = remap_range(from_max, from_min, from_max, to_min, to_max);
        prop_assert_eq!(lo, to_min);
        let tolerance = 1e-9 * (to_max.abs() + to_min.abs()).max(1.0);
        prop_assert!((hi - to_max).abs() <= tolerance, "hi={} to_max={}", hi, to_max);
    }

    /// A degenerate source interval always yields the lower target bound.
    #[test]
    fn remap_degenerate_range_yields_to_min(
        value in finite(),
        from in finite(),
        jitter in -1.0e-7f64..1.0e-7,
        to_min in finite(),
        to_max in finite(),
    ) {
        prop_assert_eq!(remap_range(value, from, from + jitter, to_min, to_max), to_min);
    }

    /// Clamped remapping never leaves the target interval, whatever its orientation.
    #[test]
    fn clamped_remap_stays_in_bounds(
        value in finite(),
        from_min in finite(),
        from_max in finite(),
        to_min in finite(),
        to_max in finite(),
    ) {
        let out = clamped_remap_range(value, from_min, from_max, to_min, to_max);
        prop_assert!(out >= to_min.min(to_max) && out <= to_min.max(to_max));
    }

    /// Unpacking and repacking a 32-bit color is lossless.
    #[test]
    fn packed_color_roundtrip(packed in any::<u32>()) {
        prop_assert_eq!(Color::from_u32(packed).to_u32(), packed);
    }

    /// Hex formatting and parsing agree to within one 8-bit step; alpha resets to one.
    #[test]
    fn hex_string_roundtrip(
        r in 0.0f32..=1.0,
        g in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
        a in 0.0f32..=1.0,
    ) {
        let color = Color::new(r, g, b, a);
        let parsed = Color::parse_hex(&color.to_hex_string());
        prop_assert!(parsed.is_some());
        let parsed = parsed.unwrap_or_default();
        prop_assert!((parsed.r - r).abs() <= 1.0 / 255.0 + 1e-6);
        prop_assert!((parsed.g - g).abs() <= 1.0 / 255.0 + 1e-6);
        prop_assert!((parsed.b - b).abs() <= 1.0 / 255.0 + 1e-6);
        prop_assert_eq!(parsed.a, 1.0);
    }

    /// Unique colors are reproducible.
    #[test]
    fn unique_color_is_deterministic(index in any::<u32>()) {
        prop_assert_eq!(Color::unique(index), Color::unique(index));
    }

    /// A two-keyframe gradient is a clamped linear blend.
    #[test]
    fn two_keyframe_mapper_is_linear_blend(
        t in -2.0f64..2.0,
        a in prop::array::uniform4(0.0f32..=1.0),
        b in prop::array::uniform4(0.0f32..=1.0),
    ) {
        let first = Color::new(a[0], a[1], a[2], a[3]);
        let second = Color::new(b[0], b[1], b[2], b[3]);
        let mut mapper = ColorMapper::new();
        mapper.add(first, 0.0);
        mapper.add(second, 1.0);
        prop_assert_eq!(
            mapper.calc_color(t),
            linear_interpolate(first, second, t.clamp(0.0, 1.0))
        );
    }

    /// Nice numbers bracket their input.
    #[test]
    fn nice_numbers_bracket_input(x in 1.0e-6f64..1.0e6) {
        prop_assert!(nice_number_floor(x) <= x * (1.0 + 1e-5));
        prop_assert!(nice_number_ceil(x) >= x * (1.0 - 1e-5));
    }

    /// A ring channel keeps exactly the newest `buffer_size` samples.
    #[test]
    fn ring_channel_keeps_newest(
        buffer_size in 1usize..64,
        count in 0usize..256,
    ) {
        let mut channel = Channel::<f64>::new(buffer_size);
        for i in 0..count {
            channel.add_sample(i as f64);
        }
        prop_assert_eq!(channel.num_samples(), count.min(buffer_size));
        let kept: Vec<f64> = channel.iter().copied().collect();
        let expected: Vec<f64> = (count.saturating_sub(buffer_size)..count)
            .map(|i| i as f64)
            .collect();
        prop_assert_eq!(kept, expected);
    }

    /// Delay emits one output per input and shifts the stream by the delay.
    #[test]
    fn delay_preserves_count_and_order(
        delay_samples in 0u32..16,
        values in prop::collection::vec(-100.0f64..100.0, 0..64),
    ) {
        let settings = DelaySettings { set_by_time: false, delay_seconds: 0.0, delay_samples };
        let mut delay = DelayProcessor::new(settings);
        let mut input = Channel::new(0);
        input.set_sample_rate(32.0);
        let mut output = [Channel::new(0)];
        prop_assert!(delay.reinit(&[Some(&input)], &mut output));

        for chunk in values.chunks(5) {
            input.begin_add_samples();
            for &v in chunk {
                input.add_sample(v);
            }
            delay.update(&[Some(&input)], &mut output);
        }

        let out: Vec<f64> = output[0].iter().copied().collect();
        prop_assert_eq!(out.len(), values.len());
        let d = delay_samples as usize;
        for (i, &y) in out.iter().enumerate() {
            let expected = if i < d { 0.0 } else { values[i - d] };
            prop_assert_eq!(y, expected);
        }
    }

    /// Smoothing stays within the hull of the start value and the inputs.
    #[test]
    fn smooth_stays_in_input_hull(
        speed in 0.0f64..1.0,
        rate in 1.0f64..512.0,
        values in prop::collection::vec(-10.0f64..10.0, 1..64),
    ) {
        let mut smooth = SmoothProcessor::new(SmoothSettings { speed, start_value: 0.0 });
        let mut input = Channel::new(0);
        input.set_sample_rate(rate);
        let mut output = [Channel::new(0)];
        smooth.reinit(&[Some(&input)], &mut output);
        input.begin_add_samples();
        for &v in &values {
            input.add_sample(v);
        }
        smooth.update(&[Some(&input)], &mut output);

        let lo = values.iter().copied().fold(0.0f64, f64::min) - 1e-9;
        let hi = values.iter().copied().fold(0.0f64, f64::max) + 1e-9;
        for &y in output[0].iter() {
            prop_assert!(y >= lo && y <= hi, "{} outside [{}, {}]", y, lo, hi);
        }
    }
}
