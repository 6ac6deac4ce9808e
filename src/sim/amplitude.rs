//! Microphone amplitude sampling
//!
//! Turns a block of 16-bit PCM into a decibel-like level, then into the
//! coral opacity band and the background darkness overlay.

/// Mean-square floor applied before the logarithm
pub const MIN_MEAN_SQUARE: f64 = 1e-10;

/// Level reported for silent (or empty) blocks: `10 * log10(MIN_MEAN_SQUARE)`
pub const SILENCE_FLOOR_DB: f32 = -100.0;

/// Upper bounds (exclusive) of the first four opacity bands
pub const OPACITY_THRESHOLDS: [f32; 4] = [55.0, 65.0, 75.0, 85.0];

/// Opacity for each band, quietest first
pub const OPACITY_BANDS: [u8; 5] = [0, 100, 150, 200, 250];

/// Mean squared amplitude of a sample block (0 for an empty block)
pub fn mean_square(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let s = s as f64;
            s * s
        })
        .sum();
    sum / samples.len() as f64
}

/// Sound level of a block: `10 * log10(mean_square)`, floored at silence
pub fn sound_level(samples: &[i16]) -> f32 {
    level_from_mean_square(mean_square(samples))
}

/// Level for an already-computed mean square
pub fn level_from_mean_square(mean_square: f64) -> f32 {
    let ms = if mean_square.is_finite() {
        mean_square.max(MIN_MEAN_SQUARE)
    } else {
        MIN_MEAN_SQUARE
    };
    (10.0 * ms.log10()) as f32
}

/// Quantize a level into one of the five coral opacity bands
pub fn opacity_for_level(level: f32) -> u8 {
    if !level.is_finite() {
        return OPACITY_BANDS[0];
    }
    let band = OPACITY_THRESHOLDS
        .iter()
        .position(|&upper| level < upper)
        .unwrap_or(OPACITY_THRESHOLDS.len());
    OPACITY_BANDS[band]
}

/// Background overlay alpha: loud rooms light the sea up, silence darkens it
pub fn darkness_for_level(level: f32) -> u8 {
    let db = if level.is_finite() {
        level.round().max(0.0) as f64
    } else {
        0.0
    };
    (255.0 * (1.0 - db / 100.0)).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_silence_hits_floor() {
        let level = sound_level(&[0; 1024]);
        assert!(level.is_finite());
        assert_eq!(level, SILENCE_FLOOR_DB);
        assert_eq!(sound_level(&[]), SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_known_level() {
        // Constant amplitude 1000 -> mean square 1e6 -> 60 dB
        let level = sound_level(&[1000; 256]);
        assert!((level - 60.0).abs() < 1e-4);
        // Sign does not matter
        let level = sound_level(&[-1000, 1000, -1000, 1000]);
        assert!((level - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_extreme_samples_do_not_overflow() {
        let level = sound_level(&[i16::MIN; 4096]);
        assert!(level.is_finite());
        assert!(level > 90.0);
    }

    #[test]
    fn test_opacity_reference_points() {
        assert_eq!(opacity_for_level(60.0), 100);
        assert_eq!(opacity_for_level(90.0), 250);
        assert_eq!(opacity_for_level(10.0), 0);
        assert_eq!(opacity_for_level(55.0), 100);
        assert_eq!(opacity_for_level(84.99), 200);
        assert_eq!(opacity_for_level(SILENCE_FLOOR_DB), 0);
        assert_eq!(opacity_for_level(f32::NAN), 0);
    }

    #[test]
    fn test_darkness() {
        assert_eq!(darkness_for_level(0.0), 255);
        assert_eq!(darkness_for_level(SILENCE_FLOOR_DB), 255);
        assert_eq!(darkness_for_level(50.0), 127);
        assert_eq!(darkness_for_level(120.0), 0);
    }

    proptest! {
        #[test]
        fn prop_nonzero_block_is_finite(samples in prop::collection::vec(any::<i16>(), 1..512)) {
            prop_assume!(samples.iter().any(|&s| s != 0));
            let level = sound_level(&samples);
            prop_assert!(level.is_finite());
            prop_assert!(level > SILENCE_FLOOR_DB);
        }

        #[test]
        fn prop_level_monotonic_in_mean_square(a in 1.0f64..1.1e9, b in 1.0f64..1.1e9) {
            prop_assume!((a - b).abs() > a.max(b) * 1e-3);
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assert!(level_from_mean_square(lo) < level_from_mean_square(hi));
        }

        #[test]
        fn prop_opacity_is_a_band(level in -200.0f32..200.0) {
            prop_assert!(OPACITY_BANDS.contains(&opacity_for_level(level)));
        }
    }
}
