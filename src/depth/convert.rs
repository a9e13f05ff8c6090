use rayon::prelude::*;

use crate::error::UnpackError;
use crate::shared::constants::MAX_DISTANCE_M;

/// Largest depth the millimeter encoding stores, in meters.
const MAX_MILLIMETER_M: f32 = 65.535;

/// Fixed-point storage policy for 16-bit depth images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthEncoding {
    /// `0..=MAX_DISTANCE_M` meters spread over the full u16 range. Farther samples clamp.
    Normalized16,
    /// Whole millimeters. Samples past 65.535 m are an error.
    Millimeter16,
}

/// Full-scale value of the normalized encoding. 1.0 lands on 65536, which saturates to `u16::MAX`.
const NORMALIZED_SCALE: f32 = 65536.0;

pub fn normalized_sample(meters: f32) -> u16 {
    if meters.is_nan() {
        return 0;
    }
    let v = (meters / MAX_DISTANCE_M).clamp(0.0, 1.0);
    (NORMALIZED_SCALE * v).round().min(u16::MAX as f32) as u16
}

/// Truncating meters to millimeters. NaN and negative samples carry no depth and map to 0.
pub fn millimeter_sample(meters: f32) -> Option<u16> {
    if meters.is_nan() || meters <= 0.0 {
        return Some(0);
    }
    if meters > MAX_MILLIMETER_M {
        return None;
    }
    Some((meters * 1000.0).trunc().min(u16::MAX as f32) as u16)
}

/// Convert a whole depth grid into a freshly allocated buffer of the same length.
pub fn convert(samples: &[f32], encoding: DepthEncoding) -> Result<Vec<u16>, UnpackError> {
    match encoding {
        DepthEncoding::Normalized16 => {
            Ok(samples.par_iter().map(|&m| normalized_sample(m)).collect())
        }
        DepthEncoding::Millimeter16 => samples
            .par_iter()
            .enumerate()
            .map(|(index, &meters)| {
                millimeter_sample(meters).ok_or(UnpackError::Overflow { index, meters })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_endpoints() {
        assert_eq!(normalized_sample(0.0), 0);
        assert_eq!(normalized_sample(-3.0), 0);
        assert_eq!(normalized_sample(5.0), 32768);
        assert_eq!(normalized_sample(10.0), u16::MAX);
        assert_eq!(normalized_sample(250.0), u16::MAX);
        assert_eq!(normalized_sample(f32::INFINITY), u16::MAX);
        assert_eq!(normalized_sample(f32::NAN), 0);
    }

    #[test]
    fn test_normalized_is_monotonic() {
        let mut prev = 0u16;
        let mut meters = -1.0f32;
        while meters < 12.0 {
            let stored = normalized_sample(meters);
            assert!(stored >= prev, "{} m went backwards ({} < {})", meters, stored, prev);
            prev = stored;
            meters += 0.0137;
        }
    }

    #[test]
    fn test_millimeter_within_one_mm() {
        let mut meters = 0.0f32;
        while meters <= 65.5 {
            let stored = millimeter_sample(meters).expect("in range") as f32;
            let back = stored / 1000.0;
            assert!((back - meters).abs() <= 0.001 + 1e-5, "{} m -> {}", meters, stored);
            meters += 0.2371;
        }
        assert_eq!(millimeter_sample(65.535), Some(65535));
        assert_eq!(millimeter_sample(1.2345), Some(1234));
    }

    #[test]
    fn test_millimeter_overflow_is_reported() {
        assert_eq!(millimeter_sample(65.6), None);
        assert_eq!(millimeter_sample(65.5351), None);
        assert_eq!(millimeter_sample(65.5359), None);
        assert_eq!(millimeter_sample(f32::INFINITY), None);
        assert_eq!(millimeter_sample(-1.0), Some(0));

        let mut samples = vec![1.0f32; 32];
        samples[17] = 80.0;
        match convert(&samples, DepthEncoding::Millimeter16) {
            Err(UnpackError::Overflow { index, meters }) => {
                assert_eq!(index, 17);
                assert_eq!(meters, 80.0);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_keeps_grid_size() {
        let samples: Vec<f32> = (0..640).map(|i| i as f32 / 100.0).collect();
        let out = convert(&samples, DepthEncoding::Normalized16).unwrap();
        assert_eq!(out.len(), samples.len());
        assert_eq!(out[0], 0);
        assert_eq!(out[500], 32768);

        let mm = convert(&samples, DepthEncoding::Millimeter16).unwrap();
        assert_eq!(mm.len(), samples.len());
        assert_eq!(mm[250], 2500);
    }
}
