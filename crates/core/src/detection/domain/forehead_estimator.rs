//! Forehead tip estimation from face-mesh landmarks.
//!
//! The tip sits straight above the forehead anchor, offset by a fixed
//! fraction of the anchor-to-nose-bridge distance. All geometry happens in
//! normalized space; conversion to pixels is the final step.

use serde::Serialize;
use thiserror::Error;

use crate::detection::domain::face_landmarks::{FaceLandmarks, Landmark};
use crate::shared::constants::{
    COORDINATE_BOUND, FOREHEAD_ANCHOR_INDEX, FOREHEAD_HEIGHT_FACTOR, NOSE_BRIDGE_INDEX,
};

#[derive(Error, Debug, PartialEq)]
pub enum ForeheadError {
    #[error("insufficient landmarks: need at least {required}, got {actual}")]
    InsufficientLandmarks { required: usize, actual: usize },
    #[error("invalid forehead configuration: {0}")]
    InvalidConfig(String),
}

/// Pixel position of the forehead tip, clamped to `[0, bound]` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ForeheadTip {
    #[serde(rename = "forehead_x")]
    pub x: i32,
    #[serde(rename = "forehead_y")]
    pub y: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForeheadConfig {
    pub anchor_index: usize,
    pub reference_index: usize,
    pub height_factor: f64,
    pub bound: i32,
}

impl Default for ForeheadConfig {
    fn default() -> Self {
        Self {
            anchor_index: FOREHEAD_ANCHOR_INDEX,
            reference_index: NOSE_BRIDGE_INDEX,
            height_factor: FOREHEAD_HEIGHT_FACTOR,
            bound: COORDINATE_BOUND,
        }
    }
}

impl ForeheadConfig {
    /// Smallest landmark count the configured indices can address.
    pub fn required_landmarks(&self) -> usize {
        self.anchor_index.max(self.reference_index) + 1
    }

    /// Checks the configuration against a detector producing `landmark_count` points.
    pub fn validate(&self, landmark_count: usize) -> Result<(), ForeheadError> {
        if landmark_count < self.required_landmarks() {
            return Err(ForeheadError::InsufficientLandmarks {
                required: self.required_landmarks(),
                actual: landmark_count,
            });
        }
        if !self.height_factor.is_finite() || self.height_factor < 0.0 {
            return Err(ForeheadError::InvalidConfig(format!(
                "height factor must be finite and non-negative, got {}",
                self.height_factor
            )));
        }
        if self.bound <= 0 {
            return Err(ForeheadError::InvalidConfig(format!(
                "coordinate bound must be positive, got {}",
                self.bound
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ForeheadEstimator {
    config: ForeheadConfig,
}

impl ForeheadEstimator {
    pub fn new(config: ForeheadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForeheadConfig {
        &self.config
    }

    /// Normalized forehead tip: anchor moved up by `factor * |anchor - reference|`.
    pub fn estimate_normalized(&self, landmarks: &FaceLandmarks) -> Result<Landmark, ForeheadError> {
        let (anchor, reference) = self.select(landmarks)?;
        Ok(self.project(anchor, reference))
    }

    /// Forehead tip in pixels for an image of `width` x `height`.
    pub fn estimate(
        &self,
        landmarks: &FaceLandmarks,
        width: u32,
        height: u32,
    ) -> Result<ForeheadTip, ForeheadError> {
        let (anchor, reference) = self.select(landmarks)?;
        let tip = self.project(anchor, reference);
        let (tx, ty) = tip.to_pixels(width, height);

        let result = ForeheadTip {
            x: clamp_coordinate(tx, self.config.bound),
            y: clamp_coordinate(ty, self.config.bound),
        };

        let (ax, ay) = anchor.to_pixels(width, height);
        let (rx, ry) = reference.to_pixels(width, height);
        log::debug!("anchor: ({ax:.2}, {ay:.2}), reference: ({rx:.2}, {ry:.2})");
        log::debug!(
            "distance (pixels): {:.2}, extended: {:.2}",
            anchor.distance(reference) * height as f64,
            (anchor.y - tip.y) * height as f64
        );
        log::debug!("forehead tip: ({}, {})", result.x, result.y);

        Ok(result)
    }

    fn project(&self, anchor: &Landmark, reference: &Landmark) -> Landmark {
        let extended = self.config.height_factor * anchor.distance(reference);
        Landmark::new(anchor.x, anchor.y - extended)
    }

    fn select<'a>(
        &self,
        landmarks: &'a FaceLandmarks,
    ) -> Result<(&'a Landmark, &'a Landmark), ForeheadError> {
        let insufficient = || ForeheadError::InsufficientLandmarks {
            required: self.config.required_landmarks(),
            actual: landmarks.len(),
        };
        let anchor = landmarks
            .get(self.config.anchor_index)
            .ok_or_else(insufficient)?;
        let reference = landmarks
            .get(self.config.reference_index)
            .ok_or_else(insufficient)?;
        Ok((anchor, reference))
    }
}

/// Rounds to the nearest pixel and clamps into `[0, bound]`. NaN maps to 0.
fn clamp_coordinate(value: f64, bound: i32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, bound as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const SIZE: u32 = 600;

    /// 468 landmarks at the image center, with anchor and reference overridden.
    fn mesh(anchor: (f64, f64), reference: (f64, f64)) -> FaceLandmarks {
        let mut points = vec![(0.5, 0.5); 468];
        points[FOREHEAD_ANCHOR_INDEX] = anchor;
        points[NOSE_BRIDGE_INDEX] = reference;
        FaceLandmarks::from(points)
    }

    // ── estimate ────────────────────────────────────────────────────

    #[test]
    fn test_reference_example() {
        // dist = 0.1, extended = 0.05, y' = 0.45
        let est = ForeheadEstimator::default();
        let tip = est.estimate(&mesh((0.5, 0.5), (0.5, 0.6)), SIZE, SIZE).unwrap();
        assert_eq!(tip, ForeheadTip { x: 300, y: 270 });
    }

    #[test]
    fn test_coincident_landmarks_return_anchor() {
        let est = ForeheadEstimator::default();
        let lm = mesh((0.3, 0.4), (0.3, 0.4));
        let tip = est.estimate(&lm, SIZE, SIZE).unwrap();
        assert_eq!(tip, ForeheadTip { x: 180, y: 240 });
    }

    #[test]
    fn test_no_horizontal_shift_for_diagonal_reference() {
        // dist = 0.5 (3-4-5 triangle scaled), extended = 0.25
        let est = ForeheadEstimator::default();
        let lm = mesh((0.5, 0.6), (0.8, 1.0));
        let p = est.estimate_normalized(&lm).unwrap();
        assert_relative_eq!(p.x, 0.5);
        assert_relative_eq!(p.y, 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_pixel_estimate_matches_normalized_tip() {
        let est = ForeheadEstimator::default();
        let lm = mesh((0.42, 0.55), (0.47, 0.71));
        let p = est.estimate_normalized(&lm).unwrap();
        let tip = est.estimate(&lm, SIZE, SIZE).unwrap();
        assert_eq!(tip.x, (p.x * SIZE as f64).round() as i32);
        assert_eq!(tip.y, (p.y * SIZE as f64).round() as i32);
    }

    #[test]
    fn test_uses_actual_width_and_height() {
        let est = ForeheadEstimator::default();
        let tip = est.estimate(&mesh((0.5, 0.5), (0.5, 0.5)), 400, 200).unwrap();
        assert_eq!(tip, ForeheadTip { x: 200, y: 100 });
    }

    #[test]
    fn test_rounds_to_nearest_pixel() {
        let est = ForeheadEstimator::default();
        // 0.1234 * 600 = 74.04, 0.2009 * 600 = 120.54
        let tip = est
            .estimate(&mesh((0.1234, 0.2009), (0.1234, 0.2009)), SIZE, SIZE)
            .unwrap();
        assert_eq!(tip, ForeheadTip { x: 74, y: 121 });
    }

    #[rstest]
    #[case::above_top((0.5, -0.1), ForeheadTip { x: 300, y: 0 })]
    #[case::left_of_image((-0.2, 0.5), ForeheadTip { x: 0, y: 300 })]
    #[case::past_bottom_right((1.5, 1.2), ForeheadTip { x: 600, y: 600 })]
    fn test_clamps_to_bound(#[case] anchor: (f64, f64), #[case] expected: ForeheadTip) {
        let est = ForeheadEstimator::default();
        let tip = est.estimate(&mesh(anchor, anchor), SIZE, SIZE).unwrap();
        assert_eq!(tip, expected);
    }

    #[test]
    fn test_bound_ignores_larger_images() {
        let est = ForeheadEstimator::default();
        let tip = est.estimate(&mesh((0.9, 0.9), (0.9, 0.9)), 1000, 1000).unwrap();
        assert_eq!(tip, ForeheadTip { x: 600, y: 600 });
    }

    #[test]
    fn test_is_deterministic() {
        let est = ForeheadEstimator::default();
        let lm = mesh((0.47, 0.31), (0.52, 0.44));
        let first = est.estimate(&lm, SIZE, SIZE).unwrap();
        for _ in 0..10 {
            assert_eq!(est.estimate(&lm, SIZE, SIZE).unwrap(), first);
        }
    }

    #[test]
    fn test_custom_factor() {
        let est = ForeheadEstimator::new(ForeheadConfig {
            height_factor: 1.0,
            ..ForeheadConfig::default()
        });
        let tip = est.estimate(&mesh((0.5, 0.5), (0.5, 0.6)), SIZE, SIZE).unwrap();
        assert_eq!(tip, ForeheadTip { x: 300, y: 240 });
    }

    #[rstest]
    #[case::empty(0)]
    #[case::only_anchor(10)]
    #[case::one_short(150)]
    fn test_insufficient_landmarks(#[case] count: usize) {
        let est = ForeheadEstimator::default();
        let lm = FaceLandmarks::from(vec![(0.5, 0.5); count]);
        assert_eq!(
            est.estimate(&lm, SIZE, SIZE),
            Err(ForeheadError::InsufficientLandmarks {
                required: 151,
                actual: count
            })
        );
    }

    #[test]
    fn test_exactly_required_landmarks() {
        let est = ForeheadEstimator::default();
        let lm = FaceLandmarks::from(vec![(0.5, 0.5); 151]);
        assert!(est.estimate(&lm, SIZE, SIZE).is_ok());
    }

    // ── config ──────────────────────────────────────────────────────

    #[test]
    fn test_default_config_fits_face_mesh() {
        let config = ForeheadConfig::default();
        assert_eq!(config.required_landmarks(), 151);
        assert!(config.validate(468).is_ok());
    }

    #[test]
    fn test_validate_rejects_small_detector() {
        let err = ForeheadConfig::default().validate(68).unwrap_err();
        assert_eq!(
            err,
            ForeheadError::InsufficientLandmarks {
                required: 151,
                actual: 68
            }
        );
    }

    #[rstest]
    #[case::negative(-0.5)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn test_validate_rejects_bad_factor(#[case] factor: f64) {
        let config = ForeheadConfig {
            height_factor: factor,
            ..ForeheadConfig::default()
        };
        assert!(matches!(
            config.validate(468),
            Err(ForeheadError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_bound() {
        let config = ForeheadConfig {
            bound: 0,
            ..ForeheadConfig::default()
        };
        assert!(matches!(
            config.validate(468),
            Err(ForeheadError::InvalidConfig(_))
        ));
    }

    // ── serialization ───────────────────────────────────────────────

    #[test]
    fn test_tip_serializes_with_wire_names() {
        let json = serde_json::to_value(ForeheadTip { x: 300, y: 270 }).unwrap();
        assert_eq!(json, serde_json::json!({"forehead_x": 300, "forehead_y": 270}));
    }

    #[test]
    fn test_clamp_coordinate_nan() {
        assert_eq!(clamp_coordinate(f64::NAN, 600), 0);
    }
}
