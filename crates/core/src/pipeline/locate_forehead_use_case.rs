use thiserror::Error;

use crate::detection::domain::forehead_estimator::{ForeheadError, ForeheadEstimator, ForeheadTip};
use crate::imaging::domain::image_decoder::ImageDecoder;
use crate::imaging::infrastructure::base64_payload::decode_base64_payload;
use crate::pipeline::infrastructure::detector_pool::{DetectorPool, PoolError};

/// Result of one forehead lookup.
///
/// `NoFaceFound` covers both undecodable images and images without a face;
/// callers historically treat the two the same way.
#[derive(Clone, Debug, PartialEq)]
pub enum ForeheadOutcome {
    Detected(ForeheadTip),
    NoFaceFound,
    InvalidInput(String),
}

#[derive(Error, Debug)]
pub enum LocateError {
    #[error(transparent)]
    Detection(#[from] PoolError),
    #[error("detector output unusable: {0}")]
    Estimation(#[from] ForeheadError),
}

/// Single-image pipeline: decode → detect landmarks → estimate forehead tip.
pub struct LocateForeheadUseCase {
    decoder: Box<dyn ImageDecoder>,
    pool: DetectorPool,
    estimator: ForeheadEstimator,
}

impl LocateForeheadUseCase {
    /// Fails when the estimator's landmark indices are out of reach of the
    /// pool's detectors, so misconfiguration surfaces at startup.
    pub fn new(
        decoder: Box<dyn ImageDecoder>,
        pool: DetectorPool,
        estimator: ForeheadEstimator,
    ) -> Result<Self, ForeheadError> {
        estimator.config().validate(pool.landmark_count())?;
        Ok(Self {
            decoder,
            pool,
            estimator,
        })
    }

    /// Locate the forehead tip in a base64-encoded image.
    pub fn execute_base64(&self, encoded: &str) -> Result<ForeheadOutcome, LocateError> {
        match decode_base64_payload(encoded) {
            Ok(bytes) => self.execute(&bytes),
            Err(e) => {
                log::warn!("Rejected payload: {e}");
                Ok(ForeheadOutcome::InvalidInput(e.to_string()))
            }
        }
    }

    /// Locate the forehead tip in encoded image bytes.
    pub fn execute(&self, image_bytes: &[u8]) -> Result<ForeheadOutcome, LocateError> {
        let frame = match self.decoder.decode(image_bytes) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Image decode failed: {e}");
                return Ok(ForeheadOutcome::NoFaceFound);
            }
        };
        log::debug!("Decoded {}x{} image", frame.width(), frame.height());

        let Some(landmarks) = self.pool.detect(&frame)? else {
            log::info!("No face detected");
            return Ok(ForeheadOutcome::NoFaceFound);
        };

        let tip = self
            .estimator
            .estimate(&landmarks, frame.width(), frame.height())?;
        log::info!("Forehead tip at ({}, {})", tip.x, tip.y);
        Ok(ForeheadOutcome::Detected(tip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_landmarks::{FaceLandmarks, Landmark};
    use crate::detection::domain::forehead_estimator::ForeheadConfig;
    use crate::detection::domain::landmark_detector::LandmarkDetector;
    use crate::imaging::domain::image_decoder::ImageDecodeError;
    use crate::shared::frame::Frame;
    use base64::Engine;

    // --- Stubs ---

    /// Accepts any payload starting with `IMG` as a `size × size` frame.
    struct StubDecoder {
        size: u32,
    }

    impl ImageDecoder for StubDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<Frame, ImageDecodeError> {
            if !bytes.starts_with(b"IMG") {
                return Err(ImageDecodeError::Corrupt("not an image".into()));
            }
            let s = self.size as usize;
            Ok(Frame::new(vec![0u8; s * s * 3], self.size, self.size, 3))
        }
    }

    enum Script {
        Face(Vec<Landmark>),
        NoFace,
        Fail,
    }

    struct StubDetector {
        script: Script,
        count: usize,
    }

    impl LandmarkDetector for StubDetector {
        fn detect(
            &mut self,
            _frame: &Frame,
        ) -> Result<Option<FaceLandmarks>, Box<dyn std::error::Error>> {
            match &self.script {
                Script::Face(points) => Ok(Some(FaceLandmarks::new(points.clone()))),
                Script::NoFace => Ok(None),
                Script::Fail => Err("runtime error".into()),
            }
        }

        fn landmark_count(&self) -> usize {
            self.count
        }
    }

    fn face(anchor: (f64, f64), reference: (f64, f64)) -> Script {
        let mut points = vec![Landmark::new(0.5, 0.5); 468];
        points[9] = Landmark::new(anchor.0, anchor.1);
        points[150] = Landmark::new(reference.0, reference.1);
        Script::Face(points)
    }

    fn use_case(script: Script) -> LocateForeheadUseCase {
        let pool = DetectorPool::new(vec![
            Box::new(StubDetector { script, count: 468 }) as Box<dyn LandmarkDetector>
        ])
        .unwrap();
        LocateForeheadUseCase::new(
            Box::new(StubDecoder { size: 600 }),
            pool,
            ForeheadEstimator::default(),
        )
        .unwrap()
    }

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    // --- Tests ---

    #[test]
    fn test_detected_face_yields_tip() {
        let uc = use_case(face((0.5, 0.5), (0.5, 0.6)));
        let outcome = uc.execute(b"IMG").unwrap();
        assert_eq!(outcome, ForeheadOutcome::Detected(ForeheadTip { x: 300, y: 270 }));
    }

    #[test]
    fn test_base64_round_trip_through_pipeline() {
        let uc = use_case(face((0.5, 0.5), (0.5, 0.6)));
        let outcome = uc.execute_base64(&encode(b"IMG")).unwrap();
        assert_eq!(outcome, ForeheadOutcome::Detected(ForeheadTip { x: 300, y: 270 }));
    }

    #[test]
    fn test_no_face() {
        let uc = use_case(Script::NoFace);
        assert_eq!(uc.execute(b"IMG").unwrap(), ForeheadOutcome::NoFaceFound);
    }

    #[test]
    fn test_undecodable_image_is_no_face() {
        let uc = use_case(face((0.5, 0.5), (0.5, 0.6)));
        assert_eq!(
            uc.execute_base64(&encode(b"PDF")).unwrap(),
            ForeheadOutcome::NoFaceFound
        );
    }

    #[test]
    fn test_malformed_base64_is_invalid_input() {
        let uc = use_case(face((0.5, 0.5), (0.5, 0.6)));
        let outcome = uc.execute_base64("%%%not base64%%%").unwrap();
        assert!(matches!(outcome, ForeheadOutcome::InvalidInput(_)));
    }

    #[test]
    fn test_detector_failure_is_error() {
        let uc = use_case(Script::Fail);
        let err = uc.execute(b"IMG").unwrap_err();
        assert!(matches!(err, LocateError::Detection(PoolError::Detection(_))));
    }

    #[test]
    fn test_short_detector_output_is_estimation_error() {
        let uc = use_case(Script::Face(vec![Landmark::new(0.5, 0.5); 20]));
        let err = uc.execute(b"IMG").unwrap_err();
        assert!(matches!(
            err,
            LocateError::Estimation(ForeheadError::InsufficientLandmarks { actual: 20, .. })
        ));
    }

    #[test]
    fn test_rejects_config_beyond_detector() {
        let detector: Box<dyn LandmarkDetector> = Box::new(StubDetector {
            script: Script::NoFace,
            count: 100,
        });
        let pool = DetectorPool::new(vec![detector]).unwrap();
        let result = LocateForeheadUseCase::new(
            Box::new(StubDecoder { size: 600 }),
            pool,
            ForeheadEstimator::new(ForeheadConfig::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_identical_input_identical_output() {
        let uc = use_case(face((0.41, 0.33), (0.45, 0.47)));
        let first = uc.execute(b"IMG").unwrap();
        assert_eq!(uc.execute(b"IMG").unwrap(), first);
    }
}
