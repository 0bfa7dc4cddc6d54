//! Stub collaborators for handler and router tests.

use axum::response::Response;
use base64::Engine;
use forehead_core::detection::domain::face_landmarks::{FaceLandmarks, Landmark};
use forehead_core::detection::domain::forehead_estimator::ForeheadEstimator;
use forehead_core::detection::domain::landmark_detector::LandmarkDetector;
use forehead_core::imaging::domain::image_decoder::{ImageDecodeError, ImageDecoder};
use forehead_core::pipeline::infrastructure::detector_pool::DetectorPool;
use forehead_core::pipeline::locate_forehead_use_case::LocateForeheadUseCase;
use forehead_core::shared::frame::Frame;

use crate::app::AppState;

/// Treats payloads starting with `IMG` as a blank 600x600 image.
struct StubDecoder;

impl ImageDecoder for StubDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Frame, ImageDecodeError> {
        if !bytes.starts_with(b"IMG") {
            return Err(ImageDecodeError::Corrupt("not an image".into()));
        }
        Ok(Frame::new(vec![0u8; 600 * 600 * 3], 600, 600, 3))
    }
}

#[derive(Clone)]
pub enum Script {
    Face(Vec<Landmark>),
    NoFace,
    Fail,
}

impl Script {
    /// Anchor (0.5, 0.5), nose bridge (0.5, 0.6): tip at (300, 270) on 600x600.
    pub fn reference_face() -> Self {
        let mut points = vec![Landmark::new(0.5, 0.5); 468];
        points[150] = Landmark::new(0.5, 0.6);
        Script::Face(points)
    }
}

struct StubDetector(Script);

impl LandmarkDetector for StubDetector {
    fn detect(
        &mut self,
        _frame: &Frame,
    ) -> Result<Option<FaceLandmarks>, Box<dyn std::error::Error>> {
        match &self.0 {
            Script::Face(points) => Ok(Some(FaceLandmarks::new(points.clone()))),
            Script::NoFace => Ok(None),
            Script::Fail => Err("runtime error".into()),
        }
    }

    fn landmark_count(&self) -> usize {
        468
    }
}

pub fn state(script: Script) -> AppState {
    let detector: Box<dyn LandmarkDetector> = Box::new(StubDetector(script));
    let pool = DetectorPool::new(vec![detector]).unwrap();
    let locator =
        LocateForeheadUseCase::new(Box::new(StubDecoder), pool, ForeheadEstimator::default())
            .unwrap();
    AppState::new(locator)
}

pub fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
