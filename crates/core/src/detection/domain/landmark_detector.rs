use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;

/// Domain interface for single-face landmark detection.
///
/// `Ok(None)` means the image contains no face. Errors are reserved for
/// failures of the detector itself (bad model output, runtime errors).
pub trait LandmarkDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<FaceLandmarks>, Box<dyn std::error::Error>>;

    /// Number of landmarks every successful detection yields.
    fn landmark_count(&self) -> usize;
}
