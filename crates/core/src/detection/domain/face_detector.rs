use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face box detection.
///
/// Returns regions ordered by descending confidence. `&mut self` because
/// inference sessions need exclusive access while running.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
