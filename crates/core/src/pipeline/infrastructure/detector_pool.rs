use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::shared::frame::Frame;

#[derive(Error, Debug, PartialEq)]
pub enum PoolError {
    #[error("detector pool needs at least one detector")]
    Empty,
    #[error("detectors disagree on landmark count: {expected} vs {actual}")]
    LandmarkCountMismatch { expected: usize, actual: usize },
    #[error("detector pool is closed")]
    Closed,
    #[error("landmark detection failed: {0}")]
    Detection(String),
}

/// Fixed set of landmark detectors shared across request threads.
///
/// Each call checks out one idle detector for exclusive use and hands it
/// back when done, so no detector instance ever runs two inferences at
/// once. Callers block while every detector is busy.
pub struct DetectorPool {
    idle_tx: Sender<Box<dyn LandmarkDetector>>,
    idle_rx: Receiver<Box<dyn LandmarkDetector>>,
    size: usize,
    landmark_count: usize,
}

impl DetectorPool {
    pub fn new(detectors: Vec<Box<dyn LandmarkDetector>>) -> Result<Self, PoolError> {
        let landmark_count = detectors
            .first()
            .map(|d| d.landmark_count())
            .ok_or(PoolError::Empty)?;
        if let Some(odd) = detectors
            .iter()
            .find(|d| d.landmark_count() != landmark_count)
        {
            return Err(PoolError::LandmarkCountMismatch {
                expected: landmark_count,
                actual: odd.landmark_count(),
            });
        }

        let size = detectors.len();
        let (idle_tx, idle_rx) = crossbeam_channel::bounded(size);
        for detector in detectors {
            idle_tx.send(detector).map_err(|_| PoolError::Closed)?;
        }

        Ok(Self {
            idle_tx,
            idle_rx,
            size,
            landmark_count,
        })
    }

    /// Build `size` detectors with `factory`, stopping at the first failure.
    pub fn build<F>(size: usize, mut factory: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: FnMut(usize) -> Result<Box<dyn LandmarkDetector>, Box<dyn std::error::Error>>,
    {
        let detectors = (0..size)
            .map(&mut factory)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(detectors)?)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Detectors not currently checked out.
    pub fn available(&self) -> usize {
        self.idle_rx.len()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    /// Run landmark detection on `frame` with the next free detector.
    pub fn detect(&self, frame: &Frame) -> Result<Option<FaceLandmarks>, PoolError> {
        let mut checkout = self.checkout()?;
        checkout
            .detector
            .as_mut()
            .ok_or(PoolError::Closed)?
            .detect(frame)
            .map_err(|e| PoolError::Detection(e.to_string()))
    }

    fn checkout(&self) -> Result<Checkout<'_>, PoolError> {
        let detector = self.idle_rx.recv().map_err(|_| PoolError::Closed)?;
        Ok(Checkout {
            pool: self,
            detector: Some(detector),
        })
    }
}

/// Returns the detector to the pool on drop, including on error or unwind.
struct Checkout<'a> {
    pool: &'a DetectorPool,
    detector: Option<Box<dyn LandmarkDetector>>,
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if let Some(detector) = self.detector.take() {
            // Capacity equals pool size, so this never blocks.
            let _ = self.pool.idle_tx.send(detector);
        }
    }
}
