use std::path::PathBuf;

use crate::detection::domain::forehead_estimator::{ForeheadConfig, ForeheadEstimator};
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::detection::infrastructure::model_resolver::{self, ProgressFn};
use crate::detection::infrastructure::onnx_blazeface_detector::{self, OnnxBlazefaceDetector};
use crate::detection::infrastructure::onnx_face_mesh_detector::{
    OnnxFaceMeshDetector, DEFAULT_PRESENCE_THRESHOLD,
};
use crate::imaging::infrastructure::memory_image_decoder::MemoryImageDecoder;
use crate::pipeline::infrastructure::detector_pool::DetectorPool;
use crate::pipeline::locate_forehead_use_case::LocateForeheadUseCase;
use crate::shared::constants::{FACE_DETECTOR_MODEL_NAME, FACE_MESH_MODEL_NAME};

/// Everything needed to assemble a [`LocateForeheadUseCase`] from ONNX models.
#[derive(Clone, Debug)]
pub struct LocatorSettings {
    /// Number of detector instances (and so concurrent inferences).
    pub workers: usize,
    pub face_confidence: f64,
    pub presence_threshold: f64,
    pub model_dir: Option<PathBuf>,
    pub face_detector_url: Option<String>,
    pub face_mesh_url: Option<String>,
    pub forehead: ForeheadConfig,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            face_confidence: onnx_blazeface_detector::DEFAULT_CONFIDENCE,
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
            model_dir: None,
            face_detector_url: None,
            face_mesh_url: None,
            forehead: ForeheadConfig::default(),
        }
    }
}

impl LocatorSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Worker count must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.face_confidence) {
            return Err(format!(
                "Face confidence must be between 0.0 and 1.0, got {}",
                self.face_confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.presence_threshold) {
            return Err(format!(
                "Presence threshold must be between 0.0 and 1.0, got {}",
                self.presence_threshold
            ));
        }
        Ok(())
    }
}

/// Resolve both models, load `workers` detector pairs and wire the use case.
pub fn build_locator(
    settings: &LocatorSettings,
    progress: Option<fn(&str, u64, u64)>,
) -> Result<LocateForeheadUseCase, Box<dyn std::error::Error>> {
    settings.validate()?;

    let bundled = settings.model_dir.as_deref();
    let progress_for = |name: &'static str| -> Option<ProgressFn> {
        progress.map(|cb| Box::new(move |dl, total| cb(name, dl, total)) as ProgressFn)
    };

    log::info!("Resolving model: {FACE_DETECTOR_MODEL_NAME}");
    let detector_path = model_resolver::resolve(
        FACE_DETECTOR_MODEL_NAME,
        settings.face_detector_url.as_deref(),
        bundled,
        progress_for(FACE_DETECTOR_MODEL_NAME),
    )?;
    log::info!("Resolving model: {FACE_MESH_MODEL_NAME}");
    let mesh_path = model_resolver::resolve(
        FACE_MESH_MODEL_NAME,
        settings.face_mesh_url.as_deref(),
        bundled,
        progress_for(FACE_MESH_MODEL_NAME),
    )?;

    let pool = DetectorPool::build(settings.workers, |i| {
        log::debug!("Loading detector {}/{}", i + 1, settings.workers);
        let face_detector = Box::new(OnnxBlazefaceDetector::new(
            &detector_path,
            settings.face_confidence,
        )?);
        let mesh = OnnxFaceMeshDetector::new(&mesh_path, face_detector, settings.presence_threshold)?;
        Ok(Box::new(mesh) as Box<dyn LandmarkDetector>)
    })?;
    log::info!("Loaded {} face mesh detector(s)", pool.size());

    let use_case = LocateForeheadUseCase::new(
        Box::new(MemoryImageDecoder::new()),
        pool,
        ForeheadEstimator::new(settings.forehead.clone()),
    )?;
    Ok(use_case)
}
