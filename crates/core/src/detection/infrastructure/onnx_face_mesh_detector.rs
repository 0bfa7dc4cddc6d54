//! Two-stage face-mesh landmark detector on ONNX Runtime.
//!
//! A face box detector finds the most confident face; a square crop around
//! it goes through the face-mesh model, and the resulting points are mapped
//! back to normalized full-image coordinates.

use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_landmarks::{FaceLandmarks, Landmark};
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::shared::constants::FACE_MESH_LANDMARK_COUNT;
use crate::shared::frame::Frame;
use crate::shared::region::CropWindow;

use super::execution_provider::load_session;
use super::math::sigmoid;

/// Fallback mesh input resolution when the model shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 192;

/// Crop side relative to the longest side of the detected face box.
pub const CROP_SCALE: f64 = 1.5;

/// Minimum face-presence probability for a mesh to count as a face.
pub const DEFAULT_PRESENCE_THRESHOLD: f64 = 0.5;

/// Values per landmark in the mesh output (x, y, z).
const VALUES_PER_LANDMARK: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TensorLayout {
    Nchw,
    Nhwc,
}

pub struct OnnxFaceMeshDetector {
    session: ort::session::Session,
    face_detector: Box<dyn FaceDetector>,
    input_size: u32,
    layout: TensorLayout,
    presence_threshold: f64,
}

impl OnnxFaceMeshDetector {
    /// Load the face-mesh model and pair it with a face box detector.
    ///
    /// Input size and channel layout are read from the model's first input;
    /// converted MediaPipe models are usually NHWC `[1, 192, 192, 3]`.
    pub fn new(
        model_path: &Path,
        face_detector: Box<dyn FaceDetector>,
        presence_threshold: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;

        let (input_size, layout) = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    input_geometry(shape)
                } else {
                    None
                }
            })
            .unwrap_or((DEFAULT_INPUT_SIZE, TensorLayout::Nhwc));
        log::info!("Face mesh input: {input_size}x{input_size} ({layout:?})");

        Ok(Self {
            session,
            face_detector,
            input_size,
            layout,
            presence_threshold,
        })
    }
}

impl LandmarkDetector for OnnxFaceMeshDetector {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<FaceLandmarks>, Box<dyn std::error::Error>> {
        // Single-face operation: only the strongest box is refined.
        let regions = self.face_detector.detect(frame)?;
        let Some(face) = regions.first() else {
            return Ok(None);
        };
        let crop = face.square_crop(CROP_SCALE);
        if crop.side <= 0.0 {
            return Ok(None);
        }

        let input_tensor = crop_to_tensor(frame, &crop, self.input_size, self.layout);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        let mut mesh: Option<Vec<f32>> = None;
        let mut presence: Option<f32> = None;
        for (_, value) in outputs.iter() {
            let array = value.try_extract_array::<f32>()?;
            match array.len() {
                n if n == FACE_MESH_LANDMARK_COUNT * VALUES_PER_LANDMARK => {
                    mesh = Some(array.iter().copied().collect());
                }
                1 => presence = array.iter().next().copied(),
                _ => {}
            }
        }
        let mesh = mesh.ok_or("Face mesh model produced no landmark tensor")?;

        if let Some(logit) = presence {
            let score = sigmoid(logit) as f64;
            if score < self.presence_threshold {
                log::debug!("Face mesh presence {score:.3} below threshold");
                return Ok(None);
            }
        }

        Ok(Some(map_landmarks(
            &mesh,
            &crop,
            self.input_size,
            frame.width(),
            frame.height(),
        )))
    }

    fn landmark_count(&self) -> usize {
        FACE_MESH_LANDMARK_COUNT
    }
}

/// Square input size and channel layout from a 4-D input shape.
fn input_geometry(shape: &[i64]) -> Option<(u32, TensorLayout)> {
    if shape.len() != 4 {
        return None;
    }
    if shape[1] == 3 && shape[2] > 0 {
        Some((shape[2] as u32, TensorLayout::Nchw))
    } else if shape[3] == 3 && shape[1] > 0 {
        Some((shape[1] as u32, TensorLayout::Nhwc))
    } else {
        None
    }
}

/// Sample `crop` into a `size × size` tensor normalized to [0,1].
///
/// Pixels outside the frame are left at zero (black padding).
fn crop_to_tensor(
    frame: &Frame,
    crop: &CropWindow,
    size: u32,
    layout: TensorLayout,
) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let fw = frame.width() as i64;
    let fh = frame.height() as i64;
    let s = size as usize;
    let step = crop.side / s as f64;

    let mut tensor = match layout {
        TensorLayout::Nchw => ndarray::Array4::<f32>::zeros((1, 3, s, s)),
        TensorLayout::Nhwc => ndarray::Array4::<f32>::zeros((1, s, s, 3)),
    };

    for y in 0..s {
        let src_y = (crop.y + (y as f64 + 0.5) * step).floor() as i64;
        if src_y < 0 || src_y >= fh {
            continue;
        }
        for x in 0..s {
            let src_x = (crop.x + (x as f64 + 0.5) * step).floor() as i64;
            if src_x < 0 || src_x >= fw {
                continue;
            }
            for c in 0..3 {
                let v = src[[src_y as usize, src_x as usize, c]] as f32 / 255.0;
                match layout {
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = v,
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = v,
                }
            }
        }
    }

    tensor
}

/// Convert mesh output (crop input pixels) to normalized frame coordinates.
fn map_landmarks(
    mesh: &[f32],
    crop: &CropWindow,
    input_size: u32,
    frame_w: u32,
    frame_h: u32,
) -> FaceLandmarks {
    let scale = crop.side / input_size as f64;
    let points = mesh
        .chunks_exact(VALUES_PER_LANDMARK)
        .map(|p| {
            let x = crop.x + p[0] as f64 * scale;
            let y = crop.y + p[1] as f64 * scale;
            Landmark::new(x / frame_w as f64, y / frame_h as f64)
        })
        .collect();
    FaceLandmarks::new(points)
}
