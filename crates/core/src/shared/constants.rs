pub const FACE_DETECTOR_MODEL_NAME: &str = "face_detection_short_range.onnx";
pub const FACE_MESH_MODEL_NAME: &str = "face_landmark.onnx";

/// Landmarks produced per face by the face-mesh model.
pub const FACE_MESH_LANDMARK_COUNT: usize = 468;

/// "forehead center" in the face-mesh topology.
pub const FOREHEAD_ANCHOR_INDEX: usize = 9;
/// "nose-bridge reference" in the face-mesh topology.
pub const NOSE_BRIDGE_INDEX: usize = 150;

/// Fraction of the anchor/reference distance the tip sits above the anchor.
pub const FOREHEAD_HEIGHT_FACTOR: f64 = 0.5;

/// Upper pixel bound for both output coordinates. Callers pad images to
/// 600x600 before sending them, so the bound is fixed rather than derived.
pub const COORDINATE_BOUND: i32 = 600;

/// Response texts shared by the HTTP service and the CLI.
pub const MISSING_IMAGE_MESSAGE: &str = "No image_base64 found";
pub const MALFORMED_PAYLOAD_MESSAGE: &str = "Malformed image_base64 payload";
pub const NO_FACE_MESSAGE: &str = "No face detected";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
