pub mod execution_provider;
mod math;
pub mod model_resolver;
pub mod onnx_blazeface_detector;
pub mod onnx_face_mesh_detector;
