pub mod face_detector;
pub mod face_landmarks;
pub mod forehead_estimator;
pub mod landmark_detector;
