pub mod crop;
#[cfg(feature = "desktop")]
pub mod detector;
pub mod estimator;
pub mod landmark;
#[cfg(feature = "desktop")]
pub mod preprocess;

pub use crop::CropRegion;
#[cfg(feature = "desktop")]
pub use detector::FaceMeshDetector;
pub use estimator::ViewerPoseEstimator;
pub use landmark::{FaceLandmarks, Landmark, LEFT_IRIS_CENTER, RIGHT_IRIS_CENTER};
#[cfg(feature = "desktop")]
pub use preprocess::preprocess_for_face_mesh;
