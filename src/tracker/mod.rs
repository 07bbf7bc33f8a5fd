pub mod calibration;
pub mod mapping;
pub mod session;
pub mod smooth;

pub use calibration::{CalibrationController, CalibrationFrame, TrackingState};
pub use mapping::DisplacementMapper;
pub use session::{PoseUpdate, TrackingSession};
pub use smooth::Smoother;
