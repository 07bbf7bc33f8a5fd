#[cfg(feature = "desktop")]
pub mod capture;
pub mod slot;

#[cfg(feature = "desktop")]
pub use capture::{CaptureWorker, OpenCvCamera};
pub use slot::{LatestSlot, PublishOnDrop};
