pub mod frustum;

pub use frustum::{FrustumParameters, OffAxisProjector, Projection, ViewTransform};
