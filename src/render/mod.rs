pub mod raster;
pub mod scene;
#[cfg(feature = "desktop")]
pub mod window;

use anyhow::Result;

use crate::projection::{FrustumParameters, ViewTransform};

pub use raster::{project_segment, FrameBuffer};
pub use scene::{Scene, Segment};
#[cfg(feature = "desktop")]
pub use minifb::Key;
#[cfg(feature = "desktop")]
pub use window::MinifbRenderer;

/// 描画バックエンド
///
/// 毎フレーム apply_frustum → apply_view_transform → draw_frame の順に呼ばれる。
pub trait Renderer {
    fn apply_frustum(&mut self, frustum: &FrustumParameters);
    fn apply_view_transform(&mut self, view: &ViewTransform);
    fn draw_frame(&mut self) -> Result<()>;
}
