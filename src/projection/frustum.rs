//! 視点位置から非対称（オフアクシス）透視投影を作る。
//!
//! スクリーンを物理空間に固定した窓とみなし、視点が動いたときに
//! 窓の四辺が視点から見える方向へ視錐台をせん断する。

use nalgebra::{Matrix4, Vector3};

use crate::config::Config;
use crate::viewer::EyePosition;

/// 視錐台の6平面 (glFrustum と同じ引数)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumParameters {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl FrustumParameters {
    /// glFrustum 相当の射影行列
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        Matrix4::new(
            2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
            0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
            0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0, 0.0, -1.0, 0.0,
        )
    }
}

/// 描画前にシーンへ適用する平行移動（視点位置の逆）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub translation: [f32; 3],
}

impl ViewTransform {
    pub fn for_eye(eye: &EyePosition) -> Self {
        Self {
            translation: [-eye.x_cm, -eye.y_cm, -eye.z_cm],
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let [x, y, z] = self.translation;
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }
}

/// 1フレーム分の射影とカメラ変換
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub frustum: FrustumParameters,
    pub view: ViewTransform,
}

impl Projection {
    /// projection * view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.frustum.to_matrix() * self.view.to_matrix()
    }
}

/// オフアクシス視錐台の計算器。内部状態を持たない
#[derive(Debug, Clone)]
pub struct OffAxisProjector {
    /// スクリーン半幅 (cm)
    half_width: f32,
    /// スクリーン半高 (cm)
    half_height: f32,
    near: f32,
    far: f32,
    /// 視点距離の下限 (cm)
    min_distance: f32,
}

impl OffAxisProjector {
    pub fn new(half_width: f32, half_height: f32, near: f32, far: f32, min_distance: f32) -> Self {
        Self {
            half_width,
            half_height,
            near,
            far,
            min_distance,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let (hw, hh) = config.screen_half_extents();
        Self::new(
            hw,
            hh,
            config.projection.near,
            config.projection.far,
            config.viewer.min_distance_cm,
        )
    }

    pub fn frustum(&self, eye: &EyePosition) -> FrustumParameters {
        let dist = eye.z_cm.abs().max(self.min_distance);
        let scale = self.near / dist;

        FrustumParameters {
            left: (-self.half_width - eye.x_cm) * scale,
            right: (self.half_width - eye.x_cm) * scale,
            bottom: (-self.half_height - eye.y_cm) * scale,
            top: (self.half_height - eye.y_cm) * scale,
            near: self.near,
            far: self.far,
        }
    }

    pub fn project(&self, eye: &EyePosition) -> Projection {
        Projection {
            frustum: self.frustum(eye),
            view: ViewTransform::for_eye(eye),
        }
    }
}
