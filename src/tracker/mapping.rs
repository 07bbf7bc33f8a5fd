use crate::config::Config;
use crate::viewer::{EyePosition, RawSample};

use super::calibration::CalibrationFrame;

/// depth_metric の下限
///
/// 推定器の出力は常に 1/√2 以上なので、これが効くのは 0・負値・NaN が
/// 直接渡されたときだけ（ゼロ除算と NaN の伝播を止める）。
const MIN_DEPTH_METRIC: f32 = f32::EPSILON;

/// 基準姿勢からの変位を物理単位（cm）の目標視点に変換する
#[derive(Debug, Clone)]
pub struct DisplacementMapper {
    /// 正規化変位 → cm
    gain: f32,
    /// 基準姿勢での視聴距離
    default_distance: f32,
    /// 視聴距離の下限
    min_distance: f32,
}

impl DisplacementMapper {
    pub fn new(gain: f32, default_distance: f32, min_distance: f32) -> Self {
        Self {
            gain,
            default_distance,
            min_distance,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tracker.movement_gain,
            config.viewer.default_distance_cm,
            config.viewer.min_distance_cm,
        )
    }

    pub fn default_distance(&self) -> f32 {
        self.default_distance
    }

    /// 未キャリブレーション時の視点
    pub fn default_pose(&self) -> EyePosition {
        EyePosition::centered(self.default_distance)
    }

    /// 目標視点を計算
    ///
    /// - X: 鏡像のため符号反転
    /// - Y: 画像座標（下が正）の変位をそのまま使う
    /// - Z: 視聴距離は両目間距離に反比例するとみなす
    pub fn target(&self, frame: &CalibrationFrame, sample: &RawSample) -> EyePosition {
        let dx = (sample.x - frame.base_x) * -self.gain;
        let dy = (sample.y - frame.base_y) * self.gain;

        let depth_metric = sample.depth_metric.max(MIN_DEPTH_METRIC);
        let dz = self.default_distance * (frame.base_depth_metric / depth_metric);

        EyePosition::new(dx, dy, dz.max(self.min_distance))
    }
}
