use crate::config::TrackerConfig;
use crate::viewer::RawSample;

use super::landmark::{FaceLandmarks, Landmark};

/// 虹彩ランドマークから視点の正規化推定値を作る
pub struct ViewerPoseEstimator {
    /// 両目間距離の下限（depth_metric の発散防止）
    min_eye_distance: f32,
    /// X軸反転
    mirror_x: bool,
}

impl ViewerPoseEstimator {
    pub fn new(min_eye_distance: f32, mirror_x: bool) -> Self {
        Self {
            min_eye_distance,
            mirror_x,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.min_eye_distance, config.mirror_x)
    }

    /// 顔が検出されなかったフレームは None（トラッキングロスト）
    pub fn estimate(&self, face: Option<&FaceLandmarks>) -> Option<RawSample> {
        let (left, right) = face?.iris_centers()?;
        Some(self.estimate_from_iris(&left, &right))
    }

    /// 左右虹彩中心から RawSample を計算
    ///
    /// - 位置 = 両虹彩の中点
    /// - depth_metric = 1 / max(両虹彩間距離, min_eye_distance)
    pub fn estimate_from_iris(&self, left: &Landmark, right: &Landmark) -> RawSample {
        let center = left.midpoint(right);
        let eye_distance = left.distance(right).max(self.min_eye_distance);

        let x = if self.mirror_x { 1.0 - center.x } else { center.x };
        RawSample::new(x, center.y, 1.0 / eye_distance)
    }

    /// depth_metric が取り得る最大値
    pub fn max_depth_metric(&self) -> f32 {
        1.0 / self.min_eye_distance
    }
}

impl Default for ViewerPoseEstimator {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}
