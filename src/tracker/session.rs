use tracing::{debug, info};

use crate::config::Config;
use crate::viewer::{EyePosition, RawSample};

use super::calibration::{CalibrationController, TrackingState};
use super::mapping::DisplacementMapper;
use super::smooth::Smoother;

/// 1フレーム分の視点更新の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseUpdate {
    /// 未キャリブレーション: 既定位置に固定（平滑化しない）
    Reset,
    /// 目標視点に向けて平滑化
    Smoothed,
    /// トラッキングロスト: 直前の視点を保持
    Held,
}

/// 1セッション分のトラッキング状態
///
/// キャリブレーション・変位マッピング・平滑化をまとめて所有する。
pub struct TrackingSession {
    calibration: CalibrationController,
    mapper: DisplacementMapper,
    smoother: Smoother,
    tracking: bool,
}

impl TrackingSession {
    pub fn new(mapper: DisplacementMapper, alpha: f32) -> Self {
        let smoother = Smoother::new(alpha, mapper.default_pose());
        Self {
            calibration: CalibrationController::new(),
            mapper,
            smoother,
            tracking: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DisplacementMapper::from_config(config), config.smooth.alpha)
    }

    /// 手動キャリブレーション。サンプルがなければ何もしない
    pub fn calibrate(&mut self, sample: Option<RawSample>) -> bool {
        self.calibration.calibrate(sample.as_ref())
    }

    pub fn state(&self) -> TrackingState {
        self.calibration.snapshot()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_calibrated()
    }

    pub fn calibration_count(&self) -> u32 {
        self.calibration.count()
    }

    /// 現在の平滑化済み視点
    pub fn pose(&self) -> EyePosition {
        self.smoother.current()
    }

    /// このサンプルに対する目標視点。未キャリブレーション時は既定位置
    pub fn target(&self, sample: &RawSample) -> EyePosition {
        match self.state() {
            TrackingState::Calibrated(frame) => self.mapper.target(&frame, sample),
            TrackingState::Uncalibrated => self.mapper.default_pose(),
        }
    }

    /// 1フレーム進める
    pub fn step(&mut self, sample: Option<RawSample>) -> (EyePosition, PoseUpdate) {
        self.note_tracking(sample.is_some());

        // フレーム中はこのスナップショットだけを見る
        let state = self.state();
        match (state, sample) {
            (TrackingState::Uncalibrated, _) => {
                let pose = self.smoother.snap(self.mapper.default_pose());
                (pose, PoseUpdate::Reset)
            }
            (TrackingState::Calibrated(frame), Some(sample)) => {
                let target = self.mapper.target(&frame, &sample);
                (self.smoother.apply(target), PoseUpdate::Smoothed)
            }
            (TrackingState::Calibrated(_), None) => (self.smoother.current(), PoseUpdate::Held),
        }
    }

    fn note_tracking(&mut self, tracking: bool) {
        if tracking == self.tracking {
            return;
        }
        self.tracking = tracking;
        if tracking {
            info!("Face tracking acquired");
        } else {
            debug!("Face tracking lost");
        }
    }
}
