use tracing::{info, warn};

use crate::viewer::RawSample;

/// キャリブレーション時に取得した基準姿勢
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationFrame {
    pub base_x: f32,
    pub base_y: f32,
    pub base_depth_metric: f32,
}

impl CalibrationFrame {
    pub fn from_sample(sample: &RawSample) -> Self {
        Self {
            base_x: sample.x,
            base_y: sample.y,
            base_depth_metric: sample.depth_metric,
        }
    }
}

/// トラッキングの状態
///
/// Uncalibrated → Calibrated の遷移は `calibrate` のみ。逆向きの遷移はない。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrackingState {
    /// 基準姿勢なし。視点は既定位置に固定
    #[default]
    Uncalibrated,
    /// 基準姿勢に対する変位で視点を動かす
    Calibrated(CalibrationFrame),
}

impl TrackingState {
    /// キャリブレーション遷移
    ///
    /// サンプルがあれば基準を上書きして Calibrated へ。なければ状態はそのまま。
    pub fn calibrate(self, sample: Option<&RawSample>) -> Self {
        match sample {
            Some(s) => Self::Calibrated(CalibrationFrame::from_sample(s)),
            None => self,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated(_))
    }

    pub fn frame(&self) -> Option<&CalibrationFrame> {
        match self {
            Self::Calibrated(frame) => Some(frame),
            Self::Uncalibrated => None,
        }
    }
}

/// ユーザー操作によるキャリブレーションを管理する
#[derive(Debug, Default)]
pub struct CalibrationController {
    state: TrackingState,
    count: u32,
}

impl CalibrationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のサンプルを基準として取り込む。サンプルがなければ何もしない
    ///
    /// 戻り値: 基準を更新したか
    pub fn calibrate(&mut self, sample: Option<&RawSample>) -> bool {
        let next = self.state.calibrate(sample);
        match sample {
            Some(s) => {
                self.state = next;
                self.count += 1;
                info!(
                    "Calibrated #{}: base=({:.3}, {:.3}) depth_metric={:.2}",
                    self.count, s.x, s.y, s.depth_metric
                );
                true
            }
            None => {
                warn!("Calibration ignored: no face detected");
                false
            }
        }
    }

    /// このフレームで使う状態のスナップショット
    pub fn snapshot(&self) -> TrackingState {
        self.state
    }

    pub fn is_calibrated(&self) -> bool {
        self.state.is_calibrated()
    }

    /// 成功したキャリブレーションの回数
    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let controller = CalibrationController::new();
        assert!(!controller.is_calibrated());
        assert_eq!(controller.snapshot(), TrackingState::Uncalibrated);
        assert_eq!(controller.count(), 0);
    }

    #[test]
    fn test_calibrate_without_sample_is_noop() {
        let mut controller = CalibrationController::new();
        assert!(!controller.calibrate(None));
        assert!(!controller.is_calibrated());

        let sample = RawSample::new(0.5, 0.4, 8.0);
        controller.calibrate(Some(&sample));
        // 既存の基準は保持される
        assert!(!controller.calibrate(None));
        assert_eq!(
            controller.snapshot().frame(),
            Some(&CalibrationFrame::from_sample(&sample))
        );
    }

    #[test]
    fn test_recalibrate_overwrites() {
        let mut controller = CalibrationController::new();
        let first = RawSample::new(0.5, 0.5, 10.0);
        let second = RawSample::new(0.3, 0.6, 20.0);
        assert!(controller.calibrate(Some(&first)));
        assert!(controller.calibrate(Some(&second)));
        let frame = controller.snapshot().frame().copied().unwrap();
        assert_eq!(frame.base_x, 0.3);
        assert_eq!(frame.base_y, 0.6);
        assert_eq!(frame.base_depth_metric, 20.0);
        assert_eq!(controller.count(), 2);
    }

    #[test]
    fn test_transition_never_returns_to_uncalibrated() {
        let sample = RawSample::new(0.5, 0.5, 10.0);
        let state = TrackingState::Uncalibrated.calibrate(Some(&sample));
        assert!(state.is_calibrated());
        assert!(state.calibrate(None).is_calibrated());
        assert_eq!(TrackingState::Uncalibrated.calibrate(None), TrackingState::Uncalibrated);
    }
}
