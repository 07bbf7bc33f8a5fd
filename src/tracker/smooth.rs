use crate::config::SmoothConfig;
use crate::viewer::EyePosition;

/// EMAベースの視点平滑化フィルタ（一次IIR）
///
/// smoothed = smoothed * (1 - alpha) + target * alpha を成分ごとに適用する。
/// 直前の出力以外の状態は持たない。
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f32,
    current: EyePosition,
}

impl Smoother {
    pub fn new(alpha: f32, initial: EyePosition) -> Self {
        Self {
            alpha,
            current: initial,
        }
    }

    pub fn from_config(config: &SmoothConfig, initial: EyePosition) -> Self {
        Self::new(config.alpha, initial)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn current(&self) -> EyePosition {
        self.current
    }

    pub fn apply(&mut self, target: EyePosition) -> EyePosition {
        let a = self.alpha;
        let prev = self.current;
        self.current = EyePosition::new(
            prev.x_cm * (1.0 - a) + target.x_cm * a,
            prev.y_cm * (1.0 - a) + target.y_cm * a,
            prev.z_cm * (1.0 - a) + target.z_cm * a,
        );
        self.current
    }

    /// 平滑化せずに値を置き換える
    pub fn snap(&mut self, pose: EyePosition) -> EyePosition {
        self.current = pose;
        pose
    }

    /// 1%以内に収束するまでのフレーム数
    pub fn frames_to_settle(&self) -> u32 {
        (0.01f32.ln() / (1.0 - self.alpha).ln()).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_single_step() {
        let mut s = Smoother::new(0.15, EyePosition::centered(60.0));
        let result = s.apply(EyePosition::new(10.0, -20.0, 120.0));
        assert!(approx_eq(result.x_cm, 1.5, 1e-5));
        assert!(approx_eq(result.y_cm, -3.0, 1e-5));
        assert!(approx_eq(result.z_cm, 69.0, 1e-4));
    }

    #[test]
    fn test_no_smoothing() {
        let mut s = Smoother::new(1.0, EyePosition::centered(60.0));
        let target = EyePosition::new(1.0, 2.0, 3.0);
        assert_eq!(s.apply(target), target);
    }

    #[test]
    fn test_converges_within_settle_frames() {
        let initial = EyePosition::centered(60.0);
        let target = EyePosition::new(10.0, -5.0, 120.0);
        let mut s = Smoother::new(0.15, initial);
        assert_eq!(s.frames_to_settle(), 29);

        for _ in 0..s.frames_to_settle() {
            s.apply(target);
        }
        let out = s.current();
        assert!((out.x_cm - target.x_cm).abs() <= 0.01 * (target.x_cm - initial.x_cm).abs());
        assert!((out.y_cm - target.y_cm).abs() <= 0.01 * (target.y_cm - initial.y_cm).abs());
        assert!((out.z_cm - target.z_cm).abs() <= 0.01 * (target.z_cm - initial.z_cm).abs());
    }

    #[test]
    fn test_not_settled_too_early() {
        let mut s = Smoother::new(0.15, EyePosition::centered(60.0));
        for _ in 0..10 {
            s.apply(EyePosition::centered(120.0));
        }
        assert!((s.current().z_cm - 120.0).abs() > 0.6);
    }

    #[test]
    fn test_snap() {
        let mut s = Smoother::new(0.15, EyePosition::new(5.0, 5.0, 80.0));
        let pose = EyePosition::centered(60.0);
        assert_eq!(s.snap(pose), pose);
        assert_eq!(s.current(), pose);
    }
}
