use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub smooth: SmoothConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub landmark: LandmarkConfig,
    #[serde(default)]
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 描画ループの目標FPS
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_window_title")]
    pub title: String,
}

/// 物理スクリーンの大きさ（センチメートル）
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width_cm")]
    pub width_cm: f32,
    /// 省略時はウィンドウのアスペクト比から求める
    #[serde(default)]
    pub height_cm: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    /// 未キャリブレーション時・基準姿勢での視聴距離
    #[serde(default = "default_viewer_distance_cm")]
    pub default_distance_cm: f32,
    /// 視聴距離の下限（ゼロ除算防止）
    #[serde(default = "default_min_distance_cm")]
    pub min_distance_cm: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmoothConfig {
    /// EMA係数 (0.0〜1.0, 大きいほど追従が速い)
    #[serde(default = "default_smooth_alpha")]
    pub alpha: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// 正規化座標の変位 → センチメートルのゲイン
    #[serde(default = "default_movement_gain")]
    pub movement_gain: f32,
    /// 両目間距離の下限（正規化座標）
    #[serde(default = "default_min_eye_distance")]
    pub min_eye_distance: f32,
    /// X軸反転（鏡像）
    #[serde(default = "default_mirror_x")]
    pub mirror_x: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub index: i32,
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
    #[serde(default = "default_camera_fps")]
    pub fps: u32,
}

/// 顔ランドマーク推定モデル (ONNX)
#[derive(Debug, Clone, Deserialize)]
pub struct LandmarkConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// 入力画像の一辺（ピクセル）
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_landmarks_output")]
    pub landmarks_output: String,
    /// 顔存在スコアの出力名。None ならスコア判定を行わない
    #[serde(default = "default_score_output")]
    pub score_output: Option<String>,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
    /// 前フレームの顔範囲に対するクロップの拡大率
    #[serde(default = "default_crop_margin")]
    pub crop_margin: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_tunnel_objects")]
    pub tunnel_objects: usize,
    #[serde(default = "default_scene_seed")]
    pub seed: u64,
}

fn default_target_fps() -> u32 { 60 }
fn default_window_width() -> u32 { 1680 }
fn default_window_height() -> u32 { 1050 }
fn default_window_title() -> String { "Holographic Entity (Press 'C' to Calibrate)".to_string() }
fn default_screen_width_cm() -> f32 { 30.0 }
fn default_viewer_distance_cm() -> f32 { 60.0 }
fn default_min_distance_cm() -> f32 { 0.1 }
fn default_near() -> f32 { 1.0 }
fn default_far() -> f32 { 1000.0 }
fn default_smooth_alpha() -> f32 { 0.15 }
fn default_movement_gain() -> f32 { 100.0 }
fn default_min_eye_distance() -> f32 { 0.001 }
fn default_mirror_x() -> bool { true }
fn default_camera_width() -> u32 { 640 }
fn default_camera_height() -> u32 { 480 }
fn default_camera_fps() -> u32 { 60 }
fn default_model_path() -> String { "models/face_landmark.onnx".to_string() }
fn default_input_size() -> u32 { 192 }
fn default_input_name() -> String { "input_1".to_string() }
fn default_landmarks_output() -> String { "Identity".to_string() }
fn default_score_output() -> Option<String> { Some("Identity_1".to_string()) }
fn default_score_threshold() -> f32 { 0.5 }
fn default_crop_margin() -> f32 { 1.5 }
fn default_tunnel_objects() -> usize { 40 }
fn default_scene_seed() -> u64 { 0x5eed }

impl Default for AppConfig {
    fn default() -> Self {
        Self { target_fps: default_target_fps() }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            title: default_window_title(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width_cm: default_screen_width_cm(),
            height_cm: None,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_distance_cm: default_viewer_distance_cm(),
            min_distance_cm: default_min_distance_cm(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: default_near(),
            far: default_far(),
        }
    }
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self { alpha: default_smooth_alpha() }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            movement_gain: default_movement_gain(),
            min_eye_distance: default_min_eye_distance(),
            mirror_x: default_mirror_x(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: default_camera_width(),
            height: default_camera_height(),
            fps: default_camera_fps(),
        }
    }
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            input_size: default_input_size(),
            input_name: default_input_name(),
            landmarks_output: default_landmarks_output(),
            score_output: default_score_output(),
            score_threshold: default_score_threshold(),
            crop_margin: default_crop_margin(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tunnel_objects: default_tunnel_objects(),
            seed: default_scene_seed(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// 読み込みに失敗したらデフォルト値を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }

    /// スクリーンの高さ（cm）。未指定ならウィンドウのアスペクト比から
    pub fn screen_height_cm(&self) -> f32 {
        match self.screen.height_cm {
            Some(h) => h,
            None => self.screen.width_cm * (self.window.height as f32 / self.window.width as f32),
        }
    }

    /// スクリーン半幅・半高（cm）
    pub fn screen_half_extents(&self) -> (f32, f32) {
        (self.screen.width_cm / 2.0, self.screen_height_cm() / 2.0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            bail!("window size must be non-zero");
        }
        if !(self.screen.width_cm > 0.0) || !(self.screen_height_cm() > 0.0) {
            bail!("screen size must be positive");
        }
        if !(self.viewer.min_distance_cm > 0.0) {
            bail!("viewer.min_distance_cm must be positive");
        }
        if self.viewer.default_distance_cm < self.viewer.min_distance_cm {
            bail!(
                "viewer.default_distance_cm ({}) is below min_distance_cm ({})",
                self.viewer.default_distance_cm,
                self.viewer.min_distance_cm
            );
        }
        if !(self.projection.near > 0.0) || !(self.projection.far > self.projection.near) {
            bail!(
                "projection planes must satisfy 0 < near < far (near={}, far={})",
                self.projection.near,
                self.projection.far
            );
        }
        if !(self.smooth.alpha > 0.0 && self.smooth.alpha <= 1.0) {
            bail!("smooth.alpha must be in (0, 1], got {}", self.smooth.alpha);
        }
        if !(self.tracker.min_eye_distance > 0.0) {
            bail!("tracker.min_eye_distance must be positive");
        }
        if !(self.landmark.crop_margin >= 1.0) {
            bail!("landmark.crop_margin must be >= 1.0, got {}", self.landmark.crop_margin);
        }
        if self.app.target_fps == 0 {
            bail!("app.target_fps must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.viewer.default_distance_cm, 60.0);
        assert_eq!(config.smooth.alpha, 0.15);
    }

    #[test]
    fn test_screen_height_from_aspect() {
        let config = Config::default();
        assert!((config.screen_height_cm() - 18.75).abs() < 1e-4);
        let (hw, hh) = config.screen_half_extents();
        assert!((hw - 15.0).abs() < 1e-6);
        assert!((hh - 9.375).abs() < 1e-4);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [screen]
            width_cm = 34.0
            height_cm = 19.0

            [smooth]
            alpha = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.screen_height_cm(), 19.0);
        assert_eq!(config.smooth.alpha, 0.3);
        assert_eq!(config.tracker.movement_gain, 100.0);
        assert_eq!(config.landmark.score_output.as_deref(), Some("Identity_1"));
    }

    #[test]
    fn test_validate_rejects_bad_planes() {
        let mut config = Config::default();
        config.projection.far = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_alpha() {
        let mut config = Config::default();
        config.smooth.alpha = 0.0;
        assert!(config.validate().is_err());
        config.smooth.alpha = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shrinking_crop() {
        let mut config = Config::default();
        assert_eq!(config.landmark.crop_margin, 1.5);
        config.landmark.crop_margin = 0.8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.camera.index, 0);
    }
}
