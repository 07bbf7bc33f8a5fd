use serde::Serialize;

/// 1フレーム分の視点推定値（正規化座標）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawSample {
    /// 頭部中心X (0.0〜1.0, 左右反転済み)
    pub x: f32,
    /// 頭部中心Y (0.0〜1.0, 下が正)
    pub y: f32,
    /// 距離の逆数に比例する指標（大きいほど近い）
    pub depth_metric: f32,
}

impl RawSample {
    pub fn new(x: f32, y: f32, depth_metric: f32) -> Self {
        Self { x, y, depth_metric }
    }
}

/// 画面中心を原点とした視点位置（センチメートル）
///
/// X: 右が正, Y: 下が正（カメラ画像の向きのまま）, Z: 画面から視聴者方向が正
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EyePosition {
    pub x_cm: f32,
    pub y_cm: f32,
    pub z_cm: f32,
}

impl EyePosition {
    pub fn new(x_cm: f32, y_cm: f32, z_cm: f32) -> Self {
        Self { x_cm, y_cm, z_cm }
    }

    /// 画面中央の正面、指定距離
    pub fn centered(distance_cm: f32) -> Self {
        Self {
            x_cm: 0.0,
            y_cm: 0.0,
            z_cm: distance_cm,
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x_cm, self.y_cm, self.z_cm]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered() {
        let eye = EyePosition::centered(60.0);
        assert_eq!(eye.to_array(), [0.0, 0.0, 60.0]);
    }

    #[test]
    fn test_raw_sample_serializes_as_json() {
        let sample = RawSample::new(0.5, 0.25, 12.5);
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"x":0.5,"y":0.25,"depth_metric":12.5}"#);
    }
}
