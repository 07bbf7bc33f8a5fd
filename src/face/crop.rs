use super::landmark::{FaceLandmarks, Landmark};

/// これより小さい顔範囲からはクロップを作らない（ピクセル）
const MIN_CROP_PIXELS: f32 = 16.0;

/// クロップ領域（フレームに対する正規化座標 0.0〜1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRegion {
    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// フレーム中央の正方形領域
    pub fn center_square(frame_w: u32, frame_h: u32) -> Self {
        if frame_w == 0 || frame_h == 0 {
            return Self::full();
        }
        let side = frame_w.min(frame_h) as f32;
        let w = side / frame_w as f32;
        let h = side / frame_h as f32;
        Self {
            x: (1.0 - w) / 2.0,
            y: (1.0 - h) / 2.0,
            width: w,
            height: h,
        }
    }

    /// 前フレームのランドマークから次フレームのクロップ領域を推定
    ///
    /// - ランドマークの min/max を margin 倍に拡張（中心を保持）
    /// - ピクセル上で正方形に揃える
    /// - はみ出す分は内側へずらし、フレームより大きければフレームの短辺に合わせる
    ///
    /// 有効な点が2個未満、または範囲が小さすぎれば None。
    pub fn from_landmarks(
        face: &FaceLandmarks,
        frame_w: u32,
        frame_h: u32,
        margin: f32,
    ) -> Option<Self> {
        if frame_w == 0 || frame_h == 0 {
            return None;
        }
        let fw = frame_w as f32;
        let fh = frame_h as f32;

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        let mut count = 0u32;

        for p in face.points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
            let px = p.x * fw;
            let py = p.y * fh;
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
            count += 1;
        }

        if count < 2 {
            return None;
        }

        let side = ((max_x - min_x).max(max_y - min_y) * margin).min(fw.min(fh));
        if side < MIN_CROP_PIXELS {
            return None;
        }

        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;
        let x = (cx - side / 2.0).clamp(0.0, fw - side);
        let y = (cy - side / 2.0).clamp(0.0, fh - side);

        Some(Self {
            x: x / fw,
            y: y / fh,
            width: side / fw,
            height: side / fh,
        })
    }

    /// ピクセル矩形 (x, y, w, h)
    pub fn to_pixels(&self, frame_w: u32, frame_h: u32) -> (i32, i32, i32, i32) {
        let x = (self.x * frame_w as f32).round() as i32;
        let y = (self.y * frame_h as f32).round() as i32;
        let w = (self.width * frame_w as f32).round() as i32;
        let h = (self.height * frame_h as f32).round() as i32;
        (x, y, w.min(frame_w as i32 - x), h.min(frame_h as i32 - y))
    }

    /// クロップ内の正規化座標をフレーム全体の正規化座標に戻す
    pub fn remap(&self, local_x: f32, local_y: f32) -> Landmark {
        Landmark::new(self.x + local_x * self.width, self.y + local_y * self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_square_landscape() {
        let crop = CropRegion::center_square(640, 480);
        assert!((crop.width - 0.75).abs() < 1e-6);
        assert!((crop.height - 1.0).abs() < 1e-6);
        assert!((crop.x - 0.125).abs() < 1e-6);
        assert_eq!(crop.to_pixels(640, 480), (80, 0, 480, 480));
    }

    #[test]
    fn test_remap_center_stays_center() {
        let crop = CropRegion::center_square(640, 480);
        let p = crop.remap(0.5, 0.5);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_remap_corner() {
        let crop = CropRegion::center_square(640, 480);
        let p = crop.remap(0.0, 1.0);
        assert!((p.x - 0.125).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    fn face_around(cx: f32, cy: f32, half: f32) -> FaceLandmarks {
        FaceLandmarks::new(vec![
            Landmark::new(cx - half, cy - half),
            Landmark::new(cx + half, cy + half),
            Landmark::new(cx, cy),
        ])
    }

    #[test]
    fn test_from_landmarks_off_center_roundtrip() {
        // 640x480 の右上寄りの顔
        let face = face_around(0.75, 0.3, 0.05);
        let crop = CropRegion::from_landmarks(&face, 640, 480, 1.5).unwrap();

        // ピクセル上で正方形、中心は顔の中心
        let (_, _, w, h) = crop.to_pixels(640, 480);
        assert!((w - h).abs() <= 1);
        let center = crop.remap(0.5, 0.5);
        assert!((center.x - 0.75).abs() < 1e-5);
        assert!((center.y - 0.3).abs() < 1e-5);

        // フレーム座標 → クロップ内座標 → remap で元に戻る
        for p in &face.points {
            let local_x = (p.x - crop.x) / crop.width;
            let local_y = (p.y - crop.y) / crop.height;
            assert!((0.0..=1.0).contains(&local_x));
            assert!((0.0..=1.0).contains(&local_y));
            let back = crop.remap(local_x, local_y);
            assert!((back.x - p.x).abs() < 1e-5);
            assert!((back.y - p.y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_from_landmarks_shifted_inside_frame() {
        let face = face_around(0.97, 0.03, 0.05);
        let crop = CropRegion::from_landmarks(&face, 640, 480, 1.5).unwrap();
        assert!(crop.x >= 0.0 && crop.y >= 0.0);
        assert!(crop.x + crop.width <= 1.0 + 1e-6);
        assert!(crop.y + crop.height <= 1.0 + 1e-6);
        let (_, _, w, h) = crop.to_pixels(640, 480);
        assert!((w - h).abs() <= 1);
    }

    #[test]
    fn test_from_landmarks_larger_than_frame() {
        let face = face_around(0.5, 0.5, 0.45);
        let crop = CropRegion::from_landmarks(&face, 640, 480, 1.5).unwrap();
        assert_eq!(crop, CropRegion::center_square(640, 480));
    }

    #[test]
    fn test_from_landmarks_rejects_degenerate() {
        assert!(CropRegion::from_landmarks(&FaceLandmarks::default(), 640, 480, 1.5).is_none());
        let single = FaceLandmarks::new(vec![Landmark::new(0.5, 0.5)]);
        assert!(CropRegion::from_landmarks(&single, 640, 480, 1.5).is_none());
        let tiny = face_around(0.5, 0.5, 0.001);
        assert!(CropRegion::from_landmarks(&tiny, 640, 480, 1.5).is_none());
        let nan = FaceLandmarks::new(vec![Landmark::new(f32::NAN, 0.5), Landmark::new(0.5, 0.5)]);
        assert!(CropRegion::from_landmarks(&nan, 640, 480, 1.5).is_none());
    }

    #[test]
    fn test_degenerate_frame() {
        assert_eq!(CropRegion::center_square(0, 480), CropRegion::full());
    }
}
