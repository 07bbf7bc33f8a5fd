/// iris 付きフェイスメッシュの点数 (468 + 虹彩 10)
pub const FACE_MESH_LANDMARK_COUNT: usize = 478;

/// 左虹彩中心のインデックス
pub const LEFT_IRIS_CENTER: usize = 468;

/// 右虹彩中心のインデックス
pub const RIGHT_IRIS_CENTER: usize = 473;

/// 単一ランドマーク（フレーム全体に対する正規化座標）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Landmark) -> Landmark {
        Landmark::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// 1つの顔のランドマーク集合
#[derive(Debug, Clone, Default)]
pub struct FaceLandmarks {
    pub points: Vec<Landmark>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// (左虹彩中心, 右虹彩中心)。虹彩点を含まないメッシュなら None
    pub fn iris_centers(&self) -> Option<(Landmark, Landmark)> {
        let left = self.get(LEFT_IRIS_CENTER)?;
        let right = self.get(RIGHT_IRIS_CENTER)?;
        Some((*left, *right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iris_centers_missing_refinement() {
        let face = FaceLandmarks::new(vec![Landmark::default(); 468]);
        assert!(face.iris_centers().is_none());
    }

    #[test]
    fn test_iris_centers() {
        let mut points = vec![Landmark::default(); FACE_MESH_LANDMARK_COUNT];
        points[LEFT_IRIS_CENTER] = Landmark::new(0.4, 0.5);
        points[RIGHT_IRIS_CENTER] = Landmark::new(0.6, 0.5);
        let (l, r) = FaceLandmarks::new(points).iris_centers().unwrap();
        assert_eq!(l, Landmark::new(0.4, 0.5));
        assert_eq!(r, Landmark::new(0.6, 0.5));
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a = Landmark::new(0.0, 0.0);
        let b = Landmark::new(0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
        assert_eq!(a.midpoint(&b), Landmark::new(0.15, 0.2));
    }
}
