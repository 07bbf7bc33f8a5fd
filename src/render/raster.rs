use nalgebra::{Matrix4, Point3, Vector4};

/// u32 (0x00RRGGBB) のピクセルバッファ
pub struct FrameBuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0u32; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Bresenhamのアルゴリズムで線を描画
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }
}

/// クリップ空間で視錐台の6平面に対して線分を切り取る (Liang-Barsky)
fn clip_segment(a: Vector4<f32>, b: Vector4<f32>) -> Option<(Vector4<f32>, Vector4<f32>)> {
    let distances = |p: &Vector4<f32>| {
        [
            p.w + p.x,
            p.w - p.x,
            p.w + p.y,
            p.w - p.y,
            p.w + p.z,
            p.w - p.z,
        ]
    };
    let da = distances(&a);
    let db = distances(&b);

    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (ea, eb) in da.into_iter().zip(db) {
        if ea < 0.0 && eb < 0.0 {
            return None;
        }
        if ea < 0.0 {
            t0 = t0.max(ea / (ea - eb));
        } else if eb < 0.0 {
            t1 = t1.min(ea / (ea - eb));
        }
    }
    if t0 > t1 {
        return None;
    }

    let d = b - a;
    Some((a + d * t0, a + d * t1))
}

fn to_viewport(p: &Vector4<f32>, width: usize, height: usize) -> (i32, i32) {
    let nx = p.x / p.w;
    let ny = p.y / p.w;
    let px = (nx + 1.0) * 0.5 * (width.saturating_sub(1)) as f32;
    let py = (1.0 - ny) * 0.5 * (height.saturating_sub(1)) as f32;
    (px.round() as i32, py.round() as i32)
}

/// ワールド座標の線分を画面のピクセル座標に投影する。画面外なら None
pub fn project_segment(
    view_projection: &Matrix4<f32>,
    a: &Point3<f32>,
    b: &Point3<f32>,
    width: usize,
    height: usize,
) -> Option<((i32, i32), (i32, i32))> {
    let ca = view_projection * a.to_homogeneous();
    let cb = view_projection * b.to_homogeneous();
    let (ca, cb) = clip_segment(ca, cb)?;
    Some((to_viewport(&ca, width, height), to_viewport(&cb, width, height)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_horizontal_line() {
        let mut fb = FrameBuffer::new(8, 4);
        fb.draw_line(1, 2, 5, 2, 0xFFFFFF);
        for x in 1..=5 {
            assert_eq!(fb.get(x, 2), Some(0xFFFFFF));
        }
        assert_eq!(fb.get(0, 2), Some(0));
        assert_eq!(fb.get(6, 2), Some(0));
    }

    #[test]
    fn test_draw_line_out_of_bounds_is_clipped() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.draw_line(-3, -3, 6, 6, 0x00FF00);
        assert_eq!(fb.get(0, 0), Some(0x00FF00));
        assert_eq!(fb.get(3, 3), Some(0x00FF00));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.clear(0x0D0D0D);
        assert!(fb.pixels().iter().all(|&p| p == 0x0D0D0D));
    }

    #[test]
    fn test_project_identity() {
        let m = Matrix4::identity();
        let (p0, p1) = project_segment(
            &m,
            &Point3::new(-1.0, 1.0, 0.0),
            &Point3::new(1.0, -1.0, 0.0),
            101,
            51,
        )
        .unwrap();
        assert_eq!(p0, (0, 0));
        assert_eq!(p1, (100, 50));
    }

    #[test]
    fn test_project_outside_is_rejected() {
        let m = Matrix4::identity();
        let result = project_segment(&m, &Point3::new(2.0, 0.0, 0.0), &Point3::new(3.0, 0.5, 0.0), 100, 100);
        assert!(result.is_none());
    }

    #[test]
    fn test_project_partially_visible_is_clipped() {
        let m = Matrix4::identity();
        let (p0, p1) = project_segment(
            &m,
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(4.0, 0.0, 0.0),
            101,
            101,
        )
        .unwrap();
        assert_eq!(p0, (50, 50));
        assert_eq!(p1, (100, 50));
    }

    #[test]
    fn test_segment_behind_viewer_is_rejected() {
        // 視点の後ろ (z > 0 in eye space) の線分は描かない
        let frustum = crate::projection::FrustumParameters {
            left: -0.25,
            right: 0.25,
            bottom: -0.15,
            top: 0.15,
            near: 1.0,
            far: 1000.0,
        };
        let m = frustum.to_matrix();
        let result = project_segment(&m, &Point3::new(0.0, 0.0, 5.0), &Point3::new(1.0, 0.0, 5.0), 100, 100);
        assert!(result.is_none());
    }
}
