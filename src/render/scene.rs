use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SceneConfig;

/// 背景色 (RGB)
pub const BACKGROUND_COLOR: u32 = 0x0D0D0D;

/// グリッドの色 (RGB)
pub const GRID_COLOR: u32 = 0x4D4D4D;

/// トンネルの立方体の色 (RGB)
pub const TUNNEL_COLOR: u32 = 0xFFFFFF;

/// 中央のエンティティの色 (RGB)
pub const ENTITY_COLOR: u32 = 0x00FF87;

/// エンティティ内側（半透明相当）の色 (RGB)
pub const ENTITY_CORE_COLOR: u32 = 0x059E56;

const GRID_SIZE: f32 = 50.0;
const GRID_STEP: f32 = 5.0;
const GRID_HEIGHT: f32 = 5.0;
const ENTITY_DEPTH: f32 = -5.0;

/// 色付きの線分（ワールド座標, cm）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point3<f32>,
    pub b: Point3<f32>,
    pub color: u32,
}

/// トンネルを構成する立方体1つ
#[derive(Debug, Clone, Copy)]
struct TunnelObject {
    position: Vector3<f32>,
    /// 初期回転（度）
    rot_x: f32,
    rot_y: f32,
}

/// スクリーン奥に広がるワイヤーフレームのシーン
///
/// - 上下のグリッド
/// - 螺旋状に奥へ続く回転する立方体のトンネル
/// - 中央で回転・脈動する八面体
pub struct Scene {
    tunnel: Vec<TunnelObject>,
    grid: Vec<Segment>,
}

impl Scene {
    pub fn new(config: &SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let tunnel = (0..config.tunnel_objects)
            .map(|i| {
                let angle = i as f32 * 0.5;
                let radius = 3.0 + rng.gen_range(0.0f32..1.0);
                TunnelObject {
                    position: Vector3::new(angle.cos() * radius, angle.sin() * radius, -(i as f32) * 1.5),
                    rot_x: rng.gen_range(0.0f32..360.0),
                    rot_y: rng.gen_range(0.0f32..360.0),
                }
            })
            .collect();

        let mut grid = grid_segments(-GRID_HEIGHT);
        grid.extend(grid_segments(GRID_HEIGHT));

        Self { tunnel, grid }
    }

    pub fn tunnel_len(&self) -> usize {
        self.tunnel.len()
    }

    /// 時刻 t_ms における全線分
    pub fn segments(&self, t_ms: f32) -> Vec<Segment> {
        let mut out = self.grid.clone();

        let spin = t_ms * 0.02;
        for obj in &self.tunnel {
            let model = Matrix4::new_translation(&obj.position)
                * rotation(Vector3::x_axis(), obj.rot_x + spin)
                * rotation(Vector3::y_axis(), obj.rot_y + spin);
            push_edges(&mut out, &model, &cube_edges(1.0), TUNNEL_COLOR);
        }

        let entity = Matrix4::new_translation(&Vector3::new(0.0, 0.0, ENTITY_DEPTH))
            * rotation(Vector3::y_axis(), t_ms * 0.05)
            * rotation(Unit::new_normalize(Vector3::new(1.0, 0.0, 1.0)), t_ms * 0.03);
        let octahedron = octahedron_edges(1.0);
        push_edges(&mut out, &(entity * Matrix4::new_scaling(1.5)), &octahedron, ENTITY_COLOR);

        let pulse = 0.5 + (t_ms * 0.005).sin() * 0.1;
        push_edges(
            &mut out,
            &(entity * Matrix4::new_scaling(pulse * 1.5)),
            &octahedron,
            ENTITY_CORE_COLOR,
        );

        out
    }
}

fn rotation(axis: Unit<Vector3<f32>>, degrees: f32) -> Matrix4<f32> {
    Rotation3::from_axis_angle(&axis, degrees.to_radians()).to_homogeneous()
}

fn push_edges(out: &mut Vec<Segment>, model: &Matrix4<f32>, edges: &[(Point3<f32>, Point3<f32>)], color: u32) {
    out.extend(edges.iter().map(|(a, b)| Segment {
        a: model.transform_point(a),
        b: model.transform_point(b),
        color,
    }));
}

fn grid_segments(y: f32) -> Vec<Segment> {
    let lines = (2.0 * GRID_SIZE / GRID_STEP) as usize + 1;
    let mut out = Vec::with_capacity(lines * 2);
    for i in 0..lines {
        let v = -GRID_SIZE + i as f32 * GRID_STEP;
        out.push(Segment {
            a: Point3::new(v, y, -GRID_SIZE),
            b: Point3::new(v, y, GRID_SIZE),
            color: GRID_COLOR,
        });
        out.push(Segment {
            a: Point3::new(-GRID_SIZE, y, v),
            b: Point3::new(GRID_SIZE, y, v),
            color: GRID_COLOR,
        });
    }
    out
}

/// 一辺 size の立方体の12辺
fn cube_edges(size: f32) -> Vec<(Point3<f32>, Point3<f32>)> {
    let h = size / 2.0;
    let v = |x: f32, y: f32, z: f32| Point3::new(x * h, y * h, z * h);
    let corners = [
        v(-1.0, -1.0, 1.0),
        v(1.0, -1.0, 1.0),
        v(1.0, 1.0, 1.0),
        v(-1.0, 1.0, 1.0),
        v(-1.0, -1.0, -1.0),
        v(1.0, -1.0, -1.0),
        v(1.0, 1.0, -1.0),
        v(-1.0, 1.0, -1.0),
    ];
    let mut edges = Vec::with_capacity(12);
    for i in 0..4 {
        let j = (i + 1) % 4;
        edges.push((corners[i], corners[j])); // 前面
        edges.push((corners[i + 4], corners[j + 4])); // 背面
        edges.push((corners[i], corners[i + 4])); // 前後の接続
    }
    edges
}

/// 頂点までの距離 size の八面体の12辺
fn octahedron_edges(size: f32) -> Vec<(Point3<f32>, Point3<f32>)> {
    let top = Point3::new(0.0, size, 0.0);
    let bottom = Point3::new(0.0, -size, 0.0);
    let ring = [
        Point3::new(-size, 0.0, size),
        Point3::new(size, 0.0, size),
        Point3::new(size, 0.0, -size),
        Point3::new(-size, 0.0, -size),
    ];
    let mut edges = Vec::with_capacity(12);
    for i in 0..4 {
        edges.push((top, ring[i]));
        edges.push((bottom, ring[i]));
        edges.push((ring[i], ring[(i + 1) % 4]));
    }
    edges
}
