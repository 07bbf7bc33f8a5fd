use anyhow::{Context, Result};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use nalgebra::Matrix4;
use std::time::Instant;

use crate::config::WindowConfig;
use crate::projection::{FrustumParameters, ViewTransform};

use super::raster::{project_segment, FrameBuffer};
use super::scene::{Scene, BACKGROUND_COLOR};
use super::Renderer;

/// minifbを使用したソフトウェアレンダラー
pub struct MinifbRenderer {
    window: Window,
    buffer: FrameBuffer,
    scene: Scene,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    started: Instant,
}

impl MinifbRenderer {
    /// ウィンドウを作成
    pub fn new(config: &WindowConfig, scene: Scene) -> Result<Self> {
        let width = config.width as usize;
        let height = config.height as usize;
        let window = Window::new(
            &config.title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .context("Failed to create window")?;

        Ok(Self {
            window,
            buffer: FrameBuffer::new(width, height),
            scene,
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            started: Instant::now(),
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// キーが押された瞬間か（リピートなし）
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

impl Renderer for MinifbRenderer {
    fn apply_frustum(&mut self, frustum: &FrustumParameters) {
        self.projection = frustum.to_matrix();
    }

    fn apply_view_transform(&mut self, view: &ViewTransform) {
        self.view = view.to_matrix();
    }

    fn draw_frame(&mut self) -> Result<()> {
        let t_ms = self.started.elapsed().as_secs_f32() * 1000.0;
        let view_projection = self.projection * self.view;
        let (w, h) = (self.buffer.width(), self.buffer.height());

        self.buffer.clear(BACKGROUND_COLOR);
        for segment in self.scene.segments(t_ms) {
            if let Some(((x0, y0), (x1, y1))) = project_segment(&view_projection, &segment.a, &segment.b, w, h) {
                self.buffer.draw_line(x0, y0, x1, y1, segment.color);
            }
        }

        self.window
            .update_with_buffer(self.buffer.pixels(), w, h)
            .context("Failed to update window")?;
        Ok(())
    }
}
