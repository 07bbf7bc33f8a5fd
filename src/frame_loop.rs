use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::projection::{OffAxisProjector, Projection};
use crate::render::Renderer;
use crate::sampler::LandmarkSampler;
use crate::tracker::{PoseUpdate, TrackingSession};
use crate::viewer::{EyePosition, RawSample};

/// キャリブレーション要求のハンドル
///
/// 入力処理側（別スレッドでもよい）が request し、描画ループがフレーム開始時に取り出す。
#[derive(Debug, Clone, Default)]
pub struct CalibrationTrigger {
    pending: Arc<AtomicBool>,
}

impl CalibrationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// 要求があれば取り出してクリアする
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// 1フレーム分の出力
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub sample: Option<RawSample>,
    pub pose: EyePosition,
    pub update: PoseUpdate,
    pub projection: Projection,
    /// このフレームでキャリブレーションが成功したか
    pub calibrated_now: bool,
}

/// サンプル取得 → 視点更新 → 射影計算 → 描画 を1フレームずつ順に実行する
pub struct FrameLoop<S, R> {
    session: TrackingSession,
    projector: OffAxisProjector,
    sampler: S,
    renderer: R,
    trigger: CalibrationTrigger,
    frames: u64,
}

impl<S: LandmarkSampler, R: Renderer> FrameLoop<S, R> {
    pub fn new(session: TrackingSession, projector: OffAxisProjector, sampler: S, renderer: R) -> Self {
        Self {
            session,
            projector,
            sampler,
            renderer,
            trigger: CalibrationTrigger::new(),
            frames: 0,
        }
    }

    /// キャリブレーション要求用のハンドル（複製して入力処理側へ渡す）
    pub fn trigger(&self) -> CalibrationTrigger {
        self.trigger.clone()
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    /// 実行済みフレーム数
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// 1フレーム実行
    pub fn tick(&mut self) -> Result<FrameOutput> {
        let sample = self.sampler.poll_sample();

        // 保留中のキャリブレーションはこのフレームのサンプルで適用してから状態を読む
        let calibrated_now = self.trigger.take() && self.session.calibrate(sample);

        let (pose, update) = self.session.step(sample);
        let projection = self.projector.project(&pose);

        self.renderer.apply_frustum(&projection.frustum);
        self.renderer.apply_view_transform(&projection.view);
        self.renderer.draw_frame()?;

        self.frames += 1;
        Ok(FrameOutput {
            sample,
            pose,
            update,
            projection,
            calibrated_now,
        })
    }

    pub fn into_parts(self) -> (TrackingSession, S, R) {
        (self.session, self.sampler, self.renderer)
    }
}
