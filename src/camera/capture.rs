use anyhow::{Context, Result};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs, VideoCaptureTrait},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{CameraConfig, Config};
use crate::face::{preprocess_for_face_mesh, CropRegion, FaceMeshDetector, ViewerPoseEstimator};
use crate::sampler::LandmarkSampler;
use crate::viewer::RawSample;

use super::slot::LatestSlot;

/// 警告ログの最短間隔
const WARN_INTERVAL: Duration = Duration::from_secs(5);

/// OpenCVを使用したカメラキャプチャ
pub struct OpenCvCamera {
    capture: VideoCapture,
    width: u32,
    height: u32,
}

impl OpenCvCamera {
    /// 解像度とFPSを指定してカメラを開く
    pub fn open(config: &CameraConfig) -> Result<Self> {
        let mut capture = VideoCapture::new(config.index, VideoCaptureAPIs::CAP_ANY as i32)
            .context("Failed to open camera")?;

        if !capture.is_opened()? {
            anyhow::bail!("Camera {} is not available", config.index);
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, config.width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, config.height as f64)?;
        capture.set(videoio::CAP_PROP_FPS, config.fps as f64)?;
        // 古いフレームを溜めない
        capture.set(videoio::CAP_PROP_BUFFERSIZE, 1.0)?;

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        info!("Camera {}: {}x{} @ {} fps", config.index, width, height, fps);

        Ok(Self {
            capture,
            width,
            height,
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// フレームを読み込む（BGR形式）
    pub fn read_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        self.capture
            .read(&mut frame)
            .context("Failed to read frame")?;

        if frame.empty() {
            anyhow::bail!("Empty frame received");
        }

        Ok(frame)
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("Failed to release camera: {}", e);
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// 別スレッドでキャプチャとランドマーク推定を行い、最新の推定結果を提供する
///
/// スロットには `Option<RawSample>` を書き込む（None = 顔なし / 取得失敗）。
/// drop 時にスレッドを停止して join し、カメラを解放する。
pub struct CaptureWorker {
    latest: LatestSlot<Option<RawSample>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    resolution: (u32, u32),
}

impl CaptureWorker {
    /// カメラとモデルを開いてからスレッドを起動する。どちらかが失敗したらエラー
    pub fn start(config: &Config) -> Result<Self> {
        let camera = OpenCvCamera::open(&config.camera)?;
        let detector = FaceMeshDetector::new(&config.landmark)?;
        info!("Face mesh model loaded: {}", config.landmark.model_path);
        let estimator = ViewerPoseEstimator::from_config(&config.tracker);
        let crop_margin = config.landmark.crop_margin;
        let resolution = camera.resolution();

        let latest = LatestSlot::new();
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let latest = latest.clone();
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("capture".to_string())
                .spawn(move || capture_loop(camera, detector, estimator, crop_margin, latest, stop))
                .context("Failed to spawn capture thread")?
        };

        Ok(Self {
            latest,
            stop,
            handle: Some(handle),
            resolution,
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// 推定が完了した回数
    pub fn sequence(&self) -> u64 {
        self.latest.sequence()
    }

    /// 最新の推定結果。初回推定前は None
    pub fn latest(&self) -> Option<RawSample> {
        self.latest.latest().flatten()
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Capture thread panicked");
            }
        }
    }
}

impl LandmarkSampler for CaptureWorker {
    fn poll_sample(&mut self) -> Option<RawSample> {
        self.latest()
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.shutdown();
        debug!("Capture worker stopped");
    }
}

fn capture_loop(
    mut camera: OpenCvCamera,
    mut detector: FaceMeshDetector,
    estimator: ViewerPoseEstimator,
    crop_margin: f32,
    latest: LatestSlot<Option<RawSample>>,
    stop: Arc<AtomicBool>,
) {
    // 停止・panic のどちらでも最後は「サンプルなし」を残す
    let _no_sample_on_exit = latest.publish_on_drop(None);

    let input_size = detector.input_size();
    // 前フレームの顔範囲。見失ったらフレーム中央から探し直す
    let mut tracked_crop: Option<CropRegion> = None;
    let mut last_warn: Option<Instant> = None;

    while !stop.load(Ordering::Acquire) {
        let result = camera.read_frame().and_then(|frame| {
            let frame_w = frame.cols() as u32;
            let frame_h = frame.rows() as u32;
            let crop = tracked_crop.unwrap_or_else(|| CropRegion::center_square(frame_w, frame_h));
            let input = preprocess_for_face_mesh(&frame, &crop, input_size)?;
            let face = detector.detect(input, &crop)?;
            Ok((face, frame_w, frame_h))
        });

        match result {
            Ok((face, frame_w, frame_h)) => {
                let next = face
                    .as_ref()
                    .and_then(|f| CropRegion::from_landmarks(f, frame_w, frame_h, crop_margin));
                if tracked_crop.is_some() != next.is_some() {
                    debug!("Face crop {}", if next.is_some() { "locked" } else { "reset" });
                }
                tracked_crop = next;
                latest.publish(estimator.estimate(face.as_ref()));
            }
            Err(e) => {
                // 取得失敗は「サンプルなし」として扱う
                tracked_crop = None;
                latest.publish(None);
                if last_warn.map_or(true, |t| t.elapsed() >= WARN_INTERVAL) {
                    warn!("Capture failed: {:#}", e);
                    last_warn = Some(Instant::now());
                }
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}
