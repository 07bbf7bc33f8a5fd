use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::config::LandmarkConfig;

use super::crop::CropRegion;
use super::landmark::{FaceLandmarks, FACE_MESH_LANDMARK_COUNT};

/// iris 付きフェイスメッシュ (478点) の ONNX モデル
pub struct FaceMeshDetector {
    session: Session,
    input_size: f32,
    input_name: String,
    landmarks_output: String,
    score_output: Option<String>,
    score_threshold: f32,
}

impl FaceMeshDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new(config: &LandmarkConfig) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.model_path)
            .with_context(|| format!("Failed to load face mesh model: {}", config.model_path))?;

        Ok(Self {
            session,
            input_size: config.input_size as f32,
            input_name: config.input_name.clone(),
            landmarks_output: config.landmarks_output.clone(),
            score_output: config.score_output.clone().filter(|name| !name.is_empty()),
            score_threshold: config.score_threshold,
        })
    }

    pub fn input_size(&self) -> i32 {
        self.input_size as i32
    }

    /// 前処理済みテンソルからランドマークを推定
    ///
    /// 入力: [1, size, size, 3] の f32 テンソル
    /// 出力: 顔がなければ None
    pub fn detect(&mut self, input: Array4<f32>, crop: &CropRegion) -> Result<Option<FaceLandmarks>> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .context("Inference failed")?;

        if let Some(name) = &self.score_output {
            let score: ndarray::ArrayViewD<f32> = outputs[name.as_str()]
                .try_extract_array()
                .context("Failed to extract face score")?;
            let logit = score.iter().next().copied().unwrap_or(f32::NEG_INFINITY);
            if sigmoid(logit) < self.score_threshold {
                return Ok(None);
            }
        }

        // 出力は (x, y, z) * 478 をフラットに並べたもの（入力ピクセル座標）
        let output: ndarray::ArrayViewD<f32> = outputs[self.landmarks_output.as_str()]
            .try_extract_array()
            .context("Failed to extract landmarks")?;
        let values: Vec<f32> = output.iter().copied().collect();
        if values.len() < FACE_MESH_LANDMARK_COUNT * 3 {
            anyhow::bail!(
                "Unexpected landmark output size: {} (expected {})",
                values.len(),
                FACE_MESH_LANDMARK_COUNT * 3
            );
        }

        let points = values
            .chunks_exact(3)
            .take(FACE_MESH_LANDMARK_COUNT)
            .map(|p| crop.remap(p[0] / self.input_size, p[1] / self.input_size))
            .collect();

        Ok(Some(FaceLandmarks::new(points)))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
