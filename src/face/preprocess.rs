use anyhow::Result;
use ndarray::Array4;
use opencv::{
    core::{AlgorithmHint, Mat, Rect, Size, CV_32FC3},
    imgproc,
    prelude::*,
};

use super::crop::CropRegion;

/// OpenCV Mat をフェイスメッシュ用の入力テンソルに変換
///
/// - crop の領域を切り出す（前フレームの顔範囲、なければフレーム中央の正方形）
/// - BGR -> RGB
/// - input_size x input_size にリサイズ
/// - [1, size, size, 3] の f32 テンソル (0.0-1.0)
///
/// 検出結果は同じ crop でフレーム座標に戻すこと
pub fn preprocess_for_face_mesh(frame: &Mat, crop: &CropRegion, input_size: i32) -> Result<Array4<f32>> {
    let frame_w = frame.cols() as u32;
    let frame_h = frame.rows() as u32;
    let (x, y, w, h) = crop.to_pixels(frame_w, frame_h);
    if w <= 0 || h <= 0 {
        anyhow::bail!("Empty crop region {:?}", crop);
    }
    let roi = Mat::roi(frame, Rect::new(x, y, w, h))?;

    let mut rgb = Mat::default();
    imgproc::cvt_color(&roi, &mut rgb, imgproc::COLOR_BGR2RGB, 0, AlgorithmHint::ALGO_HINT_DEFAULT)?;

    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(input_size, input_size),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, CV_32FC3, 1.0 / 255.0, 0.0)?;

    let size = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for y in 0..input_size {
        for x in 0..input_size {
            let pixel = float_mat.at_2d::<opencv::core::Vec3f>(y, x)?;
            tensor[[0, y as usize, x as usize, 0]] = pixel[0];
            tensor[[0, y as usize, x as usize, 1]] = pixel[1];
            tensor[[0, y as usize, x as usize, 2]] = pixel[2];
        }
    }

    Ok(tensor)
}
