use std::collections::VecDeque;

use crate::viewer::RawSample;

/// 視点推定値の供給元
///
/// 描画ループから毎フレーム呼ばれる。1フレーム分の時間以上ブロックしないこと。
/// None はトラッキングロスト（エラーではない）。
pub trait LandmarkSampler {
    fn poll_sample(&mut self) -> Option<RawSample>;
}

impl<S: LandmarkSampler + ?Sized> LandmarkSampler for Box<S> {
    fn poll_sample(&mut self) -> Option<RawSample> {
        (**self).poll_sample()
    }
}

/// 事前に用意した列を順に返すサンプラー。列が尽きたら None を返し続ける
#[derive(Debug, Clone, Default)]
pub struct ReplaySampler {
    samples: VecDeque<Option<RawSample>>,
}

impl ReplaySampler {
    pub fn new<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = Option<RawSample>>,
    {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// 同じサンプルを n フレーム分
    pub fn repeat(sample: Option<RawSample>, frames: usize) -> Self {
        Self::new(std::iter::repeat(sample).take(frames))
    }

    pub fn push(&mut self, sample: Option<RawSample>) {
        self.samples.push_back(sample);
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl LandmarkSampler for ReplaySampler {
    fn poll_sample(&mut self) -> Option<RawSample> {
        self.samples.pop_front().flatten()
    }
}
