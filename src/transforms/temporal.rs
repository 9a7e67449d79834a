// src/transforms/temporal.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Frame-index selection.  A temporal transform either picks one window
//! (`FrameSelection::Single`) or fans a sample out into several windows
//! (`FrameSelection::Multi`), each of which becomes its own clip.

use rand::{Rng, RngCore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSelection {
    Single(Vec<usize>),
    Multi(Vec<Vec<usize>>),
}

pub trait TemporalTransform: Send + Sync {
    fn apply(&self, frame_indices: &[usize], rng: &mut dyn RngCore) -> FrameSelection;
}

impl<F> TemporalTransform for F
where
    F: Fn(&[usize]) -> FrameSelection + Send + Sync,
{
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        self(frame_indices)
    }
}

/// Repeat `indices` from the start until it holds `size` entries.
fn loop_pad(mut indices: Vec<usize>, size: usize) -> Vec<usize> {
    if indices.is_empty() {
        return indices;
    }
    let mut i = 0;
    while indices.len() < size {
        indices.push(indices[i]);
        i += 1;
    }
    indices
}

fn window(frame_indices: &[usize], begin: usize, size: usize) -> Vec<usize> {
    let end = (begin + size).min(frame_indices.len());
    loop_pad(frame_indices[begin.min(end)..end].to_vec(), size)
}

/// Pad short samples to `size` frames by looping; longer samples pass
/// through untouched.
#[derive(Debug, Clone)]
pub struct LoopPadding {
    pub size: usize,
}

impl TemporalTransform for LoopPadding {
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        FrameSelection::Single(loop_pad(frame_indices.to_vec(), self.size))
    }
}

/// First `size` frames.
#[derive(Debug, Clone)]
pub struct TemporalBeginCrop {
    pub size: usize,
}

impl TemporalTransform for TemporalBeginCrop {
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        FrameSelection::Single(window(frame_indices, 0, self.size))
    }
}

/// `size` frames around the middle.
#[derive(Debug, Clone)]
pub struct TemporalCenterCrop {
    pub size: usize,
}

impl TemporalTransform for TemporalCenterCrop {
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        let begin = (frame_indices.len() / 2).saturating_sub(self.size / 2);
        FrameSelection::Single(window(frame_indices, begin, self.size))
    }
}

/// `size` frames starting at a uniformly random offset.
#[derive(Debug, Clone)]
pub struct TemporalRandomCrop {
    pub size: usize,
}

impl TemporalTransform for TemporalRandomCrop {
    fn apply(&self, frame_indices: &[usize], rng: &mut dyn RngCore) -> FrameSelection {
        let last_begin = frame_indices.len().saturating_sub(self.size + 1);
        let begin = rng.random_range(0..=last_begin);
        FrameSelection::Single(window(frame_indices, begin, self.size))
    }
}

/// Up to `n_samples` windows of `size` frames spread evenly over the sample.
#[derive(Debug, Clone)]
pub struct TemporalEvenCrop {
    pub size: usize,
    pub n_samples: usize,
}

impl TemporalTransform for TemporalEvenCrop {
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        let n = frame_indices.len();
        let gaps = self.n_samples.saturating_sub(1).max(1);
        let stride = n.saturating_sub(1 + self.size).div_ceil(gaps).max(1);

        let windows = (0..n)
            .step_by(stride)
            .take(self.n_samples)
            .map(|begin| window(frame_indices, begin, self.size))
            .collect();
        FrameSelection::Multi(windows)
    }
}

/// Every window of `size` frames, `stride` frames apart.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    pub size: usize,
    pub stride: usize,
}

impl SlidingWindow {
    /// Non-overlapping windows.
    pub fn new(size: usize) -> Self {
        Self { size, stride: size }
    }
}

impl TemporalTransform for SlidingWindow {
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        let windows = (0..frame_indices.len())
            .step_by(self.stride.max(1))
            .map(|begin| window(frame_indices, begin, self.size))
            .collect();
        FrameSelection::Multi(windows)
    }
}

/// Keep every `stride`-th frame.
#[derive(Debug, Clone)]
pub struct TemporalSubsampling {
    pub stride: usize,
}

impl TemporalTransform for TemporalSubsampling {
    fn apply(&self, frame_indices: &[usize], _rng: &mut dyn RngCore) -> FrameSelection {
        FrameSelection::Single(frame_indices.iter().copied().step_by(self.stride.max(1)).collect())
    }
}

/// Run transforms in order.  Once a stage fans out, the remaining stages
/// run on each window separately and their outputs are flattened.
pub struct TemporalCompose {
    transforms: Vec<Box<dyn TemporalTransform>>,
}

impl TemporalCompose {
    pub fn new(transforms: Vec<Box<dyn TemporalTransform>>) -> Self {
        Self { transforms }
    }
}

fn compose(stages: &[Box<dyn TemporalTransform>], frame_indices: &[usize], rng: &mut dyn RngCore) -> FrameSelection {
    let mut current = frame_indices.to_vec();
    for (i, stage) in stages.iter().enumerate() {
        match stage.apply(&current, rng) {
            FrameSelection::Single(next) => current = next,
            FrameSelection::Multi(windows) => {
                let rest = &stages[i + 1..];
                let mut out = Vec::with_capacity(windows.len());
                for w in windows {
                    match compose(rest, &w, rng) {
                        FrameSelection::Single(v) => out.push(v),
                        FrameSelection::Multi(vs) => out.extend(vs),
                    }
                }
                return FrameSelection::Multi(out);
            }
        }
    }
    FrameSelection::Single(current)
}

impl TemporalTransform for TemporalCompose {
    fn apply(&self, frame_indices: &[usize], rng: &mut dyn RngCore) -> FrameSelection {
        compose(&self.transforms, frame_indices, rng)
    }
}
