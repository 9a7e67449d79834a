// src/transforms/mod.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Spatial, temporal, and target transforms consumed by `VideoDataset`.

pub mod spatial;
pub mod target;
pub mod temporal;

pub use spatial::{CenterCrop, FrameFn, RandomCrop, RandomHorizontalFlip, Resize, SpatialCompose, SpatialTransform};
pub use target::{ClassLabel, Target, TargetCompose, TargetTransform, VideoId};
pub use temporal::{
    FrameSelection, LoopPadding, SlidingWindow, TemporalBeginCrop, TemporalCenterCrop, TemporalCompose,
    TemporalEvenCrop, TemporalRandomCrop, TemporalSubsampling, TemporalTransform,
};

/// The optional transform stages of a `VideoDataset`.  An absent stage is
/// skipped.
#[derive(Default)]
pub struct Transforms {
    pub spatial: Option<Box<dyn SpatialTransform>>,
    pub temporal: Option<Box<dyn TemporalTransform>>,
    pub target: Option<Box<dyn TargetTransform>>,
}

impl Transforms {
    pub fn spatial(mut self, t: impl SpatialTransform + 'static) -> Self {
        self.spatial = Some(Box::new(t));
        self
    }

    pub fn temporal(mut self, t: impl TemporalTransform + 'static) -> Self {
        self.temporal = Some(Box::new(t));
        self
    }

    pub fn target(mut self, t: impl TargetTransform + 'static) -> Self {
        self.target = Some(Box::new(t));
        self
    }
}
