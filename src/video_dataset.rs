// src/video_dataset.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
//! Map-style dataset of labeled video clips.
//!
//! Construction indexes the annotation file once.  Each `get(index)` then
//! selects frame indices (optionally through a temporal transform), loads and
//! decodes the frames, runs them through the spatial transform and stacks the
//! result into a `(channel, time, height, width)` clip.
//!
//! `get` takes `&self` and touches no shared mutable state: per-clip
//! randomness comes from an RNG owned by the call, and every target is built
//! from a fresh copy of the sample descriptor.

use async_trait::async_trait;
use image::DynamicImage;
use log::info;
use ndarray::{Array3, Array4, ArrayView3, Axis};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::annotation::{self, ClassMapping, SampleDescriptor};
use crate::config::VideoDatasetOptions;
use crate::data_loader::dataset::{Dataset, DatasetError};
use crate::transforms::{FrameSelection, Target, Transforms};
use crate::video_loader::{ArchiveLoader, VideoLoader};
use crate::windowing::sliding_windows;

/// One dataset item: a single clip, or one clip per temporal window.
#[derive(Debug, Clone)]
pub enum ClipSample {
    Single { clip: Array4<f32>, target: Target },
    Multi { clips: Vec<Array4<f32>>, targets: Vec<Target> },
}

impl ClipSample {
    pub fn num_clips(&self) -> usize {
        match self {
            ClipSample::Single { .. } => 1,
            ClipSample::Multi { clips, .. } => clips.len(),
        }
    }
}

pub struct VideoDataset {
    samples: Vec<SampleDescriptor>,
    classes: ClassMapping,
    transforms: Transforms,
    loader: Box<dyn VideoLoader>,
    seed: Option<u64>,
    epoch: AtomicU64,
}

impl VideoDataset {
    /// Index `options.subset` and prepare for random access.
    pub fn new(options: &VideoDatasetOptions, transforms: Transforms) -> Result<Self, DatasetError> {
        let (samples, classes) = annotation::build(
            &options.root,
            &options.annotation_path,
            &options.subset,
            options.format.extension(),
        )?;
        let loader = ArchiveLoader::new(options.format, options.frame_key.clone());
        let mut ds = Self::from_samples(samples, classes, transforms, loader);
        ds.seed = options.seed;
        Ok(ds)
    }

    /// Build directly from an already indexed sample list.
    pub fn from_samples(
        samples: Vec<SampleDescriptor>,
        classes: ClassMapping,
        transforms: Transforms,
        loader: impl VideoLoader + 'static,
    ) -> Self {
        Self {
            samples,
            classes,
            transforms,
            loader: Box::new(loader),
            seed: None,
            epoch: AtomicU64::new(0),
        }
    }

    /// Swap the frame loader, e.g. for an in-memory one.
    pub fn with_loader(mut self, loader: impl VideoLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Select the augmentation stream for seeded gets.  Pair it with
    /// `LoaderOptions::epoch` so each epoch sees new crops and flips while
    /// staying reproducible.
    pub fn set_epoch(&self, epoch: u64) {
        self.epoch.store(epoch, Ordering::Relaxed);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[SampleDescriptor] {
        &self.samples
    }

    /// Class name <-> index mapping, in annotation vocabulary order.
    pub fn classes(&self) -> &ClassMapping {
        &self.classes
    }

    /// Re-segment every sample into `duration`-frame windows `stride` frames
    /// apart.  Replaces the sample list; call before sharing the dataset.
    pub fn apply_sliding_window(&mut self, duration: usize, stride: usize) -> Result<(), DatasetError> {
        let before = self.samples.len();
        self.samples = sliding_windows(&self.samples, duration, stride)?;
        info!(
            "sliding window (duration={duration}, stride={stride}): {before} -> {} samples",
            self.samples.len()
        );
        Ok(())
    }

    /// Load sample `index`, drawing augmentation randomness from the
    /// configured seed (mixed with `index`, on the current epoch's stream)
    /// or the thread-local RNG.
    pub fn get(&self, index: usize) -> Result<ClipSample, DatasetError> {
        match self.seed {
            Some(seed) => {
                let mut rng = ChaCha20Rng::seed_from_u64(seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
                rng.set_stream(self.epoch());
                self.get_with_rng(index, &mut rng)
            }
            None => self.get_with_rng(index, &mut rand::rng()),
        }
    }

    /// Load sample `index` using the caller's RNG.
    pub fn get_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<ClipSample, DatasetError> {
        let sample = self
            .samples
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange(index))?;

        let selection = match &self.transforms.temporal {
            Some(t) => t.apply(&sample.frame_indices, rng),
            None => FrameSelection::Single(sample.frame_indices.clone()),
        };

        match selection {
            FrameSelection::Single(indices) => {
                let clip = self.loading(&sample.video_path, &indices, rng)?;
                Ok(ClipSample::Single { clip, target: self.target(sample.clone()) })
            }
            FrameSelection::Multi(windows) => {
                let mut clips = Vec::with_capacity(windows.len());
                let mut targets = Vec::with_capacity(windows.len());
                for indices in &windows {
                    clips.push(self.loading(&sample.video_path, indices, rng)?);

                    let mut current = sample.clone();
                    if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
                        current.segment = (first, last + 1);
                    }
                    targets.push(self.target(current));
                }
                Ok(ClipSample::Multi { clips, targets })
            }
        }
    }

    fn target(&self, sample: SampleDescriptor) -> Target {
        match &self.transforms.target {
            Some(t) => t.apply(&sample),
            None => Target::Sample(sample),
        }
    }

    /// Fetch, transform and stack one clip.  Fewer decoded frames than
    /// requested is an error rather than a silently shorter clip.
    fn loading(&self, path: &Path, indices: &[usize], rng: &mut dyn RngCore) -> Result<Array4<f32>, DatasetError> {
        let mut frames = self.loader.load(path, indices)?;
        if frames.is_empty() || frames.len() < indices.len() {
            return Err(DatasetError::ShortRead {
                path: path.to_path_buf(),
                requested: indices.len(),
                got: frames.len(),
            });
        }

        if let Some(spatial) = &self.transforms.spatial {
            let per_frame = spatial.for_clip(rng);
            frames = frames.into_iter().map(&per_frame).collect();
        }

        let tensors = frames
            .iter()
            .map(to_chw)
            .collect::<Result<Vec<_>, _>>()?;
        stack_clip(&tensors)
    }
}

/// RGB frame -> `(C, H, W)` tensor with values in `[0, 1]`.
fn to_chw(img: &DynamicImage) -> Result<Array3<f32>, DatasetError> {
    let rgb = img.to_rgb32f();
    let (w, h) = rgb.dimensions();
    let hwc = Array3::from_shape_vec((h as usize, w as usize, 3), rgb.into_raw())
        .map_err(anyhow::Error::from)?;
    Ok(hwc.permuted_axes([2, 0, 1]))
}

/// `T x (C, H, W)` -> `(C, T, H, W)`, standard layout.
fn stack_clip(frames: &[Array3<f32>]) -> Result<Array4<f32>, DatasetError> {
    let expected = frames[0].shape().to_vec();
    if let Some(bad) = frames.iter().find(|f| f.shape() != expected.as_slice()) {
        return Err(DatasetError::ShapeMismatch {
            expected,
            got: bad.shape().to_vec(),
        });
    }
    let views: Vec<ArrayView3<f32>> = frames.iter().map(|f| f.view()).collect();
    let tchw = ndarray::stack(Axis(0), &views).map_err(anyhow::Error::from)?;
    Ok(tchw.permuted_axes([1, 0, 2, 3]).as_standard_layout().into_owned())
}

#[async_trait]
impl Dataset for VideoDataset {
    type Item = ClipSample;

    fn len(&self) -> Option<usize> {
        Some(self.samples.len())
    }

    async fn get(&self, index: usize) -> Result<Self::Item, DatasetError> {
        VideoDataset::get(self, index)
    }
}

impl std::fmt::Debug for VideoDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDataset")
            .field("samples", &self.samples.len())
            .field("classes", &self.classes.len())
            .field("seed", &self.seed)
            .field("epoch", &self.epoch())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    /// Frame `i` is a 4x2 image whose red channel is `i` and whose green
    /// channel is `50 * x`.  Stops at `len`.
    struct SyntheticLoader {
        len: usize,
    }

    impl VideoLoader for SyntheticLoader {
        fn load(&self, _path: &Path, frame_indices: &[usize]) -> Result<Vec<DynamicImage>, DatasetError> {
            Ok(frame_indices
                .iter()
                .take_while(|&&i| i < self.len)
                .map(|&i| {
                    DynamicImage::ImageRgb8(RgbImage::from_fn(4, 2, |x, _| Rgb([i as u8, (x * 50) as u8, 255])))
                })
                .collect())
        }
    }

    fn dataset(len: usize, transforms: Transforms) -> VideoDataset {
        let sample = SampleDescriptor {
            video_path: PathBuf::from("root/archery/v0.zip"),
            segment: (0, 6),
            frame_indices: (0..6).collect(),
            video_id: "v0".into(),
            label: 0,
        };
        let classes = ClassMapping::from_labels(["archery"]);
        VideoDataset::from_samples(vec![sample], classes, transforms, SyntheticLoader { len })
    }

    #[test]
    fn clip_axes_are_channel_time_height_width() {
        let ds = dataset(10, Transforms::default());
        let ClipSample::Single { clip, target } = ds.get(0).unwrap() else {
            panic!("expected a single clip");
        };
        assert_eq!(clip.shape(), &[3, 6, 2, 4]);
        assert!((clip[[0, 5, 0, 0]] - 5.0 / 255.0).abs() < 1e-6);
        assert_eq!(clip[[2, 0, 1, 3]], 1.0);
        assert!(matches!(target, Target::Sample(s) if s.segment == (0, 6)));
    }

    #[test]
    fn short_read_fails_fast() {
        let ds = dataset(4, Transforms::default());
        let err = ds.get(0).unwrap_err();
        assert!(matches!(err, DatasetError::ShortRead { requested: 6, got: 4, .. }));
    }

    #[test]
    fn out_of_range_index() {
        let ds = dataset(10, Transforms::default());
        assert!(matches!(ds.get(1), Err(DatasetError::IndexOutOfRange(1))));
    }

    #[test]
    fn multi_window_targets_get_their_own_segment() {
        let t = Transforms::default()
            .temporal(|_: &[usize]| FrameSelection::Multi(vec![vec![0, 1], vec![2, 3]]));
        let ds = dataset(10, t);
        let ClipSample::Multi { clips, targets } = ds.get(0).unwrap() else {
            panic!("expected multiple clips");
        };
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[1].shape(), &[3, 2, 2, 4]);
        let segs: Vec<_> = targets
            .iter()
            .map(|t| match t {
                Target::Sample(s) => s.segment,
                other => panic!("unexpected target {other:?}"),
            })
            .collect();
        assert_eq!(segs, vec![(0, 2), (2, 4)]);
        // the indexed sample is untouched
        assert_eq!(ds.samples()[0].segment, (0, 6));
    }

    #[test]
    fn seeded_gets_are_reproducible() {
        use crate::transforms::RandomCrop;
        let ds = dataset(10, Transforms::default().spatial(RandomCrop::new(2, 1))).with_seed(3);
        let a = ds.get(0).unwrap();
        let b = ds.get(0).unwrap();
        match (a, b) {
            (ClipSample::Single { clip: a, .. }, ClipSample::Single { clip: b, .. }) => assert_eq!(a, b),
            _ => panic!("expected single clips"),
        }
    }

    fn augmented(seed: u64) -> VideoDataset {
        use crate::transforms::{RandomCrop, RandomHorizontalFlip, SpatialCompose};
        let spatial = SpatialCompose::new(vec![
            Box::new(RandomCrop::new(2, 1)),
            Box::new(RandomHorizontalFlip::new(0.5)),
        ]);
        dataset(10, Transforms::default().spatial(spatial)).with_seed(seed)
    }

    /// Green channel of time step `t`, as a flat vector.
    fn green(sample: &ClipSample, t: usize) -> Vec<f32> {
        let ClipSample::Single { clip, .. } = sample else {
            panic!("expected a single clip");
        };
        clip.index_axis(Axis(0), 1).index_axis(Axis(0), t).iter().copied().collect()
    }

    #[test]
    fn each_epoch_draws_new_augmentation() {
        let ds = augmented(3);
        let mut draws: Vec<Vec<f32>> = Vec::new();
        for epoch in 0..20 {
            ds.set_epoch(epoch);
            let g = green(&ds.get(0).unwrap(), 0);
            if !draws.contains(&g) {
                draws.push(g);
            }
        }
        assert!(draws.len() > 1, "every epoch produced the same crop/flip");

        ds.set_epoch(7);
        let a = ds.get(0).unwrap();
        let b = ds.get(0).unwrap();
        assert_eq!(green(&a, 0), green(&b, 0));
        assert_eq!(ds.epoch(), 7);
    }

    #[test]
    fn augmentation_is_drawn_once_per_clip() {
        let ds = augmented(11);
        for epoch in 0..8 {
            ds.set_epoch(epoch);
            let item = ds.get(0).unwrap();
            let first = green(&item, 0);
            for t in 1..6 {
                assert_eq!(green(&item, t), first, "epoch {epoch}: frame {t} was cropped or flipped differently");
            }
        }
    }
}
