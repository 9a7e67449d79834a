// src/collate.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Batch collation for `VideoDataset` items.
//!
//! Multi-window items are flattened in order, so a batch of two items with
//! two windows each becomes four clips.  All clips must have the same shape.

use ndarray::{Array1, Array4, Array5, ArrayView4, Axis};

use crate::data_loader::dataset::DatasetError;
use crate::transforms::Target;
use crate::video_dataset::ClipSample;

/// Targets of one batch: a label tensor when every target is a class
/// label, otherwise the targets themselves in batch order.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchTargets {
    Labels(Array1<i64>),
    List(Vec<Target>),
}

#[derive(Debug, Clone)]
pub struct ClipBatch {
    /// `(batch, channel, time, height, width)`
    pub clips: Array5<f32>,
    pub targets: BatchTargets,
}

impl ClipBatch {
    pub fn len(&self) -> usize {
        self.clips.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn collate(batch: Vec<ClipSample>) -> Result<ClipBatch, DatasetError> {
    let mut clips: Vec<Array4<f32>> = Vec::with_capacity(batch.len());
    let mut targets: Vec<Target> = Vec::with_capacity(batch.len());
    for item in batch {
        match item {
            ClipSample::Single { clip, target } => {
                clips.push(clip);
                targets.push(target);
            }
            ClipSample::Multi { clips: c, targets: t } => {
                clips.extend(c);
                targets.extend(t);
            }
        }
    }

    let first = clips.first().ok_or(DatasetError::EmptyBatch)?;
    let expected = first.shape().to_vec();
    if let Some(bad) = clips.iter().find(|c| c.shape() != expected.as_slice()) {
        return Err(DatasetError::ShapeMismatch {
            expected,
            got: bad.shape().to_vec(),
        });
    }

    let views: Vec<ArrayView4<f32>> = clips.iter().map(|c| c.view()).collect();
    let stacked = ndarray::stack(Axis(0), &views).map_err(anyhow::Error::from)?;

    let targets = match targets.iter().map(Target::as_label).collect::<Option<Vec<i64>>>() {
        Some(labels) => BatchTargets::Labels(Array1::from(labels)),
        None => BatchTargets::List(targets),
    };

    Ok(ClipBatch { clips: stacked, targets })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(t: usize, fill: f32) -> Array4<f32> {
        Array4::from_elem((3, t, 2, 2), fill)
    }

    #[test]
    fn labels_become_a_tensor() {
        let batch = vec![
            ClipSample::Single { clip: clip(4, 0.0), target: Target::Label(0) },
            ClipSample::Single { clip: clip(4, 1.0), target: Target::Label(1) },
        ];
        let out = collate(batch).unwrap();
        assert_eq!(out.clips.shape(), &[2, 3, 4, 2, 2]);
        assert_eq!(out.clips[[1, 0, 0, 0, 0]], 1.0);
        assert_eq!(out.targets, BatchTargets::Labels(Array1::from(vec![0, 1])));
    }

    #[test]
    fn structured_targets_stay_a_list() {
        let batch = vec![
            ClipSample::Single { clip: clip(2, 0.0), target: Target::VideoId("a".into()) },
            ClipSample::Single { clip: clip(2, 0.0), target: Target::VideoId("b".into()) },
        ];
        let out = collate(batch).unwrap();
        assert_eq!(
            out.targets,
            BatchTargets::List(vec![Target::VideoId("a".into()), Target::VideoId("b".into())])
        );
    }

    #[test]
    fn multi_window_items_are_flattened_in_order() {
        let item = |base: f32, label: i64| ClipSample::Multi {
            clips: vec![clip(2, base), clip(2, base + 1.0)],
            targets: vec![Target::Label(label), Target::Label(label)],
        };
        let out = collate(vec![item(0.0, 7), item(10.0, 8)]).unwrap();
        assert_eq!(out.len(), 4);
        let firsts: Vec<f32> = (0..4).map(|i| out.clips[[i, 0, 0, 0, 0]]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 10.0, 11.0]);
        assert_eq!(out.targets, BatchTargets::Labels(Array1::from(vec![7, 7, 8, 8])));
    }

    #[test]
    fn mismatched_shapes_are_fatal() {
        let batch = vec![
            ClipSample::Single { clip: clip(4, 0.0), target: Target::Label(0) },
            ClipSample::Single { clip: clip(3, 0.0), target: Target::Label(0) },
        ];
        let err = collate(batch).unwrap_err();
        assert!(matches!(err, DatasetError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_batch_is_an_error() {
        assert!(matches!(collate(Vec::new()), Err(DatasetError::EmptyBatch)));
    }
}
