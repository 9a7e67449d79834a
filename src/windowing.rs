// src/windowing.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Sliding-window re-segmentation of a sample list.

use crate::annotation::SampleDescriptor;
use crate::data_loader::dataset::DatasetError;

/// Expand every sample `[t0, t1)` into windows starting at
/// `t0, t0 + stride, ...` while the start is `< t1`.  Each window ends at
/// `min(start + duration, t1)`, so the last one may be short.
pub fn sliding_windows(
    samples: &[SampleDescriptor],
    duration: usize,
    stride: usize,
) -> Result<Vec<SampleDescriptor>, DatasetError> {
    if duration == 0 || stride == 0 {
        return Err(DatasetError::InvalidWindow { duration, stride });
    }

    let mut out = Vec::with_capacity(samples.len());
    for sample in samples {
        let (t_begin, t_end) = sample.segment;
        for t in (t_begin..t_end).step_by(stride) {
            out.push(sample.with_segment(t, (t + duration).min(t_end)));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample(start: usize, end: usize) -> SampleDescriptor {
        SampleDescriptor {
            video_path: PathBuf::from("root/cls/vid.zip"),
            segment: (start, end),
            frame_indices: (start..end).collect(),
            video_id: "vid".into(),
            label: 3,
        }
    }

    #[test]
    fn last_window_is_short() {
        let w = sliding_windows(&[sample(0, 10)], 4, 4).unwrap();
        let segs: Vec<_> = w.iter().map(|s| s.segment).collect();
        assert_eq!(segs, vec![(0, 4), (4, 8), (8, 10)]);
        assert_eq!(w[2].frame_indices, vec![8, 9]);
        assert!(w.iter().all(|s| s.label == 3 && s.video_id == "vid"));
    }

    #[test]
    fn overlapping_windows() {
        let w = sliding_windows(&[sample(2, 9)], 4, 2).unwrap();
        let segs: Vec<_> = w.iter().map(|s| s.segment).collect();
        assert_eq!(segs, vec![(2, 6), (4, 8), (6, 9), (8, 9)]);
    }

    #[test]
    fn windows_keep_sample_order() {
        let w = sliding_windows(&[sample(0, 3), sample(10, 12)], 2, 2).unwrap();
        let segs: Vec<_> = w.iter().map(|s| s.segment).collect();
        assert_eq!(segs, vec![(0, 2), (2, 3), (10, 12)]);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let err = sliding_windows(&[sample(0, 10)], 4, 0).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidWindow { stride: 0, .. }));
    }
}
