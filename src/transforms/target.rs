// src/transforms/target.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Targets emitted next to each clip.

use serde::Serialize;

use crate::annotation::SampleDescriptor;

/// What a sample's target turned into.  Without a target transform the
/// whole descriptor is returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Target {
    Label(i64),
    VideoId(String),
    Sample(SampleDescriptor),
    Compose(Vec<Target>),
}

impl Target {
    pub fn as_label(&self) -> Option<i64> {
        match self {
            Target::Label(l) => Some(*l),
            _ => None,
        }
    }
}

pub trait TargetTransform: Send + Sync {
    fn apply(&self, sample: &SampleDescriptor) -> Target;
}

impl<F> TargetTransform for F
where
    F: Fn(&SampleDescriptor) -> Target + Send + Sync,
{
    fn apply(&self, sample: &SampleDescriptor) -> Target {
        self(sample)
    }
}

/// The class index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassLabel;

impl TargetTransform for ClassLabel {
    fn apply(&self, sample: &SampleDescriptor) -> Target {
        Target::Label(sample.label)
    }
}

/// The video id.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoId;

impl TargetTransform for VideoId {
    fn apply(&self, sample: &SampleDescriptor) -> Target {
        Target::VideoId(sample.video_id.clone())
    }
}

/// Several targets side by side, e.g. label and video id for evaluation.
pub struct TargetCompose {
    transforms: Vec<Box<dyn TargetTransform>>,
}

impl TargetCompose {
    pub fn new(transforms: Vec<Box<dyn TargetTransform>>) -> Self {
        Self { transforms }
    }
}

impl TargetTransform for TargetCompose {
    fn apply(&self, sample: &SampleDescriptor) -> Target {
        Target::Compose(self.transforms.iter().map(|t| t.apply(sample)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> SampleDescriptor {
        SampleDescriptor {
            video_path: PathBuf::from("r/bowling/v9.zip"),
            segment: (0, 16),
            frame_indices: (0..16).collect(),
            video_id: "v9".into(),
            label: 1,
        }
    }

    #[test]
    fn compose_keeps_order() {
        let t = TargetCompose::new(vec![Box::new(ClassLabel), Box::new(VideoId)]);
        assert_eq!(
            t.apply(&sample()),
            Target::Compose(vec![Target::Label(1), Target::VideoId("v9".into())])
        );
    }

    #[test]
    fn label_targets_serialize_as_numbers() {
        let json = serde_json::to_string(&ClassLabel.apply(&sample())).unwrap();
        assert_eq!(json, "1");
    }
}
