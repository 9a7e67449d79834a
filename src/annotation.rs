// src/annotation.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
//! Annotation indexing: JSON annotation file -> flat list of samples.
//!
//! The annotation file looks like
//!
//! ```json
//! { "labels": ["archery", "bowling"],
//!   "database": {
//!     "vid_a": { "subset": "training",
//!                "annotations": { "label": "archery", "segment": [1, 151] } } } }
//! ```
//!
//! `annotations` may be a single object or a list of them.  Entries without a
//! `label` belong to the unlabeled split and map to label `-1`.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::constants::{DEGENERATE_SEGMENT_END, PROGRESS_STEPS, UNLABELED_CLASS, UNLABELED_INDEX};
use crate::data_loader::dataset::DatasetError;

/// One trainable span of one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleDescriptor {
    /// Archive holding the video's frames.
    pub video_path: PathBuf,
    /// Half-open frame range `[start, end)`.
    pub segment: (usize, usize),
    /// Frames to load, normally `start..end`.
    pub frame_indices: Vec<usize>,
    pub video_id: String,
    /// Class index, or `-1` for unlabeled samples.
    pub label: i64,
}

impl SampleDescriptor {
    /// Copy of `self` covering `[start, end)` instead of the original span.
    pub fn with_segment(&self, start: usize, end: usize) -> Self {
        Self {
            segment: (start, end),
            frame_indices: (start..end).collect(),
            ..self.clone()
        }
    }
}

/// Bijection between class names and dense indices `0..K`, in vocabulary
/// order.  Index stability across runs depends on that order, so the
/// mapping is never sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMapping {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassMapping {
    /// Build from the vocabulary; a repeated name keeps its first index.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mapping = Self::default();
        for label in labels {
            let label = label.into();
            if !mapping.index.contains_key(&label) {
                mapping.index.insert(label.clone(), mapping.names.len());
                mapping.names.push(label);
            }
        }
        mapping
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Dense index of class `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Class name at `index`.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Class names ordered by index.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationEntry {
    #[serde(default)]
    pub label: Option<String>,
    pub segment: [usize; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Annotations {
    One(AnnotationEntry),
    Many(Vec<AnnotationEntry>),
}

impl Default for Annotations {
    fn default() -> Self {
        Annotations::Many(Vec::new())
    }
}

impl Annotations {
    pub fn entries(&self) -> &[AnnotationEntry] {
        match self {
            Annotations::One(e) => std::slice::from_ref(e),
            Annotations::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoRecord {
    pub subset: String,
    #[serde(default)]
    pub annotations: Annotations,
}

/// Parsed annotation file.  `database` keeps file order.
#[derive(Debug, Clone)]
pub struct AnnotationFile {
    pub labels: Vec<String>,
    pub database: Vec<(String, VideoRecord)>,
}

#[derive(Deserialize)]
struct RawAnnotationFile {
    labels: Vec<String>,
    database: serde_json::Map<String, serde_json::Value>,
}

impl AnnotationFile {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let raw: RawAnnotationFile = serde_json::from_reader(reader)?;
        let database = raw
            .database
            .into_iter()
            .map(|(id, value)| Ok((id, serde_json::from_value::<VideoRecord>(value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(Self { labels: raw.labels, database })
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Video ids and records whose subset tag equals `subset` exactly.
    pub fn subset<'a>(&'a self, subset: &'a str) -> impl Iterator<Item = (&'a str, &'a VideoRecord)> + 'a {
        self.database
            .iter()
            .filter(move |(_, rec)| rec.subset == subset)
            .map(|(id, rec)| (id.as_str(), rec))
    }
}

/// Build the flat sample list for `subset`.
///
/// Candidates whose archive `<root>/<label>/<video_id>.<ext>` does not exist
/// are dropped, as are degenerate segments (`end == 1` or `end <= start`).
/// A label missing from the vocabulary is an error.
pub fn make_dataset(
    root: &Path,
    annotation: &AnnotationFile,
    subset: &str,
    extension: &str,
) -> Result<(Vec<SampleDescriptor>, ClassMapping), DatasetError> {
    let classes = ClassMapping::from_labels(annotation.labels.iter().cloned());

    let candidates: Vec<(&str, &AnnotationEntry)> = annotation
        .subset(subset)
        .flat_map(|(id, rec)| rec.annotations.entries().iter().map(move |e| (id, e)))
        .collect();

    let total = candidates.len();
    let step = (total / PROGRESS_STEPS).max(1);
    let mut dataset = Vec::with_capacity(total);
    let (mut missing, mut degenerate) = (0usize, 0usize);

    for (i, (video_id, entry)) in candidates.into_iter().enumerate() {
        if i % step == 0 {
            info!("dataset loading [{i}/{total}]");
        }

        let (label_name, label) = match &entry.label {
            Some(name) => {
                let idx = classes.index_of(name).ok_or_else(|| DatasetError::UnknownLabel {
                    label: name.clone(),
                    video_id: video_id.to_string(),
                })?;
                (name.as_str(), idx as i64)
            }
            None => (UNLABELED_CLASS, UNLABELED_INDEX),
        };

        let video_path = root.join(label_name).join(format!("{video_id}.{extension}"));
        if !video_path.exists() {
            debug!("skipping {video_id}: {} not found", video_path.display());
            missing += 1;
            continue;
        }

        let [start, end] = entry.segment;
        if end == DEGENERATE_SEGMENT_END || end <= start {
            debug!("skipping {video_id}: degenerate segment [{start}, {end})");
            degenerate += 1;
            continue;
        }

        dataset.push(SampleDescriptor {
            video_path,
            segment: (start, end),
            frame_indices: (start..end).collect(),
            video_id: video_id.to_string(),
            label,
        });
    }

    info!(
        "subset {subset:?}: {} samples, {} classes ({missing} missing archives, {degenerate} degenerate segments skipped)",
        dataset.len(),
        classes.len()
    );
    Ok((dataset, classes))
}

/// Load `annotation_path` and index `subset` under `root`.
pub fn build(
    root: &Path,
    annotation_path: &Path,
    subset: &str,
    extension: &str,
) -> Result<(Vec<SampleDescriptor>, ClassMapping), DatasetError> {
    let annotation = AnnotationFile::load(annotation_path)?;
    make_dataset(root, &annotation, subset, extension)
}
