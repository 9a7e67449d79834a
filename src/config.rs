// src/config.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
//! Construction-time configuration for [`crate::VideoDataset`].
//!
//! Builder helpers follow the same fluent style as `LoaderOptions`:
//!
//! let opts = VideoDatasetOptions::new("data/kinetics", "data/kinetics.json", "training")
//!     .format(ArchiveFormat::Zip)
//!     .frame_key("video")
//!     .seed(42);

use clap::ValueEnum;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_FRAME_KEY;

/// On-disk container used for per-video frame archives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)] // CLI shows zip, hdf5
pub enum ArchiveFormat {
    /// Zip file whose entries under `<key>/` are encoded frames.
    Zip,
    /// HDF5 file holding a variable-length `u8` dataset named `<key>`.
    Hdf5,
}

impl ArchiveFormat {
    /// File extension (without the dot) used to locate archives on disk.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Hdf5 => "hdf5",
        }
    }
}

impl Default for ArchiveFormat {
    fn default() -> Self {
        if cfg!(feature = "hdf5") {
            ArchiveFormat::Hdf5
        } else {
            ArchiveFormat::Zip
        }
    }
}

/// Everything needed to index a dataset and open its archives.
#[derive(Debug, Clone)]
pub struct VideoDatasetOptions {
    /// Directory holding `<label>/<video_id>.<ext>` archives.
    pub root: PathBuf,
    /// JSON annotation file with `labels` and `database`.
    pub annotation_path: PathBuf,
    /// Subset tag to keep (exact match), e.g. `training` or `validation`.
    pub subset: String,
    /// Archive container format.
    pub format: ArchiveFormat,
    /// Name of the frame collection inside each archive.
    pub frame_key: String,
    /// Base seed for per-sample augmentation randomness. `None` uses the
    /// thread-local RNG.
    pub seed: Option<u64>,
}

impl VideoDatasetOptions {
    pub fn new(
        root: impl AsRef<Path>,
        annotation_path: impl AsRef<Path>,
        subset: impl Into<String>,
    ) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            annotation_path: annotation_path.as_ref().to_path_buf(),
            subset: subset.into(),
            format: ArchiveFormat::default(),
            frame_key: DEFAULT_FRAME_KEY.to_string(),
            seed: None,
        }
    }

    /// Select the archive container format.
    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the frame collection name.
    pub fn frame_key(mut self, key: impl Into<String>) -> Self {
        self.frame_key = key.into();
        self
    }

    /// Make augmentation deterministic per sample index.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
