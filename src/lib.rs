// src/lib.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
// Crate root: public modules plus re-exports of the main API.

pub mod constants;
pub mod config;
pub mod data_formats;
pub mod data_loader;

pub mod annotation;
pub mod windowing;
pub mod transforms;
pub mod video_loader;
pub mod video_dataset;
pub mod collate;

// ===== Re-exports at the crate root =====
// Data loader types:
pub use crate::data_loader::dataloader::DataLoader;
pub use crate::data_loader::dataset::{Dataset, DatasetError};
pub use crate::data_loader::options::LoaderOptions;
// Module alias so tests can use `vidclip::dataset::DynStream`:
pub use crate::data_loader::dataset;

// Video pipeline:
pub use crate::annotation::{ClassMapping, SampleDescriptor};
pub use crate::collate::{collate, BatchTargets, ClipBatch};
pub use crate::config::{ArchiveFormat, VideoDatasetOptions};
pub use crate::transforms::{FrameSelection, Target, Transforms};
pub use crate::video_dataset::{ClipSample, VideoDataset};
pub use crate::video_loader::{ArchiveLoader, VideoLoader};
pub use crate::windowing::sliding_windows;
