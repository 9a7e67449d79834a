// src/data_loader/dataset.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Core dataset abstractions for vidclip's data loader.
//!
//! A map-style dataset exposes `len()` and random access through `get()`;
//! an iterable one hands out an async stream instead.  `VideoDataset` is
//! map-style; the stream path is kept so the `DataLoader` stays generic.

use async_trait::async_trait;
use futures_core::stream::Stream;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use anyhow::Error as AnyError;

/// A boxed, pinned, sendable async stream of fallible items.
pub type DynStream<T> =
    Pin<Box<dyn Stream<Item = Result<T, DatasetError>> + Send + 'static>>;

/// Item-level error type for dataset, archive, and collation operations.
///
/// Nothing here is retried; the training loop decides whether to skip the
/// sample or abort.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("operation not supported for this dataset type")]
    Unsupported,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid annotation file: {0}")]
    Annotation(#[from] serde_json::Error),

    #[error("video {video_id}: label {label:?} is not in the label vocabulary")]
    UnknownLabel { label: String, video_id: String },

    #[error("frame archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: AnyError,
    },

    #[error("frame {index} of {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        index: usize,
        #[source]
        source: image::ImageError,
    },

    #[error("{}: requested {requested} frames but archive yielded {got}", path.display())]
    ShortRead {
        path: PathBuf,
        requested: usize,
        got: usize,
    },

    #[error("sliding window needs duration >= 1 and stride >= 1 (got duration={duration}, stride={stride})")]
    InvalidWindow { duration: usize, stride: usize },

    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    #[error("cannot collate an empty batch")]
    EmptyBatch,

    #[error(transparent)]
    Backend(#[from] AnyError),
}

// Mapping from string to error
impl From<String> for DatasetError {
    fn from(s: String) -> Self {
        DatasetError::Backend(AnyError::msg(s))
    }
}

impl From<&str> for DatasetError {
    fn from(s: &str) -> Self {
        DatasetError::Backend(AnyError::msg(s.to_string()))
    }
}

/// A logical collection of **samples**.
///
/// Implementors fall into two broad categories:
///
/// * **Map-style** – support random access through [`Dataset::get`];
///   `len()` normally returns `Some(_)`.
/// * **Iterable** – deliver data solely via `as_stream`; `len()` often
///   returns `None`.
#[async_trait]
pub trait Dataset: Send + Sync + 'static {
    /// Concrete Rust type produced for each sample.
    type Item: Send + 'static;

    /// Total number of samples if known *a priori*; otherwise `None`.
    fn len(&self) -> Option<usize>;

    /// Retrieve a sample by zero-based index.  Iterable-only datasets may
    /// return `DatasetError::Unsupported`.
    async fn get(&self, index: usize) -> Result<Self::Item, DatasetError>;

    /// Provide an async stream of samples if the dataset is iterable.
    /// Map-style datasets can simply keep the default (`None`).
    fn as_stream(&self) -> Option<DynStream<Self::Item>> {
        None
    }

    /// Convenience helper.
    fn is_empty(&self) -> bool {
        self.len().map(|n| n == 0).unwrap_or(false)
    }
}
