// src/data_loader/mod.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Dataset trait, batching options, index samplers and the `DataLoader`
//! that ties them together.

pub mod dataloader;
pub mod dataset;
pub mod options;
pub mod sampler;

pub use dataloader::DataLoader;
pub use dataset::{Dataset, DatasetError, DynStream};
pub use options::LoaderOptions;
pub use sampler::{Sampler, SequentialSampler, ShuffleSampler};
