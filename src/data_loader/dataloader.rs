// src/data_loader/dataloader.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Sequential `DataLoader`.
//!
//! * Handles **map-style** and **iterable** datasets transparently.
//! * Yields `Result<Vec<Item>, DatasetError>` where each `Vec` is a batch;
//!   for `VideoDataset` hand each batch to [`crate::collate`].
//! * Map-style datasets are visited through a `Sampler` (shuffled when
//!   `LoaderOptions::shuffle` is set, reshuffled per `epoch`).

use crate::data_loader::dataset::{Dataset, DatasetError};
use crate::data_loader::options::LoaderOptions;
use crate::data_loader::sampler::{Sampler, SequentialSampler, ShuffleSampler};

use async_stream::try_stream;
use futures_core::stream::Stream;
use futures_util::StreamExt;
use std::pin::Pin;
use std::sync::Arc;

/// High-level iterator that produces batched samples from a dataset.
pub struct DataLoader<D>
where
    D: Dataset,
{
    dataset: Arc<D>,
    opts: LoaderOptions,
}

impl<D> DataLoader<D>
where
    D: Dataset,
{
    /// Create a new loader.
    pub fn new(dataset: D, opts: LoaderOptions) -> Self {
        Self {
            dataset: Arc::new(dataset),
            opts,
        }
    }

    /// Share an already-wrapped dataset between several loaders.
    pub fn from_arc(dataset: Arc<D>, opts: LoaderOptions) -> Self {
        Self { dataset, opts }
    }

    /// Return an **async stream** over the dataset that yields batches.
    ///
    /// ```ignore
    /// # use vidclip::{collate, DataLoader, LoaderOptions, VideoDataset};
    /// # async fn demo(ds: VideoDataset) -> anyhow::Result<()> {
    /// let loader = DataLoader::new(ds, LoaderOptions::default());
    /// let mut batches = loader.stream();
    /// while let Some(batch) = batches.next().await {
    ///     let batch = collate(batch?)?;
    ///     // training step ...
    /// }
    /// # Ok(()) }
    /// ```
    pub fn stream(
        self,
    ) -> Pin<
        Box<dyn Stream<Item = Result<Vec<D::Item>, DatasetError>> + Send + 'static>,
    > {
        let ds = self.dataset.clone();
        let opts = self.opts.clone();

        Box::pin(try_stream! {
            let bs = opts.batch_size.max(1);

            // -------- Iterable dataset -----------------------------------
            if let Some(mut st) = ds.as_stream() {
                let mut acc = Vec::with_capacity(bs);
                while let Some(item) = st.next().await {
                    acc.push(item?);
                    if acc.len() == bs {
                        yield std::mem::take(&mut acc);
                    }
                }
                if !acc.is_empty() && !opts.drop_last {
                    yield acc;
                }
                return;
            }

            // -------- Map-style dataset -----------------------------------
            let total = ds.len().ok_or(DatasetError::Unsupported)?;
            let sampler: Box<dyn Sampler> = if opts.shuffle {
                Box::new(ShuffleSampler::for_epoch(total, opts.seed, opts.epoch))
            } else {
                Box::new(SequentialSampler::new(total))
            };

            let mut batch = Vec::with_capacity(bs);
            for index in sampler {
                batch.push(ds.get(index).await?);
                if batch.len() == bs {
                    yield std::mem::take(&mut batch);
                }
            }
            if !batch.is_empty() && !opts.drop_last {
                yield batch;
            }
        })
    }
}

impl<D> std::fmt::Debug for DataLoader<D>
where
    D: Dataset,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("batch_size", &self.opts.batch_size)
            .field("shuffle", &self.opts.shuffle)
            .finish()
    }
}
