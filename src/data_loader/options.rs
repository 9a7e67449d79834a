// src/data_loader/options.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//!
//! Batching knobs for the `DataLoader`.
//!
//! Builder helpers are provided so callers can write a fluent style:
//!
//! let opts = LoaderOptions::default()
//!     .with_batch_size(16)
//!     .drop_last(true)
//!     .shuffle(true, 42);
//!

use crate::constants::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Whether to drop the final, possibly incomplete batch.
    pub drop_last: bool,
    /// If true, visit indices in a shuffled order (deterministic with `seed`).
    pub shuffle: bool,
    /// RNG seed used when `shuffle == true`. Ignored otherwise.
    pub seed: u64,
    /// Epoch number; selects a different shuffle for the same seed.
    pub epoch: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            drop_last: false,
            shuffle: false,
            seed: 0,
            epoch: 0,
        }
    }
}

impl LoaderOptions {
    /// Builder-style helper: change the batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Builder-style helper: set `drop_last`.
    pub fn drop_last(mut self, yes: bool) -> Self {
        self.drop_last = yes;
        self
    }

    /// Enable/disable shuffling and set seed.
    ///
    /// When `on` is false, the seed is left unchanged but ignored.
    pub fn shuffle(mut self, on: bool, seed: u64) -> Self {
        self.shuffle = on;
        if on {
            self.seed = seed;
        }
        self
    }

    /// Set the epoch used to pick the shuffle permutation.
    pub fn epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_is_clamped() {
        let o = LoaderOptions::default().with_batch_size(0);
        assert_eq!(o.batch_size, 1);
    }

    #[test]
    fn shuffle_off_keeps_seed() {
        let o = LoaderOptions::default().shuffle(true, 9).shuffle(false, 3);
        assert!(!o.shuffle);
        assert_eq!(o.seed, 9);
    }
}
