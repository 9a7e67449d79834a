// src/data_loader/sampler.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Index order for map-style datasets.
//!
//! A sampler is just an `Iterator<Item = usize>` that the `DataLoader` can
//! move into its stream.  `SequentialSampler` walks `0..len`;
//! `ShuffleSampler` visits a seeded permutation of it.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::ops::Range;

/// Anything that hands out dataset indices.
pub trait Sampler: Iterator<Item = usize> + Send {}

impl<T: Iterator<Item = usize> + Send> Sampler for T {}

/// `0, 1, ..., len - 1`.
#[derive(Debug, Clone)]
pub struct SequentialSampler(Range<usize>);

impl SequentialSampler {
    pub fn new(len: usize) -> Self {
        Self(0..len)
    }
}

impl Iterator for SequentialSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for SequentialSampler {}

/// Every index in `0..len` once, in an order fixed by `seed`.
#[derive(Debug, Clone)]
pub struct ShuffleSampler {
    order: std::vec::IntoIter<usize>,
}

impl ShuffleSampler {
    pub fn new(len: usize, seed: u64) -> Self {
        Self::for_epoch(len, seed, 0)
    }

    /// A fresh permutation per epoch that is still reproducible from `seed`.
    pub fn for_epoch(len: usize, seed: u64, epoch: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_stream(epoch);
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut rng);
        Self { order: order.into_iter() }
    }
}

impl Iterator for ShuffleSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.order.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for ShuffleSampler {}
