// src/data_formats/mod.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
//! Per-video frame archives: an indexed collection of independently
//! decodable encoded frames stored under a fixed key.

pub mod zip;
#[cfg(feature = "hdf5")]
pub mod hdf5;

pub use self::zip::{write_zip_archive, ZipFrameArchive};
#[cfg(feature = "hdf5")]
pub use self::hdf5::{write_hdf5_archive, Hdf5FrameArchive};

use anyhow::{Result, bail};
use bytes::Bytes;
use std::path::Path;

use crate::config::ArchiveFormat;

/// An open frame archive.  Implementors own the underlying handle and
/// release it on drop.
pub trait FrameArchive {
    /// Number of frame slots in the collection.
    fn len(&self) -> usize;

    /// Encoded bytes of slot `index`.
    fn read_frame(&mut self, index: usize) -> Result<Bytes>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Open the archive at `path` read-only.
pub fn open_archive(path: &Path, format: ArchiveFormat, key: &str) -> Result<Box<dyn FrameArchive>> {
    match format {
        ArchiveFormat::Zip => Ok(Box::new(ZipFrameArchive::open(path, key)?)),
        #[cfg(feature = "hdf5")]
        ArchiveFormat::Hdf5 => Ok(Box::new(Hdf5FrameArchive::open(path, key)?)),
        #[cfg(not(feature = "hdf5"))]
        ArchiveFormat::Hdf5 => bail!("HDF5 archives need the `hdf5` feature"),
    }
}

/// Write `frames` into a new archive at `path`.
pub fn write_archive(path: &Path, format: ArchiveFormat, key: &str, frames: &[Vec<u8>]) -> Result<()> {
    match format {
        ArchiveFormat::Zip => write_zip_archive(path, key, frames),
        #[cfg(feature = "hdf5")]
        ArchiveFormat::Hdf5 => write_hdf5_archive(path, key, frames),
        #[cfg(not(feature = "hdf5"))]
        ArchiveFormat::Hdf5 => bail!("HDF5 archives need the `hdf5` feature"),
    }
}
