// src/data_formats/hdf5.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
// HDF5 frame archives: a 1-D dataset of variable-length `u8` arrays named
// `<key>`; element `i` is the encoded bytes of frame `i`.

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use hdf5_metno::types::VarLenArray;
use hdf5_metno::{Dataset, File};
use std::path::Path;

use super::FrameArchive;

/// Read-only view of one HDF5 frame archive.  Dropping it closes the
/// dataset and then the file.
pub struct Hdf5FrameArchive {
    dataset: Dataset,
    _file: File,
    len: usize,
}

impl Hdf5FrameArchive {
    pub fn open(path: &Path, key: &str) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let dataset = file
            .dataset(key)
            .with_context(|| format!("no frame collection named {key:?}"))?;
        let shape = dataset.shape();
        if shape.len() != 1 {
            bail!("frame collection {key:?} must be 1-D, found shape {shape:?}");
        }
        Ok(Self { len: shape[0], dataset, _file: file })
    }
}

impl FrameArchive for Hdf5FrameArchive {
    fn len(&self) -> usize {
        self.len
    }

    fn read_frame(&mut self, index: usize) -> Result<Bytes> {
        if index >= self.len {
            bail!("frame slot {index} out of range");
        }
        let slot = self
            .dataset
            .read_slice_1d::<VarLenArray<u8>, _>(index..index + 1)?;
        let frame = slot
            .iter()
            .next()
            .with_context(|| format!("empty read for frame slot {index}"))?;
        Ok(Bytes::copy_from_slice(frame.as_slice()))
    }
}

/// Write `frames` as an HDF5 frame archive at `path`.
pub fn write_hdf5_archive(path: &Path, key: &str, frames: &[Vec<u8>]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let data: Vec<VarLenArray<u8>> = frames
        .iter()
        .map(|f| VarLenArray::from_slice(f))
        .collect();

    file.new_dataset::<VarLenArray<u8>>()
        .shape([data.len()])
        .create(key)?
        .write_raw(&data)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hdf5_slots_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("v.hdf5");
        let frames = vec![vec![1u8, 2, 3], vec![9u8], vec![]];
        write_hdf5_archive(&path, "video", &frames)?;

        let mut ar = Hdf5FrameArchive::open(&path, "video")?;
        assert_eq!(ar.len(), 3);
        assert_eq!(ar.read_frame(1)?.as_ref(), &[9]);
        assert!(ar.read_frame(3).is_err());
        Ok(())
    }
}
