// src/data_formats/zip.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
// Zip frame archives: every entry under `<key>/` is one encoded frame, and
// slot order is the lexicographic order of the entry names.

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use super::FrameArchive;
use crate::constants::ZIP_FRAME_NAME_WIDTH;

/// Read-only view of one zip frame archive.  The file handle is released
/// when the value is dropped.
pub struct ZipFrameArchive {
    archive: ZipArchive<BufReader<File>>,
    names: Vec<String>,
}

impl ZipFrameArchive {
    pub fn open(path: &Path, key: &str) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let archive = ZipArchive::new(BufReader::new(file))?;

        let prefix = format!("{key}/");
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with(&prefix) && n.len() > prefix.len() && !n.ends_with('/'))
            .map(String::from)
            .collect();
        if names.is_empty() && !archive.file_names().any(|n| n == prefix) {
            bail!("no frame collection named {key:?}");
        }
        names.sort();

        Ok(Self { archive, names })
    }
}

impl FrameArchive for ZipFrameArchive {
    fn len(&self) -> usize {
        self.names.len()
    }

    fn read_frame(&mut self, index: usize) -> Result<Bytes> {
        let name = self
            .names
            .get(index)
            .with_context(|| format!("frame slot {index} out of range"))?;
        let mut entry = self.archive.by_name(name)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// Write `frames` as a zip frame archive at `path`.
///
/// Frames are stored uncompressed; they are already encoded images.
pub fn write_zip_archive(path: &Path, key: &str, frames: &[Vec<u8>]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut zip = ZipWriter::new(file);
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.add_directory(format!("{key}/"), opts)?;
    for (i, frame) in frames.iter().enumerate() {
        zip.start_file(format!("{key}/{i:0width$}", width = ZIP_FRAME_NAME_WIDTH), opts)?;
        zip.write_all(frame)?;
    }
    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_entry_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("v.zip");
        let frames: Vec<Vec<u8>> = (0..12u8).map(|i| vec![i; 3]).collect();
        write_zip_archive(&path, "video", &frames)?;

        let mut ar = ZipFrameArchive::open(&path, "video")?;
        assert_eq!(ar.len(), 12);
        assert_eq!(ar.read_frame(0)?.as_ref(), &[0, 0, 0]);
        assert_eq!(ar.read_frame(11)?.as_ref(), &[11, 11, 11]);
        assert!(ar.read_frame(12).is_err());
        Ok(())
    }

    #[test]
    fn empty_collection_is_valid() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("e.zip");
        write_zip_archive(&path, "video", &[])?;
        let ar = ZipFrameArchive::open(&path, "video")?;
        assert!(ar.is_empty());
        Ok(())
    }

    #[test]
    fn wrong_key_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("k.zip");
        write_zip_archive(&path, "video", &[vec![1]])?;
        assert!(ZipFrameArchive::open(&path, "frames").is_err());
        Ok(())
    }
}
