// src/video_loader.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
//! Frame fetch + decode for one video archive.
//!
//! `load` opens the archive, walks the requested indices in order and stops
//! at the first index past the end of the collection, returning whatever was
//! decoded so far.  Callers that need an exact count check the length.

use image::DynamicImage;
use log::debug;
use std::path::{Path, PathBuf};

use crate::config::ArchiveFormat;
use crate::constants::DEFAULT_FRAME_KEY;
use crate::data_formats::open_archive;
use crate::data_loader::dataset::DatasetError;

/// Fetches and decodes frames of one video.
pub trait VideoLoader: Send + Sync {
    fn load(&self, path: &Path, frame_indices: &[usize]) -> Result<Vec<DynamicImage>, DatasetError>;
}

/// Default loader backed by the on-disk frame archives in `data_formats`.
///
/// No handle is cached between calls; every `load` opens and closes the
/// archive itself.
#[derive(Debug, Clone)]
pub struct ArchiveLoader {
    format: ArchiveFormat,
    key: String,
}

impl ArchiveLoader {
    pub fn new(format: ArchiveFormat, key: impl Into<String>) -> Self {
        Self { format, key: key.into() }
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }
}

impl Default for ArchiveLoader {
    fn default() -> Self {
        Self::new(ArchiveFormat::default(), DEFAULT_FRAME_KEY)
    }
}

fn archive_err(path: &Path, source: anyhow::Error) -> DatasetError {
    DatasetError::Archive { path: PathBuf::from(path), source }
}

impl VideoLoader for ArchiveLoader {
    fn load(&self, path: &Path, frame_indices: &[usize]) -> Result<Vec<DynamicImage>, DatasetError> {
        let mut archive = open_archive(path, self.format, &self.key)
            .map_err(|e| archive_err(path, e))?;
        let available = archive.len();

        let mut video = Vec::with_capacity(frame_indices.len());
        for &i in frame_indices {
            if i >= available {
                debug!(
                    "{}: index {i} beyond {available} frames, returning {} decoded",
                    path.display(),
                    video.len()
                );
                break;
            }
            let bytes = archive.read_frame(i).map_err(|e| archive_err(path, e))?;
            let img = image::load_from_memory(&bytes).map_err(|source| DatasetError::Decode {
                path: PathBuf::from(path),
                index: i,
                source,
            })?;
            video.push(img);
        }
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_formats::write_zip_archive;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(shade: u8) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([shade, 0, 0])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn stops_at_first_out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.zip");
        write_zip_archive(&path, "video", &[png(10), png(20)]).unwrap();

        let loader = ArchiveLoader::new(ArchiveFormat::Zip, "video");
        let frames = loader.load(&path, &[0, 1, 2]).unwrap();
        assert_eq!(frames.len(), 2);

        // nothing after the first miss is read, even if it would be in range
        let frames = loader.load(&path, &[1, 5, 0]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].to_rgb8().get_pixel(0, 0)[0], 20);
    }

    #[test]
    fn missing_archive_is_fatal() {
        let loader = ArchiveLoader::new(ArchiveFormat::Zip, "video");
        let err = loader.load(Path::new("/nonexistent/v.zip"), &[0]).unwrap_err();
        assert!(matches!(err, DatasetError::Archive { .. }));
    }

    #[test]
    fn undecodable_frame_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.zip");
        write_zip_archive(&path, "video", &[png(1), b"not an image".to_vec()]).unwrap();

        let loader = ArchiveLoader::new(ArchiveFormat::Zip, "video");
        let err = loader.load(&path, &[0, 1]).unwrap_err();
        assert!(matches!(err, DatasetError::Decode { index: 1, .. }));
    }
}
