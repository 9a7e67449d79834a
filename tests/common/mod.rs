// tests/common/mod.rs
//
// Shared fixtures: synthetic frame archives and annotation files in a
// scratch directory.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use vidclip::data_formats::write_zip_archive;

pub const WIDTH: u32 = 6;
pub const HEIGHT: u32 = 4;

/// PNG-encoded frame whose red channel is `shade` everywhere and whose
/// green channel is `green_at(x)`, the same in every frame.
pub fn png_frame(shade: u8) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(WIDTH, HEIGHT, |x, _| Rgb([shade, green_at(x), 128])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

pub fn green_at(x: u32) -> u8 {
    (x * 40) as u8
}

/// Write `<root>/<label>/<video_id>.zip` with `n_frames` frames; frame `i`
/// has red channel `i`.
pub fn write_video(root: &Path, label: &str, video_id: &str, n_frames: usize) -> PathBuf {
    let dir = root.join(label);
    std::fs::create_dir_all(&dir).expect("create label dir");
    let path = dir.join(format!("{video_id}.zip"));
    let frames: Vec<Vec<u8>> = (0..n_frames).map(|i| png_frame(i as u8)).collect();
    write_zip_archive(&path, "video", &frames).expect("write archive");
    path
}

/// A small dataset:
///
/// * labels `["walking", "running", "jumping"]`
/// * training: `w1` walking [0,10), `r1` running [0,8), `j1` jumping (archive
///   missing), `w2` walking [0,1) (degenerate)
/// * validation: `r2` running [2,6)
/// * testing: `t1` unlabeled [0,5)
pub struct Fixture {
    pub dir: TempDir,
    pub annotation: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        write_video(root, "walking", "w1", 12);
        write_video(root, "running", "r1", 8);
        write_video(root, "walking", "w2", 3);
        write_video(root, "running", "r2", 8);
        write_video(root, "test", "t1", 5);

        let ann = json!({
            "labels": ["walking", "running", "jumping"],
            "database": {
                "w1": {"subset": "training", "annotations": {"label": "walking", "segment": [0, 10]}},
                "r1": {"subset": "training", "annotations": {"label": "running", "segment": [0, 8]}},
                "j1": {"subset": "training", "annotations": {"label": "jumping", "segment": [0, 9]}},
                "w2": {"subset": "training", "annotations": {"label": "walking", "segment": [0, 1]}},
                "r2": {"subset": "validation", "annotations": {"label": "running", "segment": [2, 6]}},
                "t1": {"subset": "testing", "annotations": {"segment": [0, 5]}}
            }
        });
        let annotation = root.join("annotation.json");
        std::fs::write(&annotation, serde_json::to_vec_pretty(&ann).expect("json")).expect("write json");

        Self { dir, annotation }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn options(&self, subset: &str) -> vidclip::VideoDatasetOptions {
        vidclip::VideoDatasetOptions::new(self.root(), &self.annotation, subset)
            .format(vidclip::ArchiveFormat::Zip)
    }
}
