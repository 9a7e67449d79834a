// src/bin/cli.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
//! CLI supporting `classes`, `inspect`, `sample`, and `pack`.
//!
//! Examples:
//! ```bash
//! vidclip-cli classes  data/kinetics.json
//! vidclip-cli inspect  data/kinetics data/kinetics.json training --window 16 --stride 8
//! vidclip-cli sample   data/kinetics data/kinetics.json validation 42 --frames 16 --size 112
//! vidclip-cli pack     'frames/v0001/*.jpg' data/kinetics/archery/v0001.zip
//! ```

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{info, LevelFilter};
use std::collections::BTreeMap;
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use std::time::Instant;

use vidclip::annotation::AnnotationFile;
use vidclip::constants::DEFAULT_FRAME_KEY;
use vidclip::data_formats::write_archive;
use vidclip::transforms::{CenterCrop, LoopPadding, Resize, SpatialCompose, TemporalCenterCrop, TemporalCompose};
use vidclip::{ArchiveFormat, ClipSample, Transforms, VideoDataset, VideoDatasetOptions};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

/// Where the dataset lives and which split to index.
#[derive(Args)]
struct DatasetArgs {
    /// Root directory holding <label>/<video_id>.<ext> archives.
    root: PathBuf,
    /// JSON annotation file.
    annotation: PathBuf,
    /// Subset tag, e.g. training / validation / testing.
    subset: String,
    /// Archive container format.
    #[arg(long, value_enum, default_value_t = ArchiveFormat::default())]
    format: ArchiveFormat,
    /// Frame collection name inside each archive.
    #[arg(long, default_value = DEFAULT_FRAME_KEY)]
    key: String,
}

impl DatasetArgs {
    fn options(&self) -> VideoDatasetOptions {
        VideoDatasetOptions::new(&self.root, &self.annotation, self.subset.clone())
            .format(self.format)
            .frame_key(self.key.clone())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the class index -> name mapping of an annotation file.
    Classes {
        annotation: PathBuf,
    },
    /// Index a split and report sample counts per class.
    Inspect {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Re-segment samples into windows of this many frames.
        #[arg(long)]
        window: Option<usize>,
        /// Window stride (defaults to the window size).
        #[arg(long, requires = "window")]
        stride: Option<usize>,
    },
    /// Load one sample and print its clip shape(s) and target(s).
    Sample {
        #[command(flatten)]
        dataset: DatasetArgs,
        index: usize,
        /// Centre-crop (and loop-pad) every clip to this many frames.
        #[arg(long)]
        frames: Option<usize>,
        /// Resize frames to SIZE x SIZE.
        #[arg(long)]
        size: Option<u32>,
        /// Seed for augmentation randomness.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build a frame archive from image files matching a glob pattern
    /// (sorted by path).
    Pack {
        pattern: String,
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = ArchiveFormat::default())]
        format: ArchiveFormat,
        #[arg(long, default_value = DEFAULT_FRAME_KEY)]
        key: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.cmd {
        Command::Classes { annotation } => classes_cmd(annotation),
        Command::Inspect { dataset, window, stride } => inspect_cmd(dataset, window, stride),
        Command::Sample { dataset, index, frames, size, seed } => sample_cmd(dataset, index, frames, size, seed),
        Command::Pack { pattern, output, format, key } => pack_cmd(&pattern, output, format, &key),
    }
}

fn classes_cmd(annotation: PathBuf) -> Result<()> {
    let ann = AnnotationFile::load(&annotation)
        .with_context(|| format!("reading {}", annotation.display()))?;
    let classes = vidclip::ClassMapping::from_labels(ann.labels);
    for (i, name) in classes.names().iter().enumerate() {
        safe_println!("{i}\t{name}");
    }
    Ok(())
}

fn inspect_cmd(args: DatasetArgs, window: Option<usize>, stride: Option<usize>) -> Result<()> {
    let t0 = Instant::now();
    let mut ds = VideoDataset::new(&args.options(), Transforms::default())?;
    if let Some(duration) = window {
        ds.apply_sliding_window(duration, stride.unwrap_or(duration))?;
    }
    info!("indexed in {:.2?}", t0.elapsed());

    let mut per_label: BTreeMap<i64, usize> = BTreeMap::new();
    for s in ds.samples() {
        *per_label.entry(s.label).or_default() += 1;
    }

    safe_println!("samples: {}", ds.len());
    safe_println!("classes: {}", ds.classes().len());
    for (label, count) in per_label {
        let name = usize::try_from(label)
            .ok()
            .and_then(|i| ds.classes().name_of(i))
            .unwrap_or(vidclip::constants::UNLABELED_CLASS);
        safe_println!("{label}\t{name}\t{count}");
    }
    Ok(())
}

fn sample_cmd(args: DatasetArgs, index: usize, frames: Option<usize>, size: Option<u32>, seed: Option<u64>) -> Result<()> {
    let mut transforms = Transforms::default();
    if let Some(n) = frames {
        transforms = transforms.temporal(TemporalCompose::new(vec![
            Box::new(TemporalCenterCrop { size: n }),
            Box::new(LoopPadding { size: n }),
        ]));
    }
    if let Some(s) = size {
        transforms = transforms.spatial(SpatialCompose::new(vec![
            Box::new(Resize::new(s, s)),
            Box::new(CenterCrop::new(s, s)),
        ]));
    }

    let mut opts = args.options();
    if let Some(seed) = seed {
        opts = opts.seed(seed);
    }
    let ds = VideoDataset::new(&opts, transforms)?;
    if index >= ds.len() {
        bail!("index {index} out of range: dataset has {} samples", ds.len());
    }

    let t0 = Instant::now();
    let item = ds.get(index)?;
    info!("loaded sample {index} in {:.2?}", t0.elapsed());

    match item {
        ClipSample::Single { clip, target } => {
            safe_println!("clip shape (C, T, H, W): {:?}", clip.shape());
            safe_println!("target: {}", serde_json::to_string(&target)?);
        }
        ClipSample::Multi { clips, targets } => {
            for (clip, target) in clips.iter().zip(&targets) {
                safe_println!("clip shape (C, T, H, W): {:?}", clip.shape());
                safe_println!("target: {}", serde_json::to_string(target)?);
            }
        }
    }
    Ok(())
}

fn pack_cmd(pattern: &str, output: PathBuf, format: ArchiveFormat, key: &str) -> Result<()> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("bad glob pattern {pattern:?}"))?
        .collect::<Result<_, _>>()?;
    if paths.is_empty() {
        bail!("no files match {pattern:?}");
    }
    paths.sort();

    let frames = paths
        .iter()
        .map(|p| std::fs::read(p).with_context(|| format!("reading {}", p.display())))
        .collect::<Result<Vec<_>>>()?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_archive(&output, format, key, &frames)?;
    safe_println!("wrote {} frames to {}", frames.len(), output.display());
    Ok(())
}
