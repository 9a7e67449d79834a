// src/constants.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
//
// Centralized constants for vidclip to avoid hardcoded values throughout the codebase

/// Name of the frame collection inside every per-video archive.
pub const DEFAULT_FRAME_KEY: &str = "video";

/// Pseudo class name used for annotations that carry no label (test split).
/// Unlabeled archives live under `<root>/test/`.
pub const UNLABELED_CLASS: &str = "test";

/// Label index assigned to unlabeled samples.
pub const UNLABELED_INDEX: i64 = -1;

/// Number of progress lines emitted while indexing annotations (~every 20%).
pub const PROGRESS_STEPS: usize = 5;

/// Segments ending at this frame are degenerate and skipped at build time.
pub const DEGENERATE_SEGMENT_END: usize = 1;

/// Zero-padding width for frame entry names written into zip archives,
/// so lexicographic order equals frame order.
pub const ZIP_FRAME_NAME_WIDTH: usize = 6;

/// Default batch size used by `LoaderOptions`.
pub const DEFAULT_BATCH_SIZE: usize = 8;
