// src/transforms/spatial.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>

//! Per-frame image transforms with per-clip randomness.
//!
//! A [`SpatialTransform`] never mutates itself.  `for_clip` draws whatever
//! random parameters it needs from the caller's RNG and returns a frame
//! function; every frame of that clip goes through the same function, so a
//! crop offset or flip decision is consistent across time.

use image::imageops::FilterType;
use image::DynamicImage;
use rand::{Rng, RngCore};

/// Frame function bound to one clip's random parameters.
pub type FrameFn<'a> = Box<dyn Fn(DynamicImage) -> DynamicImage + Send + Sync + 'a>;

pub trait SpatialTransform: Send + Sync {
    /// Draw the per-clip parameters and return the frame function.
    fn for_clip(&self, rng: &mut dyn RngCore) -> FrameFn<'_>;
}

/// Resize every frame to exactly `width x height`.
#[derive(Debug, Clone)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
    pub filter: FilterType,
}

impl Resize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, filter: FilterType::Triangle }
    }
}

impl SpatialTransform for Resize {
    fn for_clip(&self, _rng: &mut dyn RngCore) -> FrameFn<'_> {
        Box::new(move |img: DynamicImage| img.resize_exact(self.width, self.height, self.filter))
    }
}

fn crop_at(img: DynamicImage, fx: f64, fy: f64, width: u32, height: u32) -> DynamicImage {
    let x = (f64::from(img.width().saturating_sub(width)) * fx).round() as u32;
    let y = (f64::from(img.height().saturating_sub(height)) * fy).round() as u32;
    img.crop_imm(x, y, width.min(img.width()), height.min(img.height()))
}

/// Crop a `width x height` window from the centre of every frame.
#[derive(Debug, Clone)]
pub struct CenterCrop {
    pub width: u32,
    pub height: u32,
}

impl CenterCrop {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SpatialTransform for CenterCrop {
    fn for_clip(&self, _rng: &mut dyn RngCore) -> FrameFn<'_> {
        Box::new(move |img: DynamicImage| crop_at(img, 0.5, 0.5, self.width, self.height))
    }
}

/// Crop a `width x height` window at a random position, the same position
/// for every frame of a clip.
///
/// The offset is drawn as a fraction of the free space, since frame sizes
/// are not known until decode.
#[derive(Debug, Clone)]
pub struct RandomCrop {
    pub width: u32,
    pub height: u32,
}

impl RandomCrop {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SpatialTransform for RandomCrop {
    fn for_clip(&self, rng: &mut dyn RngCore) -> FrameFn<'_> {
        let fx: f64 = rng.random();
        let fy: f64 = rng.random();
        Box::new(move |img: DynamicImage| crop_at(img, fx, fy, self.width, self.height))
    }
}

/// Mirror every frame of a clip with probability `p`.
#[derive(Debug, Clone)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Self {
        Self { p: p.clamp(0.0, 1.0) }
    }
}

impl SpatialTransform for RandomHorizontalFlip {
    fn for_clip(&self, rng: &mut dyn RngCore) -> FrameFn<'_> {
        if rng.random_bool(self.p) {
            Box::new(|img: DynamicImage| img.fliph())
        } else {
            Box::new(|img: DynamicImage| img)
        }
    }
}

/// Chain transforms; each stage draws its own parameters once per clip.
pub struct SpatialCompose {
    transforms: Vec<Box<dyn SpatialTransform>>,
}

impl SpatialCompose {
    pub fn new(transforms: Vec<Box<dyn SpatialTransform>>) -> Self {
        Self { transforms }
    }
}

impl SpatialTransform for SpatialCompose {
    fn for_clip(&self, rng: &mut dyn RngCore) -> FrameFn<'_> {
        let stages: Vec<FrameFn<'_>> = self.transforms.iter().map(|t| t.for_clip(rng)).collect();
        Box::new(move |img: DynamicImage| stages.iter().fold(img, |img, f| f(img)))
    }
}
