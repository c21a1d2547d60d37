//! Channel-wise enhancers.
//!
//! Each enhancer blends the image with a "degenerate" version of itself:
//! `out = degenerate + factor * (image - degenerate)`. A factor of 1.0
//! returns the image unchanged, 0.0 returns the degenerate image, and
//! values above 1.0 extrapolate away from it.

use image::{Rgb, RgbImage};

use crate::image_pipeline::edit::filters::Kernel;

fn mix(degenerate: u8, value: u8, factor: f32) -> u8 {
    let degenerate = degenerate as f32;
    (degenerate + factor * (value as f32 - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}

fn blend(degenerate: &RgbImage, image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for (pixel, Rgb(base)) in out.pixels_mut().zip(degenerate.pixels()) {
        let Rgb(value) = *pixel;
        *pixel = Rgb([
            mix(base[0], value[0], factor),
            mix(base[1], value[1], factor),
            mix(base[2], value[2], factor),
        ]);
    }
    out
}

/// ITU-R 601-2 luma, rounded.
pub(crate) fn luma(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Scales every channel; the degenerate image is black.
pub fn enhance_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let Rgb(value) = *pixel;
        *pixel = Rgb(value.map(|channel| mix(0, channel, factor)));
    }
    out
}

/// Pushes channels away from the mean luma of the whole image.
pub fn enhance_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = (image.width() as u64 * image.height() as u64).max(1);
    let total: u64 = image.pixels().map(|&px| luma(px) as u64).sum();
    let mean = (total as f64 / pixel_count as f64 + 0.5) as u8;

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let Rgb(value) = *pixel;
        *pixel = Rgb(value.map(|channel| mix(mean, channel, factor)));
    }
    out
}

/// Saturation; the degenerate image is the luma-only version.
pub fn enhance_color(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let gray = luma(*pixel);
        let Rgb(value) = *pixel;
        *pixel = Rgb(value.map(|channel| mix(gray, channel, factor)));
    }
    out
}

/// Sharpness; the degenerate image is the smoothed one.
pub fn enhance_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let smoothed = Kernel::SMOOTH.apply(image);
    blend(&smoothed, image, factor)
}
