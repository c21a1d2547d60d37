//! Filter stack: the standard raster-library kernel set plus grayscale.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use imageproc::filter;
use tracing::debug;

use crate::image_pipeline::common::error::EditError;
use crate::image_pipeline::edit::adjust::luma;
use crate::image_pipeline::edit::params::normalize_name;

/// A selectable filter. The derived ordering is the order the stack applies them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Filter {
    Sharpen,
    Blur,
    Grayscale,
    Contour,
    Emboss,
    EdgeEnhance,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::Sharpen,
        Filter::Blur,
        Filter::Grayscale,
        Filter::Contour,
        Filter::Emboss,
        Filter::EdgeEnhance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Sharpen => "sharpen",
            Filter::Blur => "blur",
            Filter::Grayscale => "grayscale",
            Filter::Contour => "contour",
            Filter::Emboss => "emboss",
            Filter::EdgeEnhance => "edge-enhance",
        }
    }

    fn apply(self, image: &RgbImage) -> RgbImage {
        match self {
            Filter::Sharpen => Kernel::SHARPEN.apply(image),
            Filter::Blur => Kernel::BLUR.apply(image),
            Filter::Grayscale => grayscale(image),
            Filter::Contour => Kernel::CONTOUR.apply(image),
            Filter::Emboss => Kernel::EMBOSS.apply(image),
            Filter::EdgeEnhance => Kernel::EDGE_ENHANCE.apply(image),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "sharpen" => Ok(Filter::Sharpen),
            "blur" => Ok(Filter::Blur),
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(Filter::Grayscale),
            "contour" => Ok(Filter::Contour),
            "emboss" => Ok(Filter::Emboss),
            "edgeenhance" => Ok(Filter::EdgeEnhance),
            _ => Err(EditError::InvalidParameter(format!("unknown filter: {s}"))),
        }
    }
}

/// Kernel weights with the scale/offset convention of the classic raster
/// filter set: `out = sum(w * px) / scale + offset`.
///
/// Convolution is done by `imageproc`, which pads by continuity, so edge
/// pixels see their nearest in-image neighbours.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    size: u32,
    weights: &'static [f32],
    scale: f32,
    offset: f32,
}

impl Kernel {
    pub const SHARPEN: Kernel = Kernel {
        size: 3,
        weights: &[-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0],
        scale: 16.0,
        offset: 0.0,
    };

    pub const BLUR: Kernel = Kernel {
        size: 5,
        weights: &[
            1.0, 1.0, 1.0, 1.0, 1.0, //
            1.0, 0.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 0.0, 1.0, //
            1.0, 1.0, 1.0, 1.0, 1.0,
        ],
        scale: 16.0,
        offset: 0.0,
    };

    pub const CONTOUR: Kernel = Kernel {
        size: 3,
        weights: &[-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
        scale: 1.0,
        offset: 255.0,
    };

    pub const EMBOSS: Kernel = Kernel {
        size: 3,
        weights: &[-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        scale: 1.0,
        offset: 128.0,
    };

    pub const EDGE_ENHANCE: Kernel = Kernel {
        size: 3,
        weights: &[-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0],
        scale: 2.0,
        offset: 0.0,
    };

    pub const SMOOTH: Kernel = Kernel {
        size: 3,
        weights: &[1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0],
        scale: 13.0,
        offset: 0.0,
    };

    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let (scale, offset) = (self.scale, self.offset);
        filter::Kernel::new(self.weights, self.size, self.size)
            .filter(image, |channel: &mut u8, sum: f32| {
                *channel = clip8(sum / scale + offset)
            })
    }
}

fn clip8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Desaturates to ITU-R 601 luma and re-expands to three channels.
pub fn grayscale(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let gray = luma(*pixel);
        *pixel = Rgb([gray, gray, gray]);
    }
    out
}

/// Applies every selected filter once, in `Filter::ALL` order.
pub fn apply_filters(image: RgbImage, selected: &BTreeSet<Filter>) -> RgbImage {
    Filter::ALL
        .into_iter()
        .filter(|filter| selected.contains(filter))
        .fold(image, |current, filter| {
            debug!(filter = filter.name(), "Applying filter");
            filter.apply(&current)
        })
}
