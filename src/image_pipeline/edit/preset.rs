use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage, imageops};

use crate::image_pipeline::common::error::EditError;
use crate::image_pipeline::edit::adjust::{
    enhance_brightness, enhance_color, enhance_contrast, enhance_sharpness,
};
use crate::image_pipeline::edit::filters::Kernel;
use crate::image_pipeline::edit::params::normalize_name;

/// Named style bundle applied on top of the filter stack and brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    None,
    Vintage,
    Dreamy,
    Drama,
    CoolTones,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Vintage => "vintage",
            Preset::Dreamy => "dreamy",
            Preset::Drama => "drama",
            Preset::CoolTones => "cool-tones",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "" | "none" => Ok(Preset::None),
            "vintage" => Ok(Preset::Vintage),
            "dreamy" => Ok(Preset::Dreamy),
            "drama" => Ok(Preset::Drama),
            "cooltones" | "cool" => Ok(Preset::CoolTones),
            _ => Err(EditError::InvalidParameter(format!("unknown preset: {s}"))),
        }
    }
}

pub fn apply_preset(image: RgbImage, preset: Preset) -> RgbImage {
    match preset {
        Preset::None => image,
        Preset::Vintage => {
            let image = enhance_color(&image, 0.7);
            let image = enhance_contrast(&image, 1.2);
            imageops::blur(&image, 1.0)
        }
        Preset::Dreamy => {
            let image = enhance_brightness(&image, 1.3);
            let image = enhance_sharpness(&image, 0.7);
            Kernel::BLUR.apply(&image)
        }
        Preset::Drama => {
            let image = enhance_contrast(&image, 1.5);
            let image = enhance_sharpness(&image, 2.0);
            Kernel::EDGE_ENHANCE.apply(&image)
        }
        Preset::CoolTones => boost_blue(image, 1.3),
    }
}

/// Brightens the blue channel only; red and green pass through.
fn boost_blue(mut image: RgbImage, factor: f32) -> RgbImage {
    for Rgb([_, _, blue]) in image.pixels_mut() {
        *blue = (*blue as f32 * factor).round().clamp(0.0, 255.0) as u8;
    }
    image
}
