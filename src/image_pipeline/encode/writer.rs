use std::io::Write;

use image::RgbImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::encode::types::OutputConfig;

pub trait PhotoWriter {
    fn write_image(&self, image: &RgbImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;
}
