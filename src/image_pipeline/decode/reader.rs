use image::DynamicImage;

use crate::image_pipeline::common::error::Result;

pub trait PhotoReader {
    fn read_image(&self, data: &[u8]) -> Result<DynamicImage>;
}
