use std::io::Write;

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use tracing::debug;

use crate::image_pipeline::common::error::{EditError, Result};
use crate::image_pipeline::encode::types::{OutputConfig, OutputFormat};
use crate::image_pipeline::encode::writer::PhotoWriter;

pub struct StandardPhotoWriter;

impl PhotoWriter for StandardPhotoWriter {
    fn write_image(&self, image: &RgbImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        debug!(
            "Encoding {:?} image: {}x{}",
            config.format,
            image.width(),
            image.height()
        );

        let mut buffer = Vec::new();

        match config.format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, config.jpeg_quality);
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| EditError::EncodeError(e.to_string()))?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new(&mut buffer);
                image
                    .write_with_encoder(encoder)
                    .map_err(|e| EditError::EncodeError(e.to_string()))?;
            }
        }

        output.write_all(&buffer)?;

        debug!("Encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
