//! Photo reader backed by the `image` crate.

use std::io::Cursor;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::image_pipeline::common::error::{EditError, Result};
use crate::image_pipeline::decode::reader::PhotoReader;

/// Reader that sniffs the container format from the leading bytes.
///
/// Palette, grayscale and alpha images are returned as-is; the edit
/// pipeline normalizes them to RGB itself.
pub struct StandardPhotoReader;

impl PhotoReader for StandardPhotoReader {
    fn read_image(&self, data: &[u8]) -> Result<DynamicImage> {
        debug!("Decoding image, {} bytes", data.len());

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| EditError::DecodeError(e.to_string()))?;

        let format = reader.format();
        let decoded = reader
            .decode()
            .map_err(|e| EditError::DecodeError(e.to_string()))?;

        debug!(
            "Decoded {:?} image: {}x{} ({:?})",
            format,
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    #[test]
    fn test_decodes_png_with_alpha() {
        let source = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        let mut bytes = Cursor::new(Vec::new());
        source.write_to(&mut bytes, ImageFormat::Png).unwrap();

        let decoded = StandardPhotoReader.read_image(bytes.get_ref()).unwrap();

        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_rejects_garbage() {
        let result = StandardPhotoReader.read_image(b"definitely not an image");
        assert!(matches!(result, Err(EditError::DecodeError(_))));
    }
}
