//! Output encoding configuration types

use std::str::FromStr;

use crate::image_pipeline::common::error::EditError;

/// Container format for edited images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG (lossy, quality controlled by `OutputConfig::jpeg_quality`)
    Jpeg,
    /// PNG (lossless)
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(EditError::InvalidParameter(format!(
                "unsupported output format: {other}"
            ))),
        }
    }
}

/// Configuration for writing edited images
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output container format
    pub format: OutputFormat,
    /// JPEG quality, 1-100. Ignored for PNG.
    pub jpeg_quality: u8,
    /// Whether to reject decoded images with a zero or oversized dimension
    pub validate_dimensions: bool,
    /// Largest accepted width or height when validation is enabled
    pub max_dimension: Option<u32>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            jpeg_quality: 90,
            validate_dimensions: true,
            max_dimension: None,
        }
    }
}

impl OutputConfig {
    pub fn builder() -> OutputConfigBuilder {
        OutputConfigBuilder::default()
    }
}

/// Builder for OutputConfig
#[derive(Default)]
pub struct OutputConfigBuilder {
    format: Option<OutputFormat>,
    jpeg_quality: Option<u8>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<u32>>,
}

impl OutputConfigBuilder {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality.clamp(1, 100));
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<u32>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> OutputConfig {
        let default = OutputConfig::default();
        OutputConfig {
            format: self.format.unwrap_or(default.format),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
