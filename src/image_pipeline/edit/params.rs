//! Edit parameter types

use std::collections::BTreeSet;

use crate::image_pipeline::edit::crop::CropMargins;
use crate::image_pipeline::edit::filters::Filter;
use crate::image_pipeline::edit::font::FontSource;
use crate::image_pipeline::edit::preset::Preset;
use crate::image_pipeline::edit::watermark::{Anchor, ColorToken};

/// Lowercases and strips separators so "Edge Enhance", "edge_enhance" and
/// "edge-enhance" compare equal.
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Text watermark settings
#[derive(Debug, Clone)]
pub struct Watermark {
    /// Text to render; empty disables the watermark stage
    pub text: String,
    /// Fill colour
    pub color: ColorToken,
    /// Placement relative to the image edges
    pub anchor: Anchor,
    /// Font to render with
    pub font: FontSource,
    /// Font size in pixels
    pub size: u32,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: ColorToken::default(),
            anchor: Anchor::default(),
            font: FontSource::default(),
            size: 40,
        }
    }
}

impl Watermark {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<ColorToken>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Everything one edit needs. Values are expected to be in range already
/// (brightness 0.5-2.0, font size roughly 10-150); only crop geometry is
/// clamped by the pipeline.
#[derive(Debug, Clone)]
pub struct EditParameters {
    /// Brightness factor, 1.0 leaves the image unchanged
    pub brightness: f32,
    /// Filters to apply; order of insertion does not matter
    pub filters: BTreeSet<Filter>,
    /// Style preset applied after brightness
    pub preset: Preset,
    /// Optional crop, applied right after colour normalization
    pub crop: Option<CropMargins>,
    /// Text watermark
    pub watermark: Watermark,
}

impl Default for EditParameters {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            filters: BTreeSet::new(),
            preset: Preset::None,
            crop: None,
            watermark: Watermark::default(),
        }
    }
}

impl EditParameters {
    pub fn builder() -> EditParametersBuilder {
        EditParametersBuilder::default()
    }
}

/// Builder for EditParameters
#[derive(Default)]
pub struct EditParametersBuilder {
    brightness: Option<f32>,
    filters: Option<BTreeSet<Filter>>,
    preset: Option<Preset>,
    crop: Option<Option<CropMargins>>,
    watermark: Option<Watermark>,
}

impl EditParametersBuilder {
    pub fn brightness(mut self, factor: f32) -> Self {
        self.brightness = Some(factor);
        self
    }

    /// Adds one filter to the selection.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.get_or_insert_with(BTreeSet::new).insert(filter);
        self
    }

    /// Replaces the whole filter selection.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters = Some(filters.into_iter().collect());
        self
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn crop(mut self, crop: Option<CropMargins>) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = Some(watermark);
        self
    }

    pub fn build(self) -> EditParameters {
        let default = EditParameters::default();
        EditParameters {
            brightness: self.brightness.unwrap_or(default.brightness),
            filters: self.filters.unwrap_or(default.filters),
            preset: self.preset.unwrap_or(default.preset),
            crop: self.crop.unwrap_or(default.crop),
            watermark: self.watermark.unwrap_or(default.watermark),
        }
    }
}
