use image::{DynamicImage, GenericImageView, RgbImage};
use tracing::{debug, info, info_span, instrument};

use crate::image_pipeline::common::error::{EditError, Result};
use crate::image_pipeline::edit::{
    adjust::enhance_brightness,
    crop::crop,
    filters::apply_filters,
    font::{FontProvider, SystemFontProvider, resolve_font},
    params::EditParameters,
    preset::apply_preset,
    timing::{PipelineTimings, Timer},
    watermark::draw_watermark,
};

/// Output of [`EditPipeline::apply_with_report`].
#[derive(Debug)]
pub struct EditReport {
    pub image: RgbImage,
    pub timings: PipelineTimings,
    /// Set when the requested font could not be loaded and the built-in
    /// default was used instead.
    pub font_fallback: Option<EditError>,
    /// Where the watermark was drawn, if it was.
    pub watermark_origin: Option<(i32, i32)>,
}

/// Stateless edit pipeline.
///
/// Stages always run in this order: normalize to RGB, crop, filter stack,
/// brightness, preset, watermark. The input image is never modified.
pub struct EditPipeline<F: FontProvider = SystemFontProvider> {
    fonts: F,
}

impl EditPipeline<SystemFontProvider> {
    pub fn new() -> Self {
        Self {
            fonts: SystemFontProvider,
        }
    }
}

impl Default for EditPipeline<SystemFontProvider> {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts any decoded colour model (palette, luma, alpha, 16-bit) to 8-bit RGB.
pub fn normalize(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

impl<F: FontProvider> EditPipeline<F> {
    pub fn with_font_provider(fonts: F) -> Self {
        Self { fonts }
    }

    pub fn font_provider(&self) -> &F {
        &self.fonts
    }

    pub fn apply(&self, image: &DynamicImage, params: &EditParameters) -> Result<RgbImage> {
        self.apply_with_report(image, params).map(|report| report.image)
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn apply_with_report(&self, image: &DynamicImage, params: &EditParameters) -> Result<EditReport> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EditError::InvalidDimensions(width, height));
        }

        let watermark = &params.watermark;
        let watermark_color = if watermark.is_enabled() {
            Some(watermark.color.resolve()?)
        } else {
            None
        };

        let mut timings = PipelineTimings::new();

        let mut edited = {
            let _span = info_span!("normalize", color = ?image.color()).entered();
            let timer = Timer::start("normalize");
            let rgb = normalize(image);
            timings.record(timer);
            rgb
        };

        if let Some(margins) = params.crop {
            let rect = margins.clamp_to(width, height);
            if rect.is_full_image(width, height) {
                debug!("Crop covers the whole image, skipping");
            } else {
                let _span = info_span!("crop", left = rect.left, top = rect.top, right = rect.right, bottom = rect.bottom).entered();
                let timer = Timer::start("crop");
                edited = crop(&edited, rect);
                timings.record(timer);
            }
        }

        if !params.filters.is_empty() {
            let _span = info_span!("filters", count = params.filters.len()).entered();
            let timer = Timer::start("filters");
            edited = apply_filters(edited, &params.filters);
            timings.record(timer);
        }

        {
            let _span = info_span!("brightness", factor = params.brightness).entered();
            let timer = Timer::start("brightness");
            edited = enhance_brightness(&edited, params.brightness);
            timings.record(timer);
        }

        {
            let _span = info_span!("preset", preset = %params.preset).entered();
            let timer = Timer::start("preset");
            edited = apply_preset(edited, params.preset);
            timings.record(timer);
        }

        let mut font_fallback = None;
        let mut watermark_origin = None;
        if let Some(color) = watermark_color {
            let _span = info_span!("watermark", anchor = %watermark.anchor, size = watermark.size).entered();
            let timer = Timer::start("watermark");
            let (font, fallback) = resolve_font(&self.fonts, &watermark.font, watermark.size);
            watermark_origin = Some(draw_watermark(&mut edited, &watermark.text, &font, watermark.anchor, color));
            font_fallback = fallback;
            timings.record(timer);
        }

        info!(
            width = edited.width(),
            height = edited.height(),
            elapsed_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "Edit complete"
        );

        Ok(EditReport {
            image: edited,
            timings,
            font_fallback,
            watermark_origin,
        })
    }
}
