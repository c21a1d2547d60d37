//! Single-image edit pipeline
//!
//! Crop, filter stack, brightness, style presets and text watermarking over
//! an already decoded image.

pub mod adjust;
pub mod crop;
pub mod filters;
pub mod font;
pub mod params;
pub mod preset;
pub mod watermark;
mod pipeline;
mod timing;

#[cfg(test)]
mod tests;

pub use adjust::{enhance_brightness, enhance_color, enhance_contrast, enhance_sharpness};
pub use crop::{CropMargins, CropRect, crop};
pub use filters::{Filter, Kernel, apply_filters, grayscale};
pub use font::{FontProvider, FontSource, FontStyle, SystemFontProvider, WatermarkFont, resolve_font};
pub use params::{EditParameters, EditParametersBuilder, Watermark};
pub use pipeline::{EditPipeline, EditReport, normalize};
pub use preset::{Preset, apply_preset};
pub use timing::{PipelineTimings, StageTiming, Timer};
pub use watermark::{Anchor, ColorToken, draw_watermark};
