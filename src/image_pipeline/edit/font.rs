//! Font resolution for watermark text.
//!
//! Outline fonts (TrueType/OpenType) are loaded through a [`FontProvider`]
//! and rendered with `imageproc`. The fixed default font is an 8x8 bitmap
//! face resampled (nearest neighbour) to the requested pixel size; it needs
//! no font file, so resolution can always fall back to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{EditError, Result};
use crate::image_pipeline::edit::params::normalize_name;

const BITMAP_CELL: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Sans,
    SansBold,
    Serif,
    Monospace,
}

impl FontStyle {
    fn candidates(self) -> &'static [&'static str] {
        match self {
            FontStyle::Sans => &[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                "/Library/Fonts/Arial.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "C:\\Windows\\Fonts\\arial.ttf",
            ],
            FontStyle::SansBold => &[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
                "/Library/Fonts/Arial Bold.ttf",
                "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
                "C:\\Windows\\Fonts\\arialbd.ttf",
            ],
            FontStyle::Serif => &[
                "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
                "/usr/share/fonts/TTF/DejaVuSerif.ttf",
                "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
                "/Library/Fonts/Times New Roman.ttf",
                "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
                "C:\\Windows\\Fonts\\times.ttf",
            ],
            FontStyle::Monospace => &[
                "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
                "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
                "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
                "/Library/Fonts/Courier New.ttf",
                "/System/Library/Fonts/Supplemental/Courier New.ttf",
                "C:\\Windows\\Fonts\\cour.ttf",
            ],
        }
    }
}

impl FromStr for FontStyle {
    type Err = EditError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "sans" | "sansserif" | "arial" | "helvetica" => Ok(FontStyle::Sans),
            "sansbold" | "bold" | "arialbold" => Ok(FontStyle::SansBold),
            "serif" | "times" | "timesnewroman" => Ok(FontStyle::Serif),
            "mono" | "monospace" | "courier" | "couriernew" => Ok(FontStyle::Monospace),
            _ => Err(EditError::InvalidParameter(format!("unknown font style: {s}"))),
        }
    }
}

/// Where the watermark font comes from.
#[derive(Clone, Default)]
pub enum FontSource {
    /// The built-in bitmap face.
    #[default]
    Default,
    /// A system font picked by style.
    Builtin(FontStyle),
    /// A font file on disk.
    File(PathBuf),
    /// Font data handed over by the caller, e.g. an upload.
    Bytes(Arc<[u8]>),
}

impl fmt::Debug for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Default => f.write_str("Default"),
            FontSource::Builtin(style) => f.debug_tuple("Builtin").field(style).finish(),
            FontSource::File(path) => f.debug_tuple("File").field(path).finish(),
            FontSource::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
        }
    }
}

pub trait FontProvider {
    fn load(&self, source: &FontSource) -> Result<FontVec>;
}

/// Loads fonts from the filesystem or from caller-supplied bytes.
pub struct SystemFontProvider;

impl SystemFontProvider {
    fn read(path: &Path) -> Result<FontVec> {
        let data = std::fs::read(path)
            .map_err(|e| EditError::FontError(format!("{}: {}", path.display(), e)))?;
        FontVec::try_from_vec(data)
            .map_err(|e| EditError::FontError(format!("{}: {}", path.display(), e)))
    }
}

impl FontProvider for SystemFontProvider {
    fn load(&self, source: &FontSource) -> Result<FontVec> {
        match source {
            FontSource::Default => Err(EditError::FontError(
                "the default font is built in and has no outline data".to_string(),
            )),
            FontSource::Builtin(style) => {
                let path = style
                    .candidates()
                    .iter()
                    .map(Path::new)
                    .find(|path| path.is_file())
                    .ok_or_else(|| {
                        EditError::FontError(format!("no installed font for style {style:?}"))
                    })?;
                debug!("Using {} for {:?}", path.display(), style);
                Self::read(path)
            }
            FontSource::File(path) => Self::read(path),
            FontSource::Bytes(data) => FontVec::try_from_vec(data.to_vec())
                .map_err(|e| EditError::FontError(format!("uploaded font: {e}"))),
        }
    }
}

/// A font ready to measure and draw at a fixed size.
pub enum WatermarkFont {
    Outline { font: FontVec, scale: PxScale },
    /// Glyph cell is `size` x `size` pixels.
    Bitmap { size: u32 },
}

impl fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatermarkFont::Outline { scale, .. } => {
                f.debug_struct("Outline").field("scale", scale).finish()
            }
            WatermarkFont::Bitmap { size } => f.debug_struct("Bitmap").field("size", size).finish(),
        }
    }
}

impl WatermarkFont {
    /// Sizes the outline font so its em square is `size` pixels tall.
    pub fn outline(font: FontVec, size: u32) -> Self {
        let units_per_em = font.units_per_em().unwrap_or_else(|| font.height_unscaled());
        let px = size as f32 * font.height_unscaled() / units_per_em;
        WatermarkFont::Outline { font, scale: PxScale::from(px) }
    }

    pub fn bitmap(size: u32) -> Self {
        WatermarkFont::Bitmap { size }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, WatermarkFont::Bitmap { .. })
    }

    /// Pixel bounding box of `text`.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        match self {
            WatermarkFont::Outline { font, scale } => text_size(*scale, font, text),
            WatermarkFont::Bitmap { size } => (text.chars().count() as u32 * size, *size),
        }
    }

    pub fn draw_text(&self, canvas: &mut RgbImage, origin: (i32, i32), color: Rgb<u8>, text: &str) {
        match self {
            WatermarkFont::Outline { font, scale } => {
                draw_text_mut(canvas, color, origin.0, origin.1, *scale, font, text);
            }
            WatermarkFont::Bitmap { size } => draw_bitmap_text(canvas, origin, color, text, *size),
        }
    }
}

/// Output pixels `[start, end)` along one axis that sample glyph cell `cell`
/// when an 8-pixel glyph is stretched to `size` pixels (`r * 8 / size == cell`).
fn cell_span(cell: u32, size: u32) -> (u32, u32) {
    let start = (cell * size).div_ceil(BITMAP_CELL);
    let end = ((cell + 1) * size).div_ceil(BITMAP_CELL);
    (start, end)
}

fn draw_bitmap_text(canvas: &mut RgbImage, origin: (i32, i32), color: Rgb<u8>, text: &str, size: u32) {
    for (index, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or_default();
        let glyph_x = origin.0 as i64 + index as i64 * size as i64;
        for (row, bits) in (0u32..).zip(glyph.iter()) {
            let (top, bottom) = cell_span(row, size);
            if bottom == top {
                continue;
            }
            for col in 0..BITMAP_CELL {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let (left, right) = cell_span(col, size);
                if right == left {
                    continue;
                }
                let x = glyph_x + left as i64;
                let y = origin.1 as i64 + top as i64;
                if x > i32::MAX as i64 || y > i32::MAX as i64 {
                    continue;
                }
                let rect = Rect::at(x as i32, y as i32).of_size(right - left, bottom - top);
                draw_filled_rect_mut(canvas, rect, color);
            }
        }
    }
}

/// Resolves `source` at `size`, falling back to the bitmap face when the
/// provider cannot load it. The load error, if any, is returned alongside.
pub fn resolve_font<F: FontProvider + ?Sized>(
    provider: &F,
    source: &FontSource,
    size: u32,
) -> (WatermarkFont, Option<EditError>) {
    if let FontSource::Default = source {
        return (WatermarkFont::bitmap(size), None);
    }

    match provider.load(source) {
        Ok(font) => (WatermarkFont::outline(font, size), None),
        Err(e) => {
            warn!(?source, error = %e, "Font unavailable, using built-in default");
            (WatermarkFont::bitmap(size), Some(e))
        }
    }
}
