//! Watermark placement, colour tokens and compositing.

use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::image_pipeline::common::error::{EditError, Result};
use crate::image_pipeline::edit::font::WatermarkFont;
use crate::image_pipeline::edit::params::normalize_name;

/// Inset from the image edge for every anchor except the bottom-right and
/// bottom-center ones.
const EDGE_MARGIN: i64 = 10;
/// Inset from the bottom edge for `BottomRight` and `BottomCenter`.
const BOTTOM_MARGIN: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    TopCenter,
    BottomLeft,
    BottomRight,
    BottomCenter,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 7] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::TopCenter,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::BottomCenter,
        Anchor::Center,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::TopCenter => "top-center",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
            Anchor::BottomCenter => "bottom-center",
            Anchor::Center => "center",
        }
    }

    /// Draw origin for text of `text_size` on an image of `image_size`.
    ///
    /// Text wider or taller than the image gives negative coordinates; the
    /// renderer clips whatever falls outside.
    pub fn origin(self, image_size: (u32, u32), text_size: (u32, u32)) -> (i32, i32) {
        let (width, height) = (image_size.0 as i64, image_size.1 as i64);
        let (text_width, text_height) = (text_size.0 as i64, text_size.1 as i64);

        let center_x = (width - text_width).div_euclid(2);
        let right_x = width - text_width - EDGE_MARGIN;

        let (x, y) = match self {
            Anchor::TopLeft => (EDGE_MARGIN, EDGE_MARGIN),
            Anchor::TopRight => (right_x, EDGE_MARGIN),
            Anchor::TopCenter => (center_x, EDGE_MARGIN),
            Anchor::BottomLeft => (EDGE_MARGIN, height - text_height - EDGE_MARGIN),
            Anchor::BottomRight => (right_x, height - text_height - BOTTOM_MARGIN),
            Anchor::BottomCenter => (center_x, height - text_height - BOTTOM_MARGIN),
            Anchor::Center => (center_x, (height - text_height).div_euclid(2)),
        };

        (to_i32(x), to_i32(y))
    }
}

fn to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = EditError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "topleft" => Ok(Anchor::TopLeft),
            "topright" => Ok(Anchor::TopRight),
            "topcenter" | "top" => Ok(Anchor::TopCenter),
            "bottomleft" => Ok(Anchor::BottomLeft),
            "bottomright" => Ok(Anchor::BottomRight),
            "bottomcenter" | "bottom" => Ok(Anchor::BottomCenter),
            "center" | "centre" => Ok(Anchor::Center),
            _ => Err(EditError::InvalidParameter(format!("unknown anchor: {s}"))),
        }
    }
}

/// Watermark colour as received from the parameter source.
///
/// `rgb(...)`/`rgba(...)` functional tokens are decoded on parse, with any
/// alpha component dropped. Names and hex codes are kept verbatim and only
/// turned into a triple by [`ColorToken::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorToken {
    Rgb(u8, u8, u8),
    Named(String),
}

impl Default for ColorToken {
    fn default() -> Self {
        ColorToken::Named("white".to_string())
    }
}

impl From<&str> for ColorToken {
    fn from(token: &str) -> Self {
        ColorToken::parse(token)
    }
}

impl From<(u8, u8, u8)> for ColorToken {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        ColorToken::Rgb(r, g, b)
    }
}

impl ColorToken {
    pub fn parse(token: &str) -> Self {
        parse_functional(token).unwrap_or_else(|| ColorToken::Named(token.to_string()))
    }

    pub fn resolve(&self) -> Result<Rgb<u8>> {
        match self {
            ColorToken::Rgb(r, g, b) => Ok(Rgb([*r, *g, *b])),
            ColorToken::Named(token) => {
                let normalized = token.trim().to_ascii_lowercase();
                let resolved = match normalized.strip_prefix('#') {
                    Some(hex) => parse_hex(hex),
                    None => {
                        let name: String = normalized.chars().filter(|c| !c.is_whitespace()).collect();
                        NAMED_COLORS
                            .iter()
                            .find(|(candidate, _)| *candidate == name)
                            .map(|(_, rgb)| Rgb(*rgb))
                    }
                };
                resolved.ok_or_else(|| EditError::InvalidColor(token.clone()))
            }
        }
    }
}

fn parse_functional(token: &str) -> Option<ColorToken> {
    let lowered = token.trim().to_ascii_lowercase();
    let (body, expected) = match lowered.strip_prefix("rgba(") {
        Some(body) => (body, 4),
        None => (lowered.strip_prefix("rgb(")?, 3),
    };
    let body = body.strip_suffix(')')?;

    let components: Vec<&str> = body.split(',').map(str::trim).collect();
    if components.len() != expected {
        return None;
    }
    if let Some(alpha) = components.get(3) {
        alpha.parse::<f32>().ok()?;
    }

    let mut channels = [0u8; 3];
    for (channel, component) in channels.iter_mut().zip(&components) {
        let value: f32 = component.parse().ok()?;
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }
    Some(ColorToken::Rgb(channels[0], channels[1], channels[2]))
}

fn parse_hex(hex: &str) -> Option<Rgb<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    match hex.len() {
        3 | 4 => Some(Rgb([nibble(0)?, nibble(1)?, nibble(2)?])),
        6 | 8 => Some(Rgb([byte(0)?, byte(2)?, byte(4)?])),
        _ => None,
    }
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("silver", [192, 192, 192]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("navy", [0, 0, 128]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("gold", [255, 215, 0]),
    ("violet", [238, 130, 238]),
    ("indigo", [75, 0, 130]),
    ("coral", [255, 127, 80]),
    ("salmon", [250, 128, 114]),
    ("crimson", [220, 20, 60]),
    ("skyblue", [135, 206, 235]),
    ("darkblue", [0, 0, 139]),
    ("darkred", [139, 0, 0]),
    ("darkgreen", [0, 100, 0]),
];

/// Renders `text` at the position given by `anchor` and returns the origin used.
pub fn draw_watermark(
    image: &mut RgbImage,
    text: &str,
    font: &WatermarkFont,
    anchor: Anchor,
    color: Rgb<u8>,
) -> (i32, i32) {
    let text_size = font.text_size(text);
    let origin = anchor.origin(image.dimensions(), text_size);
    debug!(
        ?anchor,
        text_width = text_size.0,
        text_height = text_size.1,
        x = origin.0,
        y = origin.1,
        "Placing watermark"
    );
    font.draw_text(image, origin, color, text);
    origin
}
