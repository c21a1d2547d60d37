use image::{RgbImage, imageops};

/// Crop request as supplied by the caller: pixels to skip from the
/// left/top edges, and margins to remove from the right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropMargins {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Clamped crop rectangle in absolute pixel coordinates (`right` and
/// `bottom` are exclusive edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropMargins {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Resolves the margins against an image of `width` x `height`
    /// (both at least 1). The result is never empty or inverted.
    pub fn clamp_to(&self, width: u32, height: u32) -> CropRect {
        let left = self.left.min(width - 1);
        let top = self.top.min(height - 1);
        let right = width.saturating_sub(self.right).clamp(left + 1, width);
        let bottom = height.saturating_sub(self.bottom).clamp(top + 1, height);
        CropRect { left, top, right, bottom }
    }
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn is_full_image(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.right == width && self.bottom == height
    }
}

pub fn crop(image: &RgbImage, rect: CropRect) -> RgbImage {
    imageops::crop_imm(image, rect.left, rect.top, rect.width(), rect.height()).to_image()
}
