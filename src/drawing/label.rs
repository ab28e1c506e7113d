use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::error::{PotholeError, Result};

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws text tags on a filled background. Without a font only the
/// background is drawn, sized from an average glyph width.
pub struct LabelRenderer {
    font: Option<FontVec>,
    scale: PxScale,
}

impl LabelRenderer {
    pub fn new(font: Option<FontVec>, scale: f32) -> Self {
        Self {
            font,
            scale: PxScale::from(scale),
        }
    }

    pub fn from_file(path: &Path, scale: f32) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| PotholeError::Font(format!("{}: {e}", path.display())))?;
        Ok(Self::new(Some(font), scale))
    }

    /// Uses `path` when given, otherwise the first readable system font.
    pub fn discover(path: Option<&Path>, scale: f32) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path, scale);
        }

        for candidate in SYSTEM_FONTS.iter().map(PathBuf::from) {
            if candidate.is_file() {
                match Self::from_file(&candidate, scale) {
                    Ok(renderer) => {
                        log::debug!("Using label font {}", candidate.display());
                        return Ok(renderer);
                    }
                    Err(e) => log::debug!("Skipping font {}: {e}", candidate.display()),
                }
            }
        }

        log::warn!("No label font found, area labels will be drawn without text (use --font)");
        Ok(Self::new(None, scale))
    }

    pub fn measure(&self, text: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(self.scale, font, text),
            None => {
                let glyph_width = (self.scale.x * 0.55).ceil() as u32;
                (glyph_width * text.chars().count() as u32, self.scale.y.ceil() as u32)
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)` over a filled box.
    pub fn draw(
        &self,
        image: &mut RgbImage,
        (x, y): (i32, i32),
        text: &str,
        background: Rgb<u8>,
        foreground: Rgb<u8>,
    ) {
        let (width, height) = self.measure(text);
        if width > 0 {
            let rect = Rect::at(x, y).of_size(width, height + 2);
            draw_filled_rect_mut(image, rect, background);
        }
        if let Some(font) = &self.font {
            draw_text_mut(image, foreground, x, y, self.scale, font, text);
        }
    }
}
