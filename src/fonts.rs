use crate::error::{CertificateError, Result};

use image::{Rgba, RgbaImage};
use log::debug;
use rusttype::{point, Font, Scale};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A font at a fixed size that can measure and draw single lines of text.
///
/// Coordinates passed to [`Typeface::draw`] are the top-left corner of the
/// line box; the baseline sits one ascent below `y`.
pub trait Typeface {
    /// Width of a single line, trailing spaces included.
    fn measure(&self, text: &str) -> f32;

    /// Height of the line box, ascent to descent.
    fn line_height(&self) -> f32;

    /// Step between wrapped lines before extra spacing: the bottom of the
    /// glyph `A` measured from the top of the line box.
    fn multiline_step(&self) -> f32;

    fn draw(&self, canvas: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

pub struct FontSet<F> {
    pub regular: F,
    pub bold: F,
}

impl<F: Typeface> FontSet<F> {
    pub fn new(regular: F, bold: F) -> Self {
        Self { regular, bold }
    }

    pub fn get(&self, weight: Weight) -> &F {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

pub struct TrueTypeFace {
    font: Font<'static>,
    scale: Scale,
    ascent: f32,
    descent: f32,
}

impl TrueTypeFace {
    /// Loads a TrueType/OpenType font file. `size` is the em size in pixels.
    pub fn load<P: AsRef<Path>>(path: P, size: f32) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CertificateError::FontNotFound(path.to_path_buf()));
        }
        debug!("Loading font {} at size {}", path.display(), size);
        let bytes = std::fs::read(path)?;
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| CertificateError::FontParse(path.to_path_buf()))?;
        Ok(Self::from_font(font, size))
    }

    pub fn from_font(font: Font<'static>, size: f32) -> Self {
        // rusttype scales by ascent-to-descent height, not by em.
        let unscaled = font.v_metrics_unscaled();
        let units_per_em = f32::from(font.units_per_em().max(1));
        let pixel_height = size * (unscaled.ascent - unscaled.descent) / units_per_em;
        let scale = Scale::uniform(pixel_height);
        let v_metrics = font.v_metrics(scale);
        Self {
            font,
            scale,
            ascent: v_metrics.ascent,
            descent: v_metrics.descent,
        }
    }
}

impl Typeface for TrueTypeFace {
    fn measure(&self, text: &str) -> f32 {
        let mut width: f32 = 0.0;
        for glyph in self.font.layout(text, self.scale, point(0.0, self.ascent)) {
            let pen_end = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
            width = width.max(pen_end);
            if let Some(bb) = glyph.pixel_bounding_box() {
                width = width.max(bb.max.x as f32);
            }
        }
        width
    }

    fn line_height(&self) -> f32 {
        self.ascent - self.descent
    }

    fn multiline_step(&self) -> f32 {
        self.font
            .glyph('A')
            .scaled(self.scale)
            .positioned(point(0.0, self.ascent))
            .pixel_bounding_box()
            .map(|bb| bb.max.y as f32)
            .unwrap_or(self.ascent)
    }

    fn draw(&self, canvas: &mut RgbaImage, x: f32, y: f32, color: Rgba<u8>, text: &str) {
        let (canvas_w, canvas_h) = canvas.dimensions();
        for glyph in self.font.layout(text, self.scale, point(x, y + self.ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px as u32 >= canvas_w || py as u32 >= canvas_h {
                    return;
                }
                blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

/// Composites `color` over `dst` (straight alpha) with the given glyph
/// coverage in `0.0..=1.0`.
pub fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * f32::from(color.0[3]) / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let dst_weight = f32::from(dst.0[3]) / 255.0 * (1.0 - alpha);
    let out_alpha = alpha + dst_weight;
    for c in 0..3 {
        let mixed = f32::from(color.0[c]) * alpha + f32::from(dst.0[c]) * dst_weight;
        dst.0[c] = (mixed / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round() as u8;
}

/// Parses a `#RRGGBB` (or `#RRGGBBAA`) color string.
pub fn parse_color(s: &str) -> Result<Rgba<u8>> {
    let digits = s.trim().trim_start_matches('#');
    let bytes = hex::decode(digits).map_err(|_| CertificateError::InvalidColor(s.to_string()))?;
    match bytes.as_slice() {
        [r, g, b] => Ok(Rgba([*r, *g, *b, 255])),
        [r, g, b, a] => Ok(Rgba([*r, *g, *b, *a])),
        _ => Err(CertificateError::InvalidColor(s.to_string())),
    }
}
