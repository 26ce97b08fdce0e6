//! Certificate wording and the arithmetic that places it on the template.
//!
//! Every line is centered horizontally on its own measured width. A line made
//! of several fragments is measured fragment by fragment with each fragment's
//! own font; the widths are summed without cross-fragment kerning and the sum
//! is centered as one block.

use crate::error::{CertificateError, Result};
use crate::fonts::{FontSet, Typeface, Weight};
use crate::{ANCHOR_RATIO, DATE_SPACING_FACTOR, LINE_SPACING, MULTILINE_SPACING};

use anyhow::Context;
use image::{Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const NAME_TOKEN: &str = "{name}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpec {
    pub text: String,
    #[serde(default)]
    pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub fragments: Vec<FragmentSpec>,
    /// Vertical advance from the previous line. Ignored for the first line.
    #[serde(default)]
    pub offset: f32,
    /// Alignment of wrapped (`\n`) lines inside a fragment.
    #[serde(default)]
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// First line's y as a fraction of the template height.
    pub anchor_ratio: f32,
    pub lines: Vec<LineSpec>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            anchor_ratio: ANCHOR_RATIO,
            lines: vec![
                LineSpec {
                    fragments: vec![
                        FragmentSpec::regular("This is to certify that "),
                        FragmentSpec::bold(NAME_TOKEN),
                        FragmentSpec::regular(" has successfully attended a talk on "),
                    ],
                    offset: 0.0,
                    align: Align::Center,
                },
                LineSpec::single("\"_____________________________\"", LINE_SPACING),
                LineSpec::single(
                    " at\nShri Madhwa Vadiraja Institute of Technology and Management, Bantakal",
                    LINE_SPACING,
                ),
                LineSpec::single("on ___________ __, ____.", LINE_SPACING * DATE_SPACING_FACTOR),
            ],
        }
    }
}

impl FragmentSpec {
    pub fn regular(text: &str) -> Self {
        Self {
            text: text.to_string(),
            weight: Weight::Regular,
        }
    }

    pub fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            weight: Weight::Bold,
        }
    }
}

impl LineSpec {
    pub fn single(text: &str, offset: f32) -> Self {
        Self {
            fragments: vec![FragmentSpec::regular(text)],
            offset,
            align: Align::Center,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
        let config: LayoutConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse layout file: {}", path.display()))?;
        config.validate()?;
        debug!("Loaded layout with {} lines from {}", config.lines.len(), path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(CertificateError::Layout("layout has no lines".into()));
        }
        if let Some(i) = self.lines.iter().position(|l| l.fragments.is_empty()) {
            return Err(CertificateError::Layout(format!("line {} has no fragments", i + 1)));
        }
        if !self.anchor_ratio.is_finite() {
            return Err(CertificateError::Layout("anchor_ratio must be finite".into()));
        }
        Ok(())
    }

    /// Computes where every fragment of every line goes for `name` on a
    /// `width` x `height` template.
    pub fn place<F: Typeface>(
        &self,
        fonts: &FontSet<F>,
        name: &str,
        width: u32,
        height: u32,
    ) -> Vec<PlacedLine> {
        let mut placed = Vec::with_capacity(self.lines.len());
        let mut y = height as f32 * self.anchor_ratio;

        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                y += line.offset;
            }

            let blocks: Vec<(String, Weight, TextBlock)> = line
                .fragments
                .iter()
                .map(|fragment| {
                    let text = fragment.text.replace(NAME_TOKEN, name);
                    let block = TextBlock::measure(fonts.get(fragment.weight), &text);
                    (text, fragment.weight, block)
                })
                .collect();

            let total_width: f32 = blocks.iter().map(|(_, _, block)| block.width).sum();
            let start_x = (width as f32 - total_width) / 2.0;

            let mut cursor_x = start_x;
            let mut fragments = Vec::with_capacity(blocks.len());
            for (text, weight, block) in blocks {
                let advance = block.width;
                fragments.push(PlacedFragment {
                    text,
                    weight,
                    x: cursor_x,
                    y,
                    block,
                });
                cursor_x += advance;
            }

            placed.push(PlacedLine {
                y,
                start_x,
                width: total_width,
                align: line.align,
                fragments,
            });
        }
        placed
    }
}

/// A fragment's text split on `\n`, with each line's measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<(String, f32)>,
    pub width: f32,
    pub line_advance: f32,
}

impl TextBlock {
    pub fn measure<F: Typeface>(face: &F, text: &str) -> Self {
        let line_advance = face.multiline_step() + MULTILINE_SPACING;
        let lines: Vec<(String, f32)> = text
            .split('\n')
            .map(|line| (line.to_string(), face.measure(line)))
            .collect();
        let width = lines.iter().map(|(_, w)| *w).fold(0.0, f32::max);
        Self {
            lines,
            width,
            line_advance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFragment {
    pub text: String,
    pub weight: Weight,
    pub x: f32,
    pub y: f32,
    pub block: TextBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub y: f32,
    pub start_x: f32,
    pub width: f32,
    pub align: Align,
    pub fragments: Vec<PlacedFragment>,
}

impl PlacedLine {
    pub fn draw<F: Typeface>(&self, canvas: &mut RgbaImage, fonts: &FontSet<F>, color: Rgba<u8>) {
        for fragment in &self.fragments {
            let face = fonts.get(fragment.weight);
            let block = &fragment.block;
            for (i, (text, line_width)) in block.lines.iter().enumerate() {
                let inset = match self.align {
                    Align::Left => 0.0,
                    Align::Center => (block.width - line_width) / 2.0,
                    Align::Right => block.width - line_width,
                };
                let y = fragment.y + block.line_advance * i as f32;
                face.draw(canvas, fragment.x + inset, y, color, text);
            }
        }
    }
}
