use crate::error::{CertificateError, Result};
use crate::fonts::{FontSet, Typeface};
use crate::layout::{LayoutConfig, PlacedLine};

use image::{ImageFormat, Rgba, RgbaImage};
use itertools::Itertools;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

pub const FILE_SUFFIX: &str = "_certificate.png";

/// Decoded background image, shared read-only by every certificate.
pub struct Template {
    image: RgbaImage,
}

impl Template {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CertificateError::TemplateNotFound(path.to_path_buf()));
        }
        debug!("Decoding template {}", path.display());
        let image = image::open(path)?.to_rgba8();
        info!(
            "Loaded template {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self { image })
    }

    #[cfg(test)]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: Vec<PathBuf>,
    /// Failing names with the error message, in input order.
    pub failures: Vec<(String, String)>,
}

pub struct CertificateRenderer<F> {
    template: Template,
    fonts: FontSet<F>,
    color: Rgba<u8>,
    layout: LayoutConfig,
    output_dir: PathBuf,
}

impl<F: Typeface> CertificateRenderer<F> {
    pub fn new<P: Into<PathBuf>>(
        template: Template,
        fonts: FontSet<F>,
        color: Rgba<u8>,
        layout: LayoutConfig,
        output_dir: P,
    ) -> Result<Self> {
        layout.validate()?;
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        debug!("Writing certificates to {}", output_dir.display());
        Ok(Self {
            template,
            fonts,
            color,
            layout,
            output_dir,
        })
    }

    #[cfg(test)]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn layout_for(&self, name: &str) -> Vec<PlacedLine> {
        self.layout
            .place(&self.fonts, name, self.template.width(), self.template.height())
    }

    /// Draws the certificate for `name` without saving it.
    pub fn compose(&self, name: &str) -> RgbaImage {
        let mut canvas = self.template.image.clone();
        for line in self.layout_for(name) {
            debug!(
                "Line at y={} spans x={}..{}",
                line.y,
                line.start_x,
                line.start_x + line.width
            );
            for fragment in &line.fragments {
                debug!("Drawing {:?} at ({}, {})", fragment.text, fragment.x, fragment.y);
            }
            line.draw(&mut canvas, &self.fonts, self.color);
        }
        canvas
    }

    pub fn output_path(&self, name: &str) -> Result<PathBuf> {
        if name.contains(['/', '\\', '\0']) {
            return Err(CertificateError::UnsafeName(name.to_string()));
        }
        Ok(self.output_dir.join(format!("{name}{FILE_SUFFIX}")))
    }

    pub fn render(&self, name: &str) -> Result<PathBuf> {
        let output_path = self.output_path(name)?;
        let certificate = self.compose(name);
        certificate.save_with_format(&output_path, ImageFormat::Png)?;
        Ok(output_path)
    }

    pub fn render_batch(&self, names: &[String]) -> Vec<PathBuf> {
        self.render_batch_report(names).generated
    }

    pub fn render_batch_report(&self, names: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for name in names {
            match self.render(name) {
                Ok(path) => {
                    info!("Generated certificate for: {}", name);
                    report.generated.push(path);
                }
                Err(e) => {
                    error!("Error generating certificate for {}: {}", name, e);
                    report.failures.push((name.clone(), e.to_string()));
                }
            }
        }

        info!("Successfully generated {} certificates.", report.generated.len());
        if !report.failures.is_empty() {
            warn!(
                "Failed for {} names: {}",
                report.failures.len(),
                report.failures.iter().map(|(name, _)| name).join(", ")
            );
        }
        report
    }
}
