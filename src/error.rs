use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CertificateError>;

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Font file not found: {}", .0.display())]
    FontNotFound(PathBuf),

    #[error("Failed to parse font file: {}", .0.display())]
    FontParse(PathBuf),

    /// The name would escape the output directory once turned into a file name.
    #[error("Name cannot be used as a file name: {0:?}")]
    UnsafeName(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
