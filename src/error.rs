//! Error types for cranium-atlas

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cranium-atlas
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cranium-atlas
#[derive(Error, Debug)]
pub enum Error {
    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: u32, total: u32 },

    /// The document was opened without its text layer
    #[error("Text layer not loaded for page {page}")]
    TextUnavailable { page: u32 },

    /// Embedded image stored with a filter chain the codec cannot decode
    #[error("Unsupported image encoding: {filter}")]
    UnsupportedEncoding { filter: String },

    /// Raw sample buffer does not match the declared dimensions
    #[error("Sample buffer of {len} bytes does not fit a {width}x{height} {color_space} image")]
    SampleBufferMismatch {
        len: usize,
        width: u32,
        height: u32,
        color_space: &'static str,
    },

    /// Output directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input directory could not be listed
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image decode or encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
