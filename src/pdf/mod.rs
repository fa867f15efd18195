//! Document access layer
//!
//! Source documents are read through the [`DocumentSource`] trait: PDFs via
//! lopdf (images) and PDFium (text), or in-memory documents.

mod document;
mod reader;

pub use document::{
    ColorSpace, DocumentSource, EmbeddedImage, ImageEncoding, MemoryDocument, MemoryPage,
};
pub use reader::PdfReader;
