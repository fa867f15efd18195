//! Embedded image extraction into the flat `raw` directory

use crate::codec;
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use crate::pdf::{DocumentSource, EmbeddedImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the subdirectory extracted images are written to
pub const RAW_DIR: &str = "raw";

/// BLAKE3 digest of an image's stored bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(blake3::Hash);

impl ContentHash {
    pub fn of(data: &[u8]) -> Self {
        Self(blake3::hash(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

/// Image accepted for writing
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Page number (1-indexed)
    pub page: u32,
    /// Image index on the page (1-indexed, counts skipped images too)
    pub index: u32,
    /// Decoded width in pixels
    pub width: u32,
    /// Decoded height in pixels
    pub height: u32,
    /// PNG encoded pixels
    pub png: Vec<u8>,
    pub content_hash: ContentHash,
}

impl ExtractedImage {
    pub fn file_name(&self) -> String {
        raw_file_name(self.page, self.index)
    }
}

/// `page_{page}_img_{index}.png`
pub fn raw_file_name(page: u32, index: u32) -> String {
    format!("page_{}_img_{}.png", page, index)
}

/// Outcome of one extraction run
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    /// Files written, in document order
    pub written: Vec<PathBuf>,
    pub undersized: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// What happened to a single embedded image
enum Outcome {
    Accepted(ExtractedImage),
    Undersized,
    Duplicate,
}

/// Writes every sufficiently large, not yet seen embedded image as PNG
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract into `<output_dir>/raw`
    ///
    /// Only failing to create the output directory is fatal; failures on a
    /// single page or image are logged and counted.
    pub fn run<D>(&self, document: &D, output_dir: &Path) -> Result<ExtractionSummary>
    where
        D: DocumentSource + ?Sized,
    {
        let raw_dir = output_dir.join(RAW_DIR);
        std::fs::create_dir_all(&raw_dir).map_err(|source| Error::CreateDir {
            path: raw_dir.clone(),
            source,
        })?;

        let mut seen = HashSet::new();
        let mut summary = ExtractionSummary::default();

        for page in 1..=document.page_count() {
            let images = match document.page_images(page) {
                Ok(images) => images,
                Err(e) => {
                    tracing::error!(page, error = %e, "Failed to enumerate page images");
                    summary.failed += 1;
                    continue;
                }
            };

            for (idx, embedded) in images.iter().enumerate() {
                let index = idx as u32 + 1;
                let result = self
                    .inspect(page, index, embedded, &mut seen)
                    .and_then(|outcome| match outcome {
                        Outcome::Accepted(image) => {
                            write_image(&raw_dir, &image).map(Some)
                        }
                        Outcome::Undersized => {
                            summary.undersized += 1;
                            Ok(None)
                        }
                        Outcome::Duplicate => {
                            tracing::debug!(page, index, "Skipping duplicate image");
                            summary.duplicates += 1;
                            Ok(None)
                        }
                    });

                match result {
                    Ok(Some(path)) => summary.written.push(path),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(page, index, error = %e, "Failed to extract image");
                        summary.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            written = summary.written.len(),
            undersized = summary.undersized,
            duplicates = summary.duplicates,
            failed = summary.failed,
            "Extraction finished"
        );

        Ok(summary)
    }

    /// Decode, size-check and fingerprint one image
    fn inspect(
        &self,
        page: u32,
        index: u32,
        embedded: &EmbeddedImage,
        seen: &mut HashSet<ContentHash>,
    ) -> Result<Outcome> {
        let decoded = codec::decode(embedded)?;
        let (width, height) = (decoded.width(), decoded.height());
        if !self.config.accepts(width, height) {
            return Ok(Outcome::Undersized);
        }

        let content_hash = ContentHash::of(&embedded.data);
        if !seen.insert(content_hash) {
            return Ok(Outcome::Duplicate);
        }

        let png = codec::encode_png(&decoded, false)?;
        Ok(Outcome::Accepted(ExtractedImage {
            page,
            index,
            width,
            height,
            png,
            content_hash,
        }))
    }
}

fn write_image(raw_dir: &Path, image: &ExtractedImage) -> Result<PathBuf> {
    let file_name = image.file_name();
    let path = raw_dir.join(&file_name);
    std::fs::write(&path, &image.png)?;
    tracing::info!(
        page = image.page,
        index = image.index,
        width = image.width,
        height = image.height,
        "Extracted: {}",
        file_name
    );
    Ok(path)
}
