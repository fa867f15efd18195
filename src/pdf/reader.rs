//! PDF-backed document source
//!
//! Image XObjects are read with lopdf so their stream bytes stay exactly as
//! stored. The text layer comes from PDFium, which is only bound when text is
//! requested.

use super::document::{DocumentSource, EmbeddedImage, ImageEncoding};
use crate::error::{Error, Result};
use flate2::read::ZlibDecoder;
use lopdf::xobject::PdfImage;
use lopdf::{Object, ObjectId};
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::Path;

/// Get PDFium instance (creates new instance each time - PDFium is not thread-safe)
fn create_pdfium() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

fn check_magic(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// PDF opened for image enumeration and, optionally, text extraction
pub struct PdfReader {
    document: lopdf::Document,
    /// Page object ids ordered by page number
    pages: Vec<ObjectId>,
    page_texts: Option<Vec<String>>,
}

impl PdfReader {
    /// Open a PDF for image extraction only (PDFium is not required)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = Self::read(path.as_ref())?;
        Self::open_bytes(&data)
    }

    /// Open a PDF and extract every page's text up front
    pub fn open_with_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = Self::read(path.as_ref())?;
        Self::open_bytes_with_text(&data)
    }

    pub fn open_bytes(data: &[u8]) -> Result<Self> {
        check_magic(data)?;

        let document = lopdf::Document::load_mem(data).map_err(|e| Error::InvalidPdf {
            reason: e.to_string(),
        })?;
        let pages = document.get_pages().into_values().collect();

        Ok(Self {
            document,
            pages,
            page_texts: None,
        })
    }

    pub fn open_bytes_with_text(data: &[u8]) -> Result<Self> {
        let mut reader = Self::open_bytes(data)?;
        reader.page_texts = Some(extract_all_page_texts(data)?);
        Ok(reader)
    }

    fn read(path: &Path) -> Result<Vec<u8>> {
        if !path.exists() {
            return Err(Error::PdfNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(std::fs::read(path)?)
    }
}

/// Row predictor settings from a Flate image's `DecodeParms`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PredictorParams {
    predictor: i64,
    colors: usize,
    bits_per_component: usize,
    columns: usize,
}

impl PredictorParams {
    fn from_dict(dict: &lopdf::Dictionary) -> Option<Self> {
        let params = match dict.get(b"DecodeParms") {
            Ok(Object::Dictionary(params)) => params,
            Ok(Object::Array(list)) => match list.first() {
                Some(Object::Dictionary(params)) => params,
                _ => return None,
            },
            _ => return None,
        };
        let int = |key: &[u8], default: i64| {
            params
                .get(key)
                .and_then(Object::as_i64)
                .unwrap_or(default)
                .max(1)
        };

        Some(Self {
            predictor: int(b"Predictor", 1),
            colors: int(b"Colors", 1) as usize,
            bits_per_component: int(b"BitsPerComponent", 8) as usize,
            columns: int(b"Columns", 1) as usize,
        })
    }

    fn is_png(&self) -> bool {
        (10..=15).contains(&self.predictor)
    }

    fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bits_per_component / 8).max(1)
    }
}

/// Inflate a Flate image and undo PNG row predictors
///
/// Images without predictors are left to the codec. TIFF predictors are
/// reported as unsupported.
fn flate_samples(
    image: &PdfImage<'_>,
    encoding: ImageEncoding,
) -> (ImageEncoding, Option<Vec<u8>>) {
    let params = match PredictorParams::from_dict(image.origin_dict) {
        Some(params) if params.predictor > 1 => params,
        _ => return (encoding, None),
    };

    if !params.is_png() {
        let unsupported = ImageEncoding::Unsupported {
            filter: format!("FlateDecode with predictor {}", params.predictor),
        };
        return (unsupported, None);
    }

    let mut inflated = Vec::new();
    let unpacked = ZlibDecoder::new(image.content)
        .read_to_end(&mut inflated)
        .and_then(|_| {
            lopdf::filters::png::decode_frame(&inflated, params.bytes_per_pixel(), params.columns)
        });

    match unpacked {
        Ok(samples) => (encoding, Some(samples)),
        Err(e) => {
            tracing::debug!(object = ?image.id, error = %e, "Failed to undo row predictors");
            (encoding, None)
        }
    }
}

impl DocumentSource for PdfReader {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_images(&self, page: u32) -> Result<Vec<EmbeddedImage>> {
        self.check_page(page)?;
        let page_id = self.pages[(page - 1) as usize];

        let images = self
            .document
            .get_page_images(page_id)
            .map_err(|e| Error::InvalidPdf {
                reason: format!("Failed to read images of page {}: {}", page, e),
            })?;

        Ok(images
            .into_iter()
            .map(|image| {
                let encoding = ImageEncoding::from_filters(
                    image.filters.as_deref().unwrap_or(&[]),
                    image.color_space.as_deref(),
                    image.bits_per_component,
                );
                let (encoding, samples) = match encoding {
                    ImageEncoding::Flate { .. } => flate_samples(&image, encoding),
                    other => (other, None),
                };

                EmbeddedImage {
                    width: u32::try_from(image.width).unwrap_or(0),
                    height: u32::try_from(image.height).unwrap_or(0),
                    data: image.content.to_vec(),
                    encoding,
                    samples,
                }
            })
            .collect())
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.check_page(page)?;
        self.page_texts
            .as_ref()
            .and_then(|texts| texts.get((page - 1) as usize))
            .cloned()
            .ok_or(Error::TextUnavailable { page })
    }
}

/// Map PDFium errors to our error type
fn map_pdfium_error(err: PdfiumError) -> Error {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            Error::InvalidPdf {
                reason: "PDF is password protected".to_string(),
            }
        }
        _ => Error::Pdfium {
            reason: format!("{}", err),
        },
    }
}

fn extract_all_page_texts(data: &[u8]) -> Result<Vec<String>> {
    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(map_pdfium_error)?;

    let pages = document.pages();
    let mut texts = Vec::with_capacity(pages.len() as usize);

    for index in 0..pages.len() {
        let page = pages.get(index).map_err(|e| Error::Pdfium {
            reason: format!("Failed to get page {}: {}", index + 1, e),
        })?;

        let glyphs = collect_glyphs(&page);
        texts.push(layout_text(glyphs));
    }

    Ok(texts)
}

// ============================================================================
// Text layout
// ============================================================================

/// Character with its position on the page (PDF coordinates, y grows upward)
#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyph {
    pub ch: char,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

struct TextLine {
    glyphs: Vec<Glyph>,
    y: f32,
    avg_height: f32,
}

/// Line gap, relative to font height, that starts a new paragraph
const PARAGRAPH_GAP: f32 = 1.5;

fn collect_glyphs(page: &PdfPage) -> Vec<Glyph> {
    let text = match page.text() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };

    let mut glyphs = Vec::new();
    for segment in text.segments().iter() {
        let Ok(chars) = segment.chars() else {
            continue;
        };
        for char_result in chars.iter() {
            let (Some(ch), Ok(bounds)) = (char_result.unicode_char(), char_result.loose_bounds())
            else {
                continue;
            };
            glyphs.push(Glyph {
                ch,
                x: bounds.left().value,
                y: bounds.top().value,
                width: bounds.width().value,
                height: bounds.height().value,
            });
        }
    }
    glyphs
}

/// Y tolerance for same-line grouping and the gap that implies a space,
/// both scaled from the median glyph height
fn thresholds(glyphs: &[Glyph]) -> (f32, f32) {
    let mut heights: Vec<f32> = glyphs
        .iter()
        .map(|g| g.height)
        .filter(|h| *h > 0.0)
        .collect();
    if heights.is_empty() {
        return (5.0, 10.0);
    }
    heights.sort_by(|a, b| a.total_cmp(b));
    let median = heights[heights.len() / 2];
    ((median * 0.4).max(2.0), (median * 0.3).max(3.0))
}

fn group_lines(mut glyphs: Vec<Glyph>, y_tolerance: f32) -> Vec<TextLine> {
    // top of page first, then left to right
    glyphs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<Glyph>> = Vec::new();
    let mut line_y: Option<f32> = None;
    for glyph in glyphs {
        let same_line = line_y.is_some_and(|y| (y - glyph.y).abs() <= y_tolerance);
        match lines.last_mut() {
            Some(line) if same_line => line.push(glyph),
            _ => {
                line_y = Some(glyph.y);
                lines.push(vec![glyph]);
            }
        }
    }

    lines
        .into_iter()
        .map(|mut glyphs| {
            glyphs.sort_by(|a, b| a.x.total_cmp(&b.x));
            let avg_height = glyphs.iter().map(|g| g.height).sum::<f32>() / glyphs.len() as f32;
            TextLine {
                y: glyphs[0].y,
                avg_height,
                glyphs,
            }
        })
        .collect()
}

/// Rebuild reading-order text, separating paragraphs with a blank line
pub(crate) fn layout_text(glyphs: Vec<Glyph>) -> String {
    if glyphs.is_empty() {
        return String::new();
    }

    let (y_tolerance, space_threshold) = thresholds(&glyphs);
    let lines = group_lines(glyphs, y_tolerance);

    let mut out = String::new();
    let mut previous: Option<(f32, f32)> = None;

    for line in &lines {
        if let Some((prev_y, prev_height)) = previous {
            if prev_y - line.y > prev_height.max(line.avg_height) * PARAGRAPH_GAP {
                out.push('\n');
            }
        }

        let mut prev_right: Option<(f32, char)> = None;
        for glyph in &line.glyphs {
            if let Some((right, prev_ch)) = prev_right {
                let gap = glyph.x - right;
                if gap > space_threshold && !glyph.ch.is_whitespace() && !prev_ch.is_whitespace()
                {
                    out.push(' ');
                }
            }
            out.push(glyph.ch);
            prev_right = Some((glyph.x + glyph.width, glyph.ch));
        }

        out.push('\n');
        previous = Some((line.y, line.avg_height));
    }

    out.trim_end().to_string()
}
