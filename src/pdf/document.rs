//! Page-oriented view of a source document

use crate::error::{Error, Result};

/// Sample layout of raw (non-container) image data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Gray,
    Cmyk,
}

impl ColorSpace {
    /// Map a PDF color space name; unknown spaces are read as RGB
    pub fn from_pdf_name(name: &str) -> Self {
        match name {
            "DeviceGray" | "CalGray" | "G" | "Gray" => ColorSpace::Gray,
            "DeviceCMYK" | "CMYK" => ColorSpace::Cmyk,
            _ => ColorSpace::Rgb,
        }
    }

    pub fn channels(self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorSpace::Rgb => "RGB",
            ColorSpace::Gray => "Gray",
            ColorSpace::Cmyk => "CMYK",
        }
    }
}

/// How an embedded image's bytes are stored in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Self-describing image file (JPEG, JPEG 2000, PNG...)
    Container,
    /// zlib-compressed 8-bit samples
    Flate { color_space: ColorSpace },
    /// Uncompressed 8-bit samples
    Raw { color_space: ColorSpace },
    /// Filter chain with no decoder
    Unsupported { filter: String },
}

impl ImageEncoding {
    /// Classify a PDF image stream by its filter chain and sample depth
    ///
    /// Only 8-bit samples are decoded; a missing depth is read as 8.
    pub fn from_filters(
        filters: &[String],
        color_space: Option<&str>,
        bits_per_component: Option<i64>,
    ) -> Self {
        let color_space = color_space
            .map(ColorSpace::from_pdf_name)
            .unwrap_or(ColorSpace::Rgb);

        let encoding = match filters {
            [] => ImageEncoding::Raw { color_space },
            [single] => match single.as_str() {
                "DCTDecode" | "JPXDecode" => ImageEncoding::Container,
                "FlateDecode" => ImageEncoding::Flate { color_space },
                other => ImageEncoding::Unsupported {
                    filter: other.to_string(),
                },
            },
            chain => ImageEncoding::Unsupported {
                filter: chain.join(" "),
            },
        };

        match (encoding, bits_per_component) {
            (ImageEncoding::Raw { .. } | ImageEncoding::Flate { .. }, Some(bits)) if bits != 8 => {
                ImageEncoding::Unsupported {
                    filter: format!("{}-bit samples", bits),
                }
            }
            (encoding, _) => encoding,
        }
    }
}

/// Raster image object found in a page's resources
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Width declared by the document
    pub width: u32,
    /// Height declared by the document
    pub height: u32,
    /// Bytes exactly as stored (still encoded)
    pub data: Vec<u8>,
    pub encoding: ImageEncoding,
    /// Samples already unpacked by the document reader (filters and
    /// predictors undone), used instead of inflating `data`
    pub samples: Option<Vec<u8>>,
}

/// Source of pages, embedded images and text
///
/// Pages are numbered from 1.
pub trait DocumentSource {
    fn page_count(&self) -> u32;

    /// Embedded images of a page, in page order
    fn page_images(&self, page: u32) -> Result<Vec<EmbeddedImage>>;

    /// Plain text of a page; paragraphs are separated by a blank line
    fn page_text(&self, page: u32) -> Result<String>;

    fn check_page(&self, page: u32) -> Result<()> {
        let total = self.page_count();
        if page < 1 || page > total {
            return Err(Error::PageOutOfBounds { page, total });
        }
        Ok(())
    }
}

/// One page of a [`MemoryDocument`]
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    pub images: Vec<EmbeddedImage>,
    pub text: String,
}

/// Document held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    /// Append a page and return its 1-based number
    pub fn push_page(&mut self, page: MemoryPage) -> u32 {
        self.pages.push(page);
        self.pages.len() as u32
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_images(&self, page: u32) -> Result<Vec<EmbeddedImage>> {
        self.check_page(page)?;
        Ok(self.pages[(page - 1) as usize].images.clone())
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.check_page(page)?;
        Ok(self.pages[(page - 1) as usize].text.clone())
    }
}
