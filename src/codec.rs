//! Image decoding and PNG encoding

use crate::error::{Error, Result};
use crate::pdf::{ColorSpace, EmbeddedImage, ImageEncoding};
use flate2::read::ZlibDecoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, GrayImage, RgbImage};
use std::io::Read;

/// Decode an embedded image into pixels
pub fn decode(embedded: &EmbeddedImage) -> Result<DynamicImage> {
    match &embedded.encoding {
        ImageEncoding::Container => Ok(image::load_from_memory(&embedded.data)?),
        ImageEncoding::Flate { color_space } => {
            let samples = match &embedded.samples {
                Some(samples) => samples.clone(),
                None => {
                    let mut samples = Vec::new();
                    ZlibDecoder::new(embedded.data.as_slice()).read_to_end(&mut samples)?;
                    samples
                }
            };
            from_samples(samples, embedded.width, embedded.height, *color_space)
        }
        ImageEncoding::Raw { color_space } => from_samples(
            embedded.samples.clone().unwrap_or_else(|| embedded.data.clone()),
            embedded.width,
            embedded.height,
            *color_space,
        ),
        ImageEncoding::Unsupported { filter } => Err(Error::UnsupportedEncoding {
            filter: filter.clone(),
        }),
    }
}

fn from_samples(
    samples: Vec<u8>,
    width: u32,
    height: u32,
    color_space: ColorSpace,
) -> Result<DynamicImage> {
    let len = samples.len();
    let mismatch = || Error::SampleBufferMismatch {
        len,
        width,
        height,
        color_space: color_space.as_str(),
    };

    // Extra bytes mean row predictors or a wider sample depth
    let expected = width as usize * height as usize * color_space.channels();
    if len != expected {
        return Err(mismatch());
    }

    let image = match color_space {
        ColorSpace::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        ColorSpace::Gray => {
            GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
        }
        ColorSpace::Cmyk => {
            RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).map(DynamicImage::ImageRgb8)
        }
    };
    image.ok_or_else(mismatch)
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for px in cmyk.chunks_exact(4) {
        let k = 255 - u16::from(px[3]);
        for &ink in &px[..3] {
            rgb.push(((255 - u16::from(ink)) * k / 255) as u8);
        }
    }
    rgb
}

/// Drop an alpha channel (RGBA or gray+alpha) by converting to RGB
pub fn without_alpha(image: DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image
    }
}

/// Encode as PNG; `optimize` trades speed for the smallest output
pub fn encode_png(image: &DynamicImage, optimize: bool) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    let encoder = if optimize {
        PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive)
    } else {
        PngEncoder::new(&mut png)
    };
    image.write_with_encoder(encoder)?;
    Ok(png)
}
