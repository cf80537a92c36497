// ABOUTME: Decoding of uploaded source frames into PDF-embeddable image data
// ABOUTME: JPEG passes through as DCT data after header sniffing; PNG is decoded and flattened onto white
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use std::io::Cursor;

/// Largest source image accepted for embedding, in pixels
const MAX_PIXELS: u64 = 40_000_000;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Failure to turn uploaded bytes into an embeddable image
#[derive(Debug, thiserror::Error)]
pub enum ImageDecodeError {
    /// Neither JPEG nor PNG
    #[error("unsupported image format")]
    UnsupportedFormat,
    /// JPEG without a readable frame header
    #[error("malformed JPEG: {0}")]
    MalformedJpeg(&'static str),
    /// PNG decoder failure
    #[error("PNG decoding failed: {0}")]
    Png(#[from] png::DecodingError),
    /// Dimensions are zero or too large
    #[error("invalid image dimensions {width}x{height}")]
    Dimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
}

/// Color space of embedded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One channel
    Gray,
    /// Three channels
    Rgb,
    /// Four channels
    Cmyk,
}

/// How the pixel data is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// 8-bit samples, row-major
    Raw,
    /// Baseline or progressive JPEG stream
    Jpeg,
}

/// Image ready to be written as an XObject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Sample color space
    pub color_space: ColorSpace,
    /// Storage
    pub encoding: ImageEncoding,
    /// Sample or JPEG bytes
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    /// Height over width
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width.max(1))
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ImageDecodeError> {
    if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(ImageDecodeError::Dimensions { width, height });
    }
    Ok(())
}

/// Decode uploaded bytes for embedding
///
/// # Errors
///
/// Returns an error for formats other than JPEG and PNG, corrupt data, or
/// degenerate dimensions.
pub fn decode_source_image(bytes: &[u8]) -> Result<EmbeddedImage, ImageDecodeError> {
    if bytes.starts_with(JPEG_MAGIC) {
        decode_jpeg(bytes)
    } else if bytes.starts_with(PNG_MAGIC) {
        decode_png(bytes)
    } else {
        Err(ImageDecodeError::UnsupportedFormat)
    }
}

fn decode_jpeg(bytes: &[u8]) -> Result<EmbeddedImage, ImageDecodeError> {
    let (width, height, components) = jpeg_frame_header(bytes)?;
    check_dimensions(width, height)?;
    let color_space = match components {
        1 => ColorSpace::Gray,
        3 => ColorSpace::Rgb,
        4 => ColorSpace::Cmyk,
        _ => return Err(ImageDecodeError::MalformedJpeg("unsupported component count")),
    };
    Ok(EmbeddedImage {
        width,
        height,
        color_space,
        encoding: ImageEncoding::Jpeg,
        data: bytes.to_vec(),
    })
}

/// Walk JPEG marker segments until a start-of-frame header
fn jpeg_frame_header(bytes: &[u8]) -> Result<(u32, u32, u8), ImageDecodeError> {
    let mut pos = 2;
    loop {
        while bytes.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *bytes
            .get(pos)
            .ok_or(ImageDecodeError::MalformedJpeg("no frame header"))?;
        pos += 1;

        // standalone markers carry no length
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            if marker == 0xD9 {
                return Err(ImageDecodeError::MalformedJpeg("no frame header"));
            }
            continue;
        }

        let length = match bytes.get(pos..pos + 2) {
            Some(&[hi, lo]) => usize::from(u16::from_be_bytes([hi, lo])),
            _ => return Err(ImageDecodeError::MalformedJpeg("truncated segment")),
        };
        if length < 2 {
            return Err(ImageDecodeError::MalformedJpeg("invalid segment length"));
        }

        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            return match bytes.get(pos + 2..pos + 8) {
                Some(&[_precision, h_hi, h_lo, w_hi, w_lo, components]) => Ok((
                    u32::from(u16::from_be_bytes([w_hi, w_lo])),
                    u32::from(u16::from_be_bytes([h_hi, h_lo])),
                    components,
                )),
                _ => Err(ImageDecodeError::MalformedJpeg("truncated frame header")),
            };
        }

        // skip the segment, then resync on the next 0xFF
        pos += length;
        if bytes.get(pos) != Some(&0xFF) {
            return Err(ImageDecodeError::MalformedJpeg("marker expected"));
        }
    }
}

fn decode_png(bytes: &[u8]) -> Result<EmbeddedImage, ImageDecodeError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    check_dimensions(frame.width, frame.height)?;
    let samples = &buffer[..frame.buffer_size()];

    let (color_space, data) = match frame.color_type {
        png::ColorType::Grayscale => (ColorSpace::Gray, samples.to_vec()),
        png::ColorType::Rgb => (ColorSpace::Rgb, samples.to_vec()),
        png::ColorType::GrayscaleAlpha => (ColorSpace::Gray, flatten_alpha(samples, 1)),
        png::ColorType::Rgba => (ColorSpace::Rgb, flatten_alpha(samples, 3)),
        // EXPAND turns palettes into RGB(A)
        png::ColorType::Indexed => return Err(ImageDecodeError::UnsupportedFormat),
    };

    Ok(EmbeddedImage {
        width: frame.width,
        height: frame.height,
        color_space,
        encoding: ImageEncoding::Raw,
        data,
    })
}

/// Composite straight-alpha samples over a white background
fn flatten_alpha(samples: &[u8], channels: usize) -> Vec<u8> {
    samples
        .chunks_exact(channels + 1)
        .flat_map(|pixel| {
            let alpha = u16::from(pixel[channels]);
            pixel[..channels].iter().map(move |&value| {
                let blended = (u16::from(value) * alpha + 255 * (255 - alpha)) / 255;
                blended as u8
            })
        })
        .collect()
}
