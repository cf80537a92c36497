// ABOUTME: Minimal PDF drawing surface over lopdf with top-down coordinates
// ABOUTME: Collects per-page content operations and image XObjects, then assembles the document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! A small drawing API sufficient for the report: filled and stroked
//! rectangles, lines, single-line text in the two standard Helvetica faces,
//! and raster images. Callers use top-down coordinates; conversion to PDF
//! user space happens here.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::image::{ColorSpace, EmbeddedImage, ImageEncoding};
use crate::layout::PageGeometry;
use crate::metrics::Font;

/// Errors raised while serializing the document
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// lopdf failed to encode a content stream or write the file
    #[error("PDF serialization failed: {0}")]
    Serialize(#[from] lopdf::Error),
    /// Writing into the output buffer failed
    #[error("PDF output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// RGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Build from channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Body text
    pub const TEXT: Self = Self::rgb(33, 37, 41);
    /// Secondary text
    pub const MUTED: Self = Self::rgb(108, 117, 125);
    /// Brand accent for headings and bars
    pub const ACCENT: Self = Self::rgb(13, 110, 253);
    /// Light panel background
    pub const PANEL: Self = Self::rgb(241, 243, 245);
    /// Table and box borders
    pub const BORDER: Self = Self::rgb(206, 212, 218);
    /// White
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    fn components(self) -> Vec<Object> {
        [self.r, self.g, self.b]
            .into_iter()
            .map(|channel| Object::Real(f32::from(channel) / 255.0))
            .collect()
    }
}

#[derive(Debug, Default)]
struct PageContent {
    operations: Vec<Operation>,
    images: Vec<usize>,
}

/// Multi-page drawing surface
#[derive(Debug)]
pub struct PdfCanvas {
    geometry: PageGeometry,
    pages: Vec<PageContent>,
    images: Vec<EmbeddedImage>,
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Encode text as `WinAnsiEncoding` bytes
///
/// Characters outside Latin-1 become `?`.
#[must_use]
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

impl PdfCanvas {
    /// Empty canvas with a single blank page
    #[must_use]
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![PageContent::default()],
            images: Vec::new(),
        }
    }

    /// Page geometry
    #[must_use]
    pub const fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Number of pages drawn so far
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_mut(&mut self, page: usize) -> &mut PageContent {
        if self.pages.len() <= page {
            self.pages.resize_with(page + 1, PageContent::default);
        }
        &mut self.pages[page]
    }

    fn to_pdf_y(&self, y: f64) -> f64 {
        self.geometry.height - y
    }

    /// Make sure pages up to and including `page` exist
    pub fn ensure_page(&mut self, page: usize) {
        self.page_mut(page);
    }

    /// Filled rectangle with its top-left corner at `(x, y)`
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) {
        let bottom = self.to_pdf_y(y + height);
        let ops = &mut self.page_mut(page).operations;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("rg", color.components()));
        ops.push(Operation::new(
            "re",
            vec![real(x), real(bottom), real(width), real(height)],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Stroked rectangle outline
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    ) {
        let bottom = self.to_pdf_y(y + height);
        let ops = &mut self.page_mut(page).operations;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("RG", color.components()));
        ops.push(Operation::new("w", vec![real(line_width)]));
        ops.push(Operation::new(
            "re",
            vec![real(x), real(bottom), real(width), real(height)],
        ));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Straight line segment
    pub fn line(&mut self, page: usize, from: (f64, f64), to: (f64, f64), color: Color) {
        let (from_y, to_y) = (self.to_pdf_y(from.1), self.to_pdf_y(to.1));
        let ops = &mut self.page_mut(page).operations;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("RG", color.components()));
        ops.push(Operation::new("w", vec![real(0.75)]));
        ops.push(Operation::new("m", vec![real(from.0), real(from_y)]));
        ops.push(Operation::new("l", vec![real(to.0), real(to_y)]));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Single line of text whose baseline sits at `baseline`
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        page: usize,
        x: f64,
        baseline: f64,
        text: &str,
        font: Font,
        size: f64,
        color: Color,
    ) {
        if text.is_empty() {
            return;
        }
        let pdf_baseline = self.to_pdf_y(baseline);
        let ops = &mut self.page_mut(page).operations;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", color.components()));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().into()), real(size)],
        ));
        ops.push(Operation::new("Td", vec![real(x), real(pdf_baseline)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Draw an image scaled into the box with top-left corner `(x, y)`
    #[allow(clippy::too_many_arguments)]
    pub fn image(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: EmbeddedImage,
    ) {
        let index = self.images.len();
        self.images.push(image);
        let bottom = self.to_pdf_y(y + height);
        let content = self.page_mut(page);
        content.images.push(index);
        content.operations.push(Operation::new("q", vec![]));
        content.operations.push(Operation::new(
            "cm",
            vec![
                real(width),
                real(0.0),
                real(0.0),
                real(height),
                real(x),
                real(bottom),
            ],
        ));
        content.operations.push(Operation::new(
            "Do",
            vec![Object::Name(image_name(index).into_bytes())],
        ));
        content.operations.push(Operation::new("Q", vec![]));
    }

    /// Assemble and serialize the document
    ///
    /// # Errors
    ///
    /// Returns an error if a content stream cannot be encoded or the document
    /// cannot be written.
    pub fn finish(self, title: &str, created_at: DateTime<Utc>) -> Result<Vec<u8>, PdfError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_id = doc.add_object(font_dictionary(Font::Bold));

        let image_ids: Vec<ObjectId> = self
            .images
            .into_iter()
            .map(|image| doc.add_object(image_stream(image)))
            .collect();

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let mut xobjects = lopdf::Dictionary::new();
            for index in &page.images {
                if let Some(id) = image_ids.get(*index) {
                    xobjects.set(image_name(*index).into_bytes(), *id);
                }
            }
            let resources = dictionary! {
                "Font" => dictionary! {
                    Font::Regular.resource_name() => regular_id,
                    Font::Bold.resource_name() => bold_id,
                },
                "XObject" => xobjects,
            };
            let content = Content {
                operations: page.operations,
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let page_count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "MediaBox" => vec![
                    real(0.0),
                    real(0.0),
                    real(self.geometry.width),
                    real(self.geometry.height),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(title)),
            "Producer" => Object::string_literal("MoveID"),
            "CreationDate" => Object::string_literal(
                created_at.format("D:%Y%m%d%H%M%SZ").to_string()
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn image_stream(image: EmbeddedImage) -> Stream {
    let color_space = match image.color_space {
        ColorSpace::Gray => "DeviceGray",
        ColorSpace::Rgb => "DeviceRGB",
        ColorSpace::Cmyk => "DeviceCMYK",
    };
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
    };
    match image.encoding {
        ImageEncoding::Raw => Stream::new(dict, image.data),
        ImageEncoding::Jpeg => {
            dict.set("Filter", "DCTDecode");
            if image.color_space == ColorSpace::Cmyk {
                // Adobe CMYK JPEGs store inverted channels
                dict.set(
                    "Decode",
                    vec![1, 0, 1, 0, 1, 0, 1, 0]
                        .into_iter()
                        .map(Object::Integer)
                        .collect::<Vec<_>>(),
                );
            }
            Stream::new(dict, image.data).with_compression(false)
        }
    }
}
