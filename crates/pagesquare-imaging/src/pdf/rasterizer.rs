// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization: turns a PDF into one raster image per page, and
// prepares those rasters as square canvas-sized PNGs.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pagesquare_core::PipelineConfig;
use pagesquare_core::error::{PagesquareError, Result};
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;

/// Produces one raster image per PDF page, in page order.
pub trait PageRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>>;
}

/// Rasterizer for scanned PDFs, where every page is a single embedded photo.
///
/// Nothing is rendered: each page yields its largest image XObject as-is.
/// Supported encodings are DCTDecode (JPEG) and FlateDecode or unfiltered
/// samples in DeviceRGB or DeviceGray at 8 bits per component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScannedPdfRasterizer;

impl PageRasterizer for ScannedPdfRasterizer {
    #[instrument(skip_all, fields(bytes_len = pdf.len()))]
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>> {
        let document = Document::load_mem(pdf).map_err(|err| {
            PagesquareError::PdfError(format!("failed to load PDF from memory: {err}"))
        })?;

        let pages = document.get_pages();
        info!(pages = pages.len(), "Rasterizing scanned PDF");

        // BTreeMap keyed by 1-based page number, so iteration is page order.
        pages
            .iter()
            .map(|(&number, &page_id)| {
                let image = largest_page_image(&document, page_id).ok_or_else(|| {
                    PagesquareError::PdfError(format!("page {number} contains no decodable image"))
                })?;
                debug!(
                    page = number,
                    width = image.width(),
                    height = image.height(),
                    "Page image extracted"
                );
                Ok(image)
            })
            .collect()
    }
}

/// Rasterize `pdf` and resize every page to exactly `canvas x canvas`,
/// returning PNG bytes per page.
///
/// Aspect ratio is not preserved. A PDF without pages is an error.
#[instrument(skip_all, fields(bytes_len = pdf.len(), canvas = config.canvas_size))]
pub fn prepare_pages(
    rasterizer: &dyn PageRasterizer,
    pdf: &[u8],
    config: &PipelineConfig,
) -> Result<Vec<Vec<u8>>> {
    let pages = rasterizer.rasterize(pdf)?;
    if pages.is_empty() {
        return Err(PagesquareError::PdfError("PDF has no pages".into()));
    }

    pages
        .into_iter()
        .map(|page| {
            ImageProcessor::from_dynamic(page)
                .resize_exact(config.canvas_size, config.canvas_size)
                .to_png_bytes()
        })
        .collect()
}

/// Decode every image XObject on the page and keep the one with the most
/// pixels. Undecodable images are skipped.
fn largest_page_image(document: &Document, page_id: ObjectId) -> Option<DynamicImage> {
    let resources = page_resources(document, page_id)?;
    let xobjects = resolve(document, resources.get(b"XObject").ok()?)?
        .as_dict()
        .ok()?;

    xobjects
        .iter()
        .filter_map(|(name, value)| {
            let stream = resolve(document, value)?.as_stream().ok()?;
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|subtype| subtype == b"Image");
            if !is_image {
                return None;
            }
            match decode_image_stream(stream) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!(xobject = %String::from_utf8_lossy(name), %err, "Skipping image");
                    None
                }
            }
        })
        .max_by_key(|image| u64::from(image.width()) * u64::from(image.height()))
}

/// The page's resource dictionary, following `/Parent` for inherited ones.
fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = document.get_dictionary(page_id).ok()?;
    // Bounded walk so a cyclic page tree cannot hang us.
    for _ in 0..64 {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(document, resources)?.as_dict().ok();
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = document.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    let name = String::from_utf8_lossy(key);
    let value = dict
        .get(key)
        .and_then(Object::as_i64)
        .map_err(|_| PagesquareError::PdfError(format!("image missing /{name}")))?;
    u32::try_from(value)
        .map_err(|_| PagesquareError::PdfError(format!("/{name} out of range: {value}")))
}

fn first_filter(dict: &Dictionary) -> Option<Vec<u8>> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(name.clone()),
        Object::Array(filters) => filters.first()?.as_name().ok().map(<[u8]>::to_vec),
        _ => None,
    }
}

fn decode_image_stream(stream: &Stream) -> Result<DynamicImage> {
    let dict = &stream.dict;
    match first_filter(dict).as_deref() {
        Some(b"DCTDecode") => {
            image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
                .map_err(|err| PagesquareError::Decode(format!("JPEG image: {err}")))
        }
        Some(b"FlateDecode") => {
            let samples = stream
                .decompressed_content()
                .map_err(|err| PagesquareError::PdfError(format!("FlateDecode: {err}")))?;
            decode_raw(dict, samples)
        }
        None => decode_raw(dict, stream.content.clone()),
        Some(other) => Err(PagesquareError::PdfError(format!(
            "unsupported image filter {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn decode_raw(dict: &Dictionary, mut samples: Vec<u8>) -> Result<DynamicImage> {
    let width = dict_u32(dict, b"Width")?;
    let height = dict_u32(dict, b"Height")?;
    if width == 0 || height == 0 {
        return Err(PagesquareError::PdfError(format!(
            "image has no pixels ({width}x{height})"
        )));
    }
    let bits = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    let colour_space = dict
        .get(b"ColorSpace")
        .and_then(Object::as_name)
        .unwrap_or(b"DeviceRGB".as_slice());

    let channels = match (colour_space, bits) {
        (b"DeviceRGB", 8) => 3,
        (b"DeviceGray", 8) => 1,
        (space, bits) => {
            return Err(PagesquareError::PdfError(format!(
                "unsupported colour space {} at {bits} bpc",
                String::from_utf8_lossy(space)
            )));
        }
    };

    let expected = width as usize * height as usize * channels;
    if samples.len() < expected {
        return Err(PagesquareError::PdfError(format!(
            "image data too short: expected {expected} bytes, got {}",
            samples.len()
        )));
    }
    samples.truncate(expected);

    let image = if channels == 3 {
        RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
    };
    image.ok_or_else(|| PagesquareError::PdfError("image buffer size mismatch".into()))
}
