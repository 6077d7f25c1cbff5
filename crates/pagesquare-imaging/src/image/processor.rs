// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, crop, brightness/contrast, enhancement, grayscale,
// square-canvas normalization, and PNG output. Operates on in-memory images
// using the `image` and `imageproc` crates.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use pagesquare_core::error::{PagesquareError, Result};
use pagesquare_core::{CropRect, CropSpec, PipelineConfig, Point};
use tracing::{debug, info, instrument, warn};

use crate::geometry::polygon_mask;
use crate::image::equalize::{clahe, unsharp_mask};
use crate::scan::{apply_perspective_correction, detect_document_edges};

/// Image processing pipeline operating on a single in-memory image.
///
/// The wrapped image is always 8-bit gray, RGB, or RGBA. Every operation
/// consumes `self` and returns a new `ImageProcessor`, enabling method
/// chaining:
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&upload)?
///     .crop(&CropSpec::Rectangle(rect))
///     .adjust_brightness_contrast(1.2, 1.1)
///     .grayscale()
///     .normalize_to_canvas(1080, [255, 255, 255])
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (PNG, JPEG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| PagesquareError::Decode(err.to_string()))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(PagesquareError::Decode("image has no pixels".into()));
        }
        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(img))
    }

    /// Wrap an already-decoded `DynamicImage`, converting it to 8-bit depth.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: normalize_depth(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Crop -----------------------------------------------------------------

    /// Apply a rectangular or polygonal crop selection.
    pub fn crop(self, spec: &CropSpec) -> Self {
        match spec {
            CropSpec::Rectangle(rect) => self.crop_rect(rect),
            CropSpec::Polygon(points) => self.crop_polygon(points),
        }
    }

    /// Crop a rectangular region from the image.
    ///
    /// `left`/`top` are clamped into `[0, dim - 1]` and `width`/`height` into
    /// `[1, dim - left]`/`[1, dim - top]`, so the result is never empty.
    #[instrument(skip(self))]
    pub fn crop_rect(self, rect: &CropRect) -> Self {
        let img_w = i64::from(self.image.width());
        let img_h = i64::from(self.image.height());

        let left = (rect.left.round() as i64).clamp(0, img_w - 1);
        let top = (rect.top.round() as i64).clamp(0, img_h - 1);
        let width = (rect.width.round() as i64).clamp(1, img_w - left);
        let height = (rect.height.round() as i64).clamp(1, img_h - top);

        info!(left, top, width, height, "Cropping image");

        let cropped = self
            .image
            .crop_imm(left as u32, top as u32, width as u32, height as u32);
        Self { image: cropped }
    }

    /// Mask everything outside a polygon.
    ///
    /// The output is RGBA with alpha 255 inside the polygon and 0 outside; no
    /// pixels are removed and the color channels are untouched. A polygon with
    /// fewer than three distinct vertices leaves the image unchanged.
    #[instrument(skip(self, points), fields(vertices = points.len()))]
    pub fn crop_polygon(self, points: &[Point]) -> Self {
        let Some(mask) = polygon_mask(self.image.width(), self.image.height(), points) else {
            warn!("Polygon crop needs at least three distinct vertices; ignoring");
            return self;
        };

        info!("Applying polygon crop mask");
        let mut rgba = self.image.to_rgba8();
        for (pixel, inside) in rgba.pixels_mut().zip(mask.pixels()) {
            pixel.0[3] = inside.0[0];
        }
        Self {
            image: DynamicImage::ImageRgba8(rgba),
        }
    }

    // -- Pixel adjustments ----------------------------------------------------

    /// Adjust contrast and brightness.
    ///
    /// Contrast blends every color channel toward the image's mean intensity
    /// (`v * contrast + mean * (1 - contrast)`), then brightness adds
    /// `(brightness - 1) * 100`. Results are clamped to `[0, 255]`; alpha is
    /// left alone. `(1.0, 1.0)` is a no-op.
    #[instrument(skip(self), fields(brightness, contrast))]
    pub fn adjust_brightness_contrast(self, brightness: f32, contrast: f32) -> Self {
        if brightness == 1.0 && contrast == 1.0 {
            debug!("Neutral brightness/contrast; skipping");
            return self;
        }

        let mean = color_mean(&self.image);
        let offset = (brightness - 1.0) * 100.0;
        info!(mean, offset, "Adjusting brightness/contrast");

        let image = map_color_channels(self.image, |value| {
            let adjusted = f32::from(value) * contrast + mean * (1.0 - contrast) + offset;
            adjusted.round().clamp(0.0, 255.0) as u8
        });
        Self { image }
    }

    /// Contrast-limited adaptive histogram equalization of the luminance,
    /// followed by an unsharp mask.
    ///
    /// Color images are split into full-range YCbCr; only Y is modified and the
    /// chroma planes are recombined untouched.
    #[instrument(skip_all)]
    pub fn enhance(self, config: &PipelineConfig) -> Self {
        info!(
            clip_limit = config.clahe_clip_limit,
            grid = config.clahe_grid,
            sigma = config.sharpen_sigma,
            "Enhancing luminance"
        );

        let process_luma = |luma: &GrayImage| -> GrayImage {
            let equalized = clahe(luma, config.clahe_clip_limit, config.clahe_grid);
            unsharp_mask(
                &equalized,
                config.sharpen_sigma,
                config.sharpen_amount,
                config.sharpen_blur_weight,
            )
        };

        let image = match self.image {
            DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(process_luma(&gray)),
            DynamicImage::ImageRgb8(rgb) => {
                let (luma, cb, cr) = split_ycbcr(rgb.pixels().map(|p| p.0));
                let luma = GrayImage::from_raw(rgb.width(), rgb.height(), luma)
                    .unwrap_or_else(|| GrayImage::new(rgb.width(), rgb.height()));
                let luma = process_luma(&luma);
                let out = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                    let i = (y * rgb.width() + x) as usize;
                    Rgb(ycbcr_to_rgb(luma.get_pixel(x, y).0[0], cb[i], cr[i]))
                });
                DynamicImage::ImageRgb8(out)
            }
            DynamicImage::ImageRgba8(rgba) => {
                let (luma, cb, cr) =
                    split_ycbcr(rgba.pixels().map(|p| [p.0[0], p.0[1], p.0[2]]));
                let luma = GrayImage::from_raw(rgba.width(), rgba.height(), luma)
                    .unwrap_or_else(|| GrayImage::new(rgba.width(), rgba.height()));
                let luma = process_luma(&luma);
                let out = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                    let i = (y * rgba.width() + x) as usize;
                    let [r, g, b] = ycbcr_to_rgb(luma.get_pixel(x, y).0[0], cb[i], cr[i]);
                    Rgba([r, g, b, rgba.get_pixel(x, y).0[3]])
                });
                DynamicImage::ImageRgba8(out)
            }
            other => return Self::from_dynamic(other).enhance(config),
        };
        Self { image }
    }

    /// Reduce to BT.601 luminance and re-expand to the original channel count.
    ///
    /// Gray pixels map to themselves, so applying this twice is the same as
    /// applying it once.
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        info!("Converting to grayscale");
        let image = match self.image {
            DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(gray),
            DynamicImage::ImageRgb8(mut rgb) => {
                for pixel in rgb.pixels_mut() {
                    let [r, g, b] = pixel.0;
                    let l = luma(r, g, b);
                    pixel.0 = [l, l, l];
                }
                DynamicImage::ImageRgb8(rgb)
            }
            DynamicImage::ImageRgba8(mut rgba) => {
                for pixel in rgba.pixels_mut() {
                    let [r, g, b, a] = pixel.0;
                    let l = luma(r, g, b);
                    pixel.0 = [l, l, l, a];
                }
                DynamicImage::ImageRgba8(rgba)
            }
            other => return Self::from_dynamic(other).grayscale(),
        };
        Self { image }
    }

    // -- Geometry -------------------------------------------------------------

    /// Detect the document outline and rectify it to the full frame.
    ///
    /// With `show_boundaries` the detection overlay replaces the image
    /// instead. When no four-cornered outline is found the image passes
    /// through unchanged either way.
    #[instrument(skip(self, config))]
    pub fn correct_perspective(self, config: &PipelineConfig, show_boundaries: bool) -> Self {
        let Some(detection) = detect_document_edges(&self.image, config) else {
            warn!("No document outline found; skipping perspective correction");
            return self;
        };

        if show_boundaries {
            info!("Returning document boundary overlay");
            return Self {
                image: DynamicImage::ImageRgba8(detection.visualization),
            };
        }

        Self {
            image: apply_perspective_correction(self.image, Some(&detection.corners)),
        }
    }

    // -- Canvas ---------------------------------------------------------------

    /// Pad to a square with `background`, then upsample to `target` x `target`
    /// when the square is smaller than the target.
    ///
    /// Padding is split evenly; an odd leftover pixel goes to the right/bottom.
    /// Images whose square side already reaches `target` keep their padded
    /// size, so the result is always square with a side of at least `target`.
    #[instrument(skip(self, background), fields(target))]
    pub fn normalize_to_canvas(self, target: u32, background: [u8; 3]) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        let side = w.max(h);

        let padded = if w == h {
            self.image
        } else {
            let (left, top) = ((side - w) / 2, (side - h) / 2);
            debug!(side, left, top, "Padding to square");
            pad_to_square(&self.image, side, left, top, background)
        };

        if side >= target {
            debug!(side, "Canvas already at or above target; not resizing");
            return Self { image: padded };
        }

        info!(from = side, to = target, "Upsampling canvas");
        Self {
            image: padded.resize_exact(target, target, FilterType::Lanczos3),
        }
    }

    /// Resize to exactly `width` x `height`, ignoring aspect ratio.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        let resized = self
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
pub(crate) fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| PagesquareError::Encode(err.to_string()))?;
    Ok(buffer)
}

/// Convert any decoded layout to 8-bit gray, RGB, or RGBA.
fn normalize_depth(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            image
        }
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other if other.color().has_color() => DynamicImage::ImageRgb8(other.to_rgb8()),
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}

/// BT.601 luma with rounding; exact for gray input.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000) as u8
}

/// Apply `f` to every color sample, leaving alpha untouched.
fn map_color_channels(image: DynamicImage, f: impl Fn(u8) -> u8) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(mut gray) => {
            gray.iter_mut().for_each(|v| *v = f(*v));
            DynamicImage::ImageLuma8(gray)
        }
        DynamicImage::ImageRgb8(mut rgb) => {
            rgb.iter_mut().for_each(|v| *v = f(*v));
            DynamicImage::ImageRgb8(rgb)
        }
        DynamicImage::ImageRgba8(mut rgba) => {
            for pixel in rgba.pixels_mut() {
                for channel in &mut pixel.0[..3] {
                    *channel = f(*channel);
                }
            }
            DynamicImage::ImageRgba8(rgba)
        }
        other => map_color_channels(normalize_depth(other), f),
    }
}

/// Mean over all color samples of all pixels (alpha excluded).
fn color_mean(image: &DynamicImage) -> f32 {
    let (sum, count) = match image {
        DynamicImage::ImageLuma8(gray) => sum_samples(gray.iter().copied()),
        DynamicImage::ImageRgb8(rgb) => sum_samples(rgb.iter().copied()),
        DynamicImage::ImageRgba8(rgba) => {
            sum_samples(rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]))
        }
        other => sum_samples(other.to_rgb8().iter().copied()),
    };
    if count == 0 {
        return 0.0;
    }
    (sum as f64 / count as f64) as f32
}

fn sum_samples(samples: impl Iterator<Item = u8>) -> (u64, u64) {
    samples.fold((0, 0), |(sum, count), v| (sum + u64::from(v), count + 1))
}

/// Split RGB pixels into full-range (JPEG) Y, Cb, Cr planes.
fn split_ycbcr(pixels: impl Iterator<Item = [u8; 3]>) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut luma = Vec::new();
    let mut cb = Vec::new();
    let mut cr = Vec::new();
    for [r, g, b] in pixels {
        let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
        luma.push(to_u8(0.299 * r + 0.587 * g + 0.114 * b));
        cb.push(to_u8(128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b));
        cr.push(to_u8(128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b));
    }
    (luma, cb, cr)
}

fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = f32::from(y);
    let cb = f32::from(cb) - 128.0;
    let cr = f32::from(cr) - 128.0;
    [
        to_u8(y + 1.402 * cr),
        to_u8(y - 0.344_136 * cb - 0.714_136 * cr),
        to_u8(y + 1.772 * cb),
    ]
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Copy `image` onto a `side` x `side` canvas filled with `background`.
fn pad_to_square(
    image: &DynamicImage,
    side: u32,
    left: u32,
    top: u32,
    background: [u8; 3],
) -> DynamicImage {
    let (x, y) = (i64::from(left), i64::from(top));
    match image {
        DynamicImage::ImageLuma8(gray) => {
            let fill = Luma([luma(background[0], background[1], background[2])]);
            let mut canvas = GrayImage::from_pixel(side, side, fill);
            imageops::replace(&mut canvas, gray, x, y);
            DynamicImage::ImageLuma8(canvas)
        }
        DynamicImage::ImageRgb8(rgb) => {
            let mut canvas = RgbImage::from_pixel(side, side, Rgb(background));
            imageops::replace(&mut canvas, rgb, x, y);
            DynamicImage::ImageRgb8(canvas)
        }
        other => {
            let [r, g, b] = background;
            let mut canvas = RgbaImage::from_pixel(side, side, Rgba([r, g, b, 255]));
            imageops::replace(&mut canvas, &other.to_rgba8(), x, y);
            DynamicImage::ImageRgba8(canvas)
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];

    fn rect(left: f64, top: f64, width: f64, height: f64) -> CropSpec {
        CropSpec::Rectangle(CropRect {
            left,
            top,
            width,
            height,
        })
    }

    fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = ImageProcessor::from_bytes(b"definitely not an image").err().unwrap();
        assert!(matches!(err, PagesquareError::Decode(_)));
    }

    #[test]
    fn from_dynamic_normalizes_gray_alpha_to_rgba() {
        let img = DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(
            3,
            3,
            image::LumaA([10, 20]),
        ));
        let processor = ImageProcessor::from_dynamic(img);
        assert!(matches!(processor.as_dynamic(), DynamicImage::ImageRgba8(_)));
        assert_eq!(processor.as_dynamic().to_rgba8().get_pixel(1, 1).0, [10, 10, 10, 20]);
    }

    #[test]
    fn rect_crop_inside_bounds_has_requested_size() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(100, 80))
            .crop(&rect(10.0, 20.0, 30.0, 40.0))
            .into_dynamic();
        assert_eq!((out.width(), out.height()), (30, 40));
        assert_eq!(
            out.to_rgb8().get_pixel(0, 0),
            gradient_rgb(100, 80).to_rgb8().get_pixel(10, 20)
        );
    }

    #[test]
    fn rect_crop_out_of_bounds_is_clamped() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(100, 100))
            .crop(&rect(-5.0, -5.0, 10_000.0, 10_000.0))
            .into_dynamic();
        assert_eq!((out.width(), out.height()), (100, 100));
    }

    #[test]
    fn rect_crop_past_far_edge_keeps_one_pixel() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(50, 40))
            .crop(&rect(500.0, 500.0, 0.0, -3.0))
            .into_dynamic();
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn polygon_crop_sets_alpha_only() {
        let src = gradient_rgb(20, 20);
        let polygon = vec![
            Point::new(0.0, 0.0),
            Point::new(19.0, 0.0),
            Point::new(0.0, 19.0),
        ];
        let out = ImageProcessor::from_dynamic(src.clone())
            .crop(&CropSpec::Polygon(polygon))
            .into_dynamic();

        let rgba = out.as_rgba8().expect("polygon crop yields RGBA");
        assert_eq!((rgba.width(), rgba.height()), (20, 20));
        assert_eq!(rgba.get_pixel(2, 2).0[3], 255);
        assert_eq!(rgba.get_pixel(18, 18).0[3], 0);
        let original = src.to_rgb8();
        assert_eq!(&rgba.get_pixel(18, 18).0[..3], &original.get_pixel(18, 18).0[..]);
    }

    #[test]
    fn far_out_polygon_crop_is_clamped() {
        let polygon = vec![
            Point::new(0.0, -3e9),
            Point::new(10.0, 3e9),
            Point::new(5.0, 5.0),
        ];
        let out = ImageProcessor::from_dynamic(gradient_rgb(20, 20))
            .crop(&CropSpec::Polygon(polygon))
            .into_dynamic();
        let rgba = out.as_rgba8().expect("polygon crop yields RGBA");
        assert_eq!((rgba.width(), rgba.height()), (20, 20));
        assert_eq!(rgba.get_pixel(15, 10).0[3], 0);
    }

    #[test]
    fn degenerate_polygon_is_ignored() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(10, 10))
            .crop(&CropSpec::Polygon(vec![Point::new(1.0, 1.0), Point::new(4.0, 4.0)]))
            .into_dynamic();
        assert!(matches!(out, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn neutral_brightness_contrast_is_noop() {
        let src = gradient_rgb(16, 16);
        let out = ImageProcessor::from_dynamic(src.clone())
            .adjust_brightness_contrast(1.0, 1.0)
            .into_dynamic();
        assert_eq!(out, src);
    }

    #[test]
    fn zero_contrast_flattens_to_mean() {
        let mut gray = GrayImage::new(2, 1);
        gray.put_pixel(0, 0, Luma([100]));
        gray.put_pixel(1, 0, Luma([200]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(gray))
            .adjust_brightness_contrast(1.0, 0.0)
            .into_dynamic()
            .to_luma8();
        assert_eq!(out.get_pixel(0, 0)[0], 150);
        assert_eq!(out.get_pixel(1, 0)[0], 150);
    }

    #[test]
    fn brightness_adds_scaled_offset_and_clamps() {
        let gray = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 100 } else { 230 }]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(gray))
            .adjust_brightness_contrast(1.5, 1.0)
            .into_dynamic()
            .to_luma8();
        assert_eq!(out.get_pixel(0, 0)[0], 150);
        assert_eq!(out.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn brightness_contrast_preserves_alpha() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 77]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(rgba))
            .adjust_brightness_contrast(1.2, 1.3)
            .into_dynamic();
        assert_eq!(out.as_rgba8().unwrap().get_pixel(2, 2).0[3], 77);
    }

    #[test]
    fn grayscale_keeps_channel_count() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(8, 8))
            .grayscale()
            .into_dynamic();
        let rgb = out.as_rgb8().expect("still RGB");
        assert!(rgb.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn grayscale_uses_bt601_weights() {
        let rgb = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(rgb))
            .grayscale()
            .into_dynamic();
        assert_eq!(out.as_rgb8().unwrap().get_pixel(0, 0).0, [76, 76, 76]);
    }

    #[test]
    fn enhance_keeps_gray_pixels_gray_and_alpha() {
        let rgba = RgbaImage::from_fn(64, 48, |x, y| {
            let v = (60 + (x + y) % 80) as u8;
            Rgba([v, v, v, 200])
        });
        let config = PipelineConfig::default();
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(rgba))
            .enhance(&config)
            .into_dynamic();

        let out = out.as_rgba8().expect("still RGBA");
        assert_eq!((out.width(), out.height()), (64, 48));
        for p in out.pixels() {
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
            assert_eq!(p.0[3], 200);
        }
    }

    #[test]
    fn enhance_is_deterministic() {
        let config = PipelineConfig::default();
        let run = || {
            ImageProcessor::from_dynamic(gradient_rgb(40, 30))
                .enhance(&config)
                .into_dynamic()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn ycbcr_round_trip_is_close() {
        for rgb in [[0, 0, 0], [255, 255, 255], [200, 30, 90], [12, 240, 128]] {
            let (y, cb, cr) = split_ycbcr(std::iter::once(rgb));
            let back = ycbcr_to_rgb(y[0], cb[0], cr[0]);
            for (a, b) in rgb.iter().zip(back.iter()) {
                assert!((i16::from(*a) - i16::from(*b)).abs() <= 2, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn canvas_pads_landscape_evenly_with_white() {
        let gray = GrayImage::from_pixel(5, 2, Luma([0]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(gray))
            .normalize_to_canvas(4, WHITE)
            .into_dynamic()
            .to_luma8();

        // 5x2 becomes 5x5: one padded row above, two below.
        assert_eq!(out.dimensions(), (5, 5));
        assert_eq!(out.get_pixel(0, 0)[0], 255);
        assert_eq!(out.get_pixel(0, 1)[0], 0);
        assert_eq!(out.get_pixel(0, 2)[0], 0);
        assert_eq!(out.get_pixel(0, 3)[0], 255);
        assert_eq!(out.get_pixel(0, 4)[0], 255);
    }

    #[test]
    fn canvas_upsamples_small_images_to_target() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(50, 30))
            .normalize_to_canvas(120, WHITE)
            .into_dynamic();
        assert_eq!((out.width(), out.height()), (120, 120));
    }

    #[test]
    fn canvas_never_downsamples() {
        let out = ImageProcessor::from_dynamic(gradient_rgb(300, 200))
            .normalize_to_canvas(120, WHITE)
            .into_dynamic();
        assert_eq!((out.width(), out.height()), (300, 300));
    }

    #[test]
    fn canvas_padding_of_rgba_is_opaque() {
        let rgba = RgbaImage::from_pixel(2, 4, Rgba([0, 0, 0, 0]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(rgba))
            .normalize_to_canvas(1, WHITE)
            .into_dynamic();
        let out = out.as_rgba8().unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn png_output_decodes_back() {
        let processor = ImageProcessor::from_dynamic(gradient_rgb(9, 7));
        let png = processor.to_png_bytes().unwrap();
        let decoded = ImageProcessor::from_bytes(&png).unwrap();
        assert_eq!(decoded.as_dynamic(), processor.as_dynamic());
    }

    fn page_on_desk() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(240, 180, |x, y| {
            if (40..200).contains(&x) && (30..150).contains(&y) {
                Rgb([240, 240, 235])
            } else {
                Rgb([30, 30, 40])
            }
        }))
    }

    #[test]
    fn perspective_without_document_is_identity() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 40, Rgb([120, 130, 140])));
        let out = ImageProcessor::from_dynamic(flat.clone())
            .correct_perspective(&PipelineConfig::default(), true)
            .into_dynamic();
        assert_eq!(out, flat);
    }

    #[test]
    fn show_boundaries_returns_rgba_overlay() {
        let out = ImageProcessor::from_dynamic(page_on_desk())
            .correct_perspective(&PipelineConfig::default(), true)
            .into_dynamic();
        assert!(matches!(out, DynamicImage::ImageRgba8(_)));
        assert_eq!((out.width(), out.height()), (240, 180));
    }

    #[test]
    fn rectified_page_fills_the_frame() {
        let out = ImageProcessor::from_dynamic(page_on_desk())
            .correct_perspective(&PipelineConfig::default(), false)
            .into_dynamic();
        let rgb = out.as_rgb8().expect("layout preserved");
        assert_eq!(rgb.dimensions(), (240, 180));
        // The page now covers the middle of the frame that used to be desk.
        let centre = rgb.get_pixel(120, 90).0;
        let near_corner = rgb.get_pixel(30, 25).0;
        assert!(centre[0] > 200, "centre {centre:?}");
        assert!(near_corner[0] > 150, "near corner {near_corner:?}");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
