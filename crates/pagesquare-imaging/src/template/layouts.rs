// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout functions for the decorative templates. Each one places a resized
// copy of the input onto a fresh 1080x1080 RGB canvas.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

/// Side length of every template canvas.
pub const TEMPLATE_SIZE: u32 = 1080;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

const MINIMAL_BORDER: u32 = 40;
const PHOTO_BOX: u32 = 900;
const POLAROID_MARGIN: u32 = 60;
const POLAROID_CAPTION: u32 = 120;
const POLAROID_SHADOW_ALPHA: u8 = 50;
const MAGAZINE_LANDSCAPE_WIDTH: u32 = 960;
const MAGAZINE_PORTRAIT_HEIGHT: u32 = 880;
const MAGAZINE_IMAGE_TOP: i64 = 160;

/// Fit `(width, height)` into a `bound` box, preserving aspect ratio.
///
/// Wide images take the full box width, everything else the full height; the
/// other side is truncated and never drops below one pixel.
pub fn fit_within(width: u32, height: u32, bound: u32) -> (u32, u32) {
    let aspect = f64::from(width) / f64::from(height.max(1));
    if aspect > 1.0 {
        (bound, ((f64::from(bound) / aspect) as u32).max(1))
    } else {
        (((f64::from(bound) * aspect) as u32).max(1), bound)
    }
}

fn resized(image: &DynamicImage, bound: u32) -> RgbImage {
    let (w, h) = fit_within(image.width(), image.height(), bound);
    imageops::resize(&image.to_rgb8(), w, h, FilterType::Lanczos3)
}

fn centred(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)).div_euclid(2)
}

/// White canvas with the image centred inside a 40 px border.
pub fn minimal(image: &DynamicImage) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(TEMPLATE_SIZE, TEMPLATE_SIZE, WHITE);
    let photo = resized(image, TEMPLATE_SIZE - 2 * MINIMAL_BORDER);
    imageops::replace(
        &mut canvas,
        &photo,
        centred(TEMPLATE_SIZE, photo.width()),
        centred(TEMPLATE_SIZE, photo.height()),
    );
    canvas
}

/// Vertical red-to-blue gradient with the image centred in a 900 px box.
pub fn gradient(image: &DynamicImage) -> RgbImage {
    let size = f64::from(TEMPLATE_SIZE);
    let mut canvas = RgbImage::from_fn(TEMPLATE_SIZE, TEMPLATE_SIZE, |_, y| {
        let t = f64::from(y) / size;
        Rgb([
            (255.0 * (1.0 - t)) as u8,
            (200.0 * (1.0 - t)) as u8,
            (255.0 * t) as u8,
        ])
    });
    let photo = resized(image, PHOTO_BOX);
    imageops::replace(
        &mut canvas,
        &photo,
        centred(TEMPLATE_SIZE, photo.width()),
        centred(TEMPLATE_SIZE, photo.height()),
    );
    canvas
}

/// Instant-photo frame: white card with a deep caption band and a soft drop
/// shadow, centred on white.
///
/// Portrait photos make the frame taller than the canvas; it is clipped
/// top and bottom rather than shrunk.
pub fn polaroid(image: &DynamicImage) -> RgbImage {
    let photo = resized(image, PHOTO_BOX);
    let frame_w = photo.width() + 2 * POLAROID_MARGIN;
    let frame_h = photo.height() + 2 * POLAROID_MARGIN + POLAROID_CAPTION;
    let frame_x = centred(TEMPLATE_SIZE, frame_w);
    let frame_y = centred(TEMPLATE_SIZE, frame_h);

    let mut canvas =
        RgbaImage::from_pixel(TEMPLATE_SIZE, TEMPLATE_SIZE, Rgba([255, 255, 255, 255]));

    // Shadow sits 5 px right of and below the frame, one pixel larger.
    let mut shadow = RgbaImage::new(frame_w + 1, frame_h + 1);
    draw_filled_rect_mut(
        &mut shadow,
        Rect::at(0, 0).of_size(frame_w + 1, frame_h + 1),
        Rgba([0, 0, 0, POLAROID_SHADOW_ALPHA]),
    );
    imageops::overlay(&mut canvas, &shadow, frame_x + 5, frame_y + 5);

    let mut frame = RgbaImage::from_pixel(frame_w, frame_h, Rgba([255, 255, 255, 255]));
    let photo = DynamicImage::ImageRgb8(photo).to_rgba8();
    imageops::replace(
        &mut frame,
        &photo,
        i64::from(POLAROID_MARGIN),
        i64::from(POLAROID_MARGIN),
    );
    imageops::replace(&mut canvas, &frame, frame_x, frame_y);

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Black editorial page: thin white border, a header rule, and the image
/// hanging from a fixed top margin.
pub fn magazine(image: &DynamicImage) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(TEMPLATE_SIZE, TEMPLATE_SIZE, BLACK);

    for inset in 0..2 {
        let side = 1001 - 2 * inset;
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(40 + inset as i32, 40 + inset as i32).of_size(side, side),
            WHITE,
        );
    }
    draw_filled_rect_mut(&mut canvas, Rect::at(40, 120).of_size(1001, 2), WHITE);

    let (w, h) = (image.width(), image.height());
    let (new_w, new_h) = if w > h {
        fit_within(w, h, MAGAZINE_LANDSCAPE_WIDTH)
    } else {
        fit_within(w, h, MAGAZINE_PORTRAIT_HEIGHT)
    };
    let photo = imageops::resize(&image.to_rgb8(), new_w, new_h, FilterType::Lanczos3);
    imageops::replace(
        &mut canvas,
        &photo,
        centred(TEMPLATE_SIZE, new_w),
        MAGAZINE_IMAGE_TOP,
    );
    canvas
}
