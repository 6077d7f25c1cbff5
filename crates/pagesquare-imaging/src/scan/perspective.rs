// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective correction: maps a detected document quadrilateral onto the
// full image rectangle.

use image::{DynamicImage, Luma, Rgb, Rgba};
use imageproc::geometric_transformations::{Interpolation, Projection, warp};
use pagesquare_core::Point;
use tracing::{info, instrument, warn};

use crate::geometry::{CornerSet, solve_homography};

/// Rectify `image` so that the quadrilateral `corners` fills the frame.
///
/// Corners may arrive in any order; they are canonicalized first. Output
/// dimensions equal the input's. Samples falling outside the source are
/// filled white. The image is returned untouched when `corners` is `None` or
/// when they do not define a usable projection.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn apply_perspective_correction(
    image: DynamicImage,
    corners: Option<&CornerSet>,
) -> DynamicImage {
    let Some(corners) = corners else {
        return image;
    };

    let (w, h) = (f64::from(image.width()), f64::from(image.height()));
    let src = corners.ordered();
    let dst = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];

    let Some(matrix) = solve_homography(&src, &dst) else {
        warn!("Degenerate document corners; skipping perspective correction");
        return image;
    };
    let Some(projection) = Projection::from_matrix(matrix.map(|v| v as f32)) else {
        warn!("Projection is not invertible; skipping perspective correction");
        return image;
    };

    let corrected = match &image {
        DynamicImage::ImageLuma8(gray) => DynamicImage::ImageLuma8(warp(
            gray,
            &projection,
            Interpolation::Bicubic,
            Luma([255]),
        )),
        DynamicImage::ImageRgb8(rgb) => DynamicImage::ImageRgb8(warp(
            rgb,
            &projection,
            Interpolation::Bicubic,
            Rgb([255, 255, 255]),
        )),
        other => DynamicImage::ImageRgba8(warp(
            &other.to_rgba8(),
            &projection,
            Interpolation::Bicubic,
            Rgba([255, 255, 255, 255]),
        )),
    };

    info!("Perspective correction applied");
    corrected
}
