// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document edge detection: finds the quadrilateral outline of a photographed
// or scanned page.

use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use pagesquare_core::{PipelineConfig, Point};
use tracing::{debug, info, instrument};

use crate::geometry::{CornerSet, approximate_polygon, closed_arc_length, polygon_area};

const EDGE_COLOUR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const CORNER_COLOUR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// A detected document outline.
#[derive(Debug, Clone)]
pub struct EdgeDetection {
    /// The four outline corners, in detection order.
    pub corners: CornerSet,
    /// Copy of the input with the edge map and circled corners drawn on top.
    pub visualization: RgbaImage,
}

/// Locate a four-cornered document outline.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Gaussian blur (5x5 kernel equivalent)
/// 3. Canny edge detection
/// 4. Close one-pixel gaps in the edge map (optional dilation)
/// 5. Trace outer contours and keep the one enclosing the largest area
/// 6. Simplify it with a tolerance proportional to its perimeter
///
/// Returns `None` ("no document found") unless the simplified outline has
/// exactly four vertices. Corner order is whatever the contour trace produced.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn detect_document_edges(
    image: &DynamicImage,
    config: &PipelineConfig,
) -> Option<EdgeDetection> {
    info!("Detecting document edges");

    let gray = image.to_luma8();
    let blurred = if config.edge_blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, config.edge_blur_sigma)
    } else {
        gray
    };

    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let closed = if config.edge_dilation > 0 {
        dilate(&edges, Norm::LInf, config.edge_dilation)
    } else {
        edges.clone()
    };

    let contours = find_contours::<i32>(&closed);
    debug!(contours = contours.len(), "Contours traced");

    let (outline, area) = contours
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer)
        .map(|contour| {
            let points: Vec<Point> = contour
                .points
                .iter()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            let area = polygon_area(&points);
            (points, area)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    if area <= 0.0 {
        debug!("Largest contour encloses no area");
        return None;
    }

    let perimeter = closed_arc_length(&outline);
    let epsilon = config.approx_epsilon_ratio * perimeter;
    let polygon = approximate_polygon(&outline, epsilon);
    debug!(area, perimeter, vertices = polygon.len(), "Largest contour simplified");

    let corners: [Point; 4] = match polygon.as_slice() {
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => {
            info!(vertices = polygon.len(), "No four-cornered document outline found");
            return None;
        }
    };

    debug!(corners = ?corners, "Document outline found");
    let corners = CornerSet::new(corners);
    let visualization = draw_detection(image, &edges, &corners);
    Some(EdgeDetection {
        corners,
        visualization,
    })
}

/// Paint edge pixels and the outline onto an RGBA copy of `image`.
fn draw_detection(image: &DynamicImage, edges: &GrayImage, corners: &CornerSet) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    for (pixel, edge) in canvas.pixels_mut().zip(edges.pixels()) {
        if edge.0[0] > 0 {
            *pixel = EDGE_COLOUR;
        }
    }

    let radius = (canvas.width().min(canvas.height()) / 50).max(3) as i32;
    let ordered = corners.ordered();
    for (i, corner) in ordered.iter().enumerate() {
        let next = ordered[(i + 1) % ordered.len()];
        draw_line_segment_mut(
            &mut canvas,
            (corner.x as f32, corner.y as f32),
            (next.x as f32, next.y as f32),
            CORNER_COLOUR,
        );
        draw_hollow_circle_mut(
            &mut canvas,
            (corner.x.round() as i32, corner.y.round() as i32),
            radius,
            CORNER_COLOUR,
        );
    }
    canvas
}
