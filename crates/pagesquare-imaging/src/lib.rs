// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagesquare-imaging: The image transformation pipeline.
//
// Provides pixel adjustments (brightness/contrast, CLAHE enhancement,
// grayscale), geometric transforms (crop, perspective correction, square
// canvas), document edge detection, decorative templates, and scanned-PDF
// page preparation.

pub mod geometry;
pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod scan;
pub mod template;

// Re-export the primary entry points so callers can use `pagesquare_imaging::Pipeline` etc.
pub use geometry::{CornerSet, order_corners};
pub use self::image::processor::ImageProcessor;
pub use pdf::{PageRasterizer, ScannedPdfRasterizer, prepare_pages};
pub use pipeline::{Pipeline, process_image};
pub use scan::{EdgeDetection, apply_perspective_correction, detect_document_edges};
pub use template::{Template, apply_template, find_template, list_templates};
