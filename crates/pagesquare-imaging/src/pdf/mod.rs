// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page input: rasterizer seam and page preparation.

pub mod rasterizer;

pub use rasterizer::{PageRasterizer, ScannedPdfRasterizer, prepare_pages};
