// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decode, crop, brightness/contrast, enhancement, grayscale,
// and square-canvas normalization.

pub mod equalize;
pub mod processor;

pub use processor::ImageProcessor;
