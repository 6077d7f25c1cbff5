// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanning: edge detection and perspective rectification.

pub mod edges;
pub mod perspective;

pub use edges::{EdgeDetection, detect_document_edges};
pub use perspective::apply_perspective_correction;
