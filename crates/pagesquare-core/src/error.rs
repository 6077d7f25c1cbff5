// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagesquare.

use thiserror::Error;

/// Top-level error type for all Pagesquare operations.
///
/// Only fatal conditions live here. A missing document outline, an
/// out-of-range crop rectangle, or an unknown template name are not errors:
/// the affected stage falls back to the identity transform.
#[derive(Debug, Error)]
pub enum PagesquareError {
    // -- Image errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- I/O and (de)serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PagesquareError {
    /// Whether the failure was caused by the caller's input (the equivalent of
    /// an HTTP 4xx) rather than by the pipeline itself. A missing file counts
    /// as input; any other I/O failure does not.
    pub fn is_bad_input(&self) -> bool {
        match self {
            Self::Decode(_) | Self::PdfError(_) | Self::Serialization(_) => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            Self::Encode(_) => false,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagesquareError>;
