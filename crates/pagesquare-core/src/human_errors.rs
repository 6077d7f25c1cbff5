// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for whoever sits in front of the upload form.
//
// Every technical error is mapped to plain English with a clear suggestion and
// a severity that tells the transport layer whether the caller or the server
// is at fault.

use crate::error::PagesquareError;

/// Who is responsible for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The uploaded bytes or the requested operations are unusable.
    /// Retrying the same request will fail the same way.
    BadInput,
    /// Something went wrong on our side (encoding, file system).
    Internal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Drives the response class (4xx vs 5xx equivalent).
    pub severity: Severity,
}

/// Convert a `PagesquareError` into a `HumanError`.
pub fn humanize_error(err: &PagesquareError) -> HumanError {
    match err {
        PagesquareError::Decode(_) => HumanError {
            message: "We couldn't read this image.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try exporting the page as PNG or JPEG first.".into(),
            severity: Severity::BadInput,
        },

        PagesquareError::Encode(detail) => HumanError {
            message: "We couldn't save the edited image.".into(),
            suggestion: format!("Try again. If this keeps happening, please report it. ({detail})"),
            severity: Severity::Internal,
        },

        PagesquareError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "Only scanned PDFs (one picture per page) can be converted. Try exporting the pages as images instead.".into(),
            severity: Severity::BadInput,
        },

        PagesquareError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::BadInput,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    severity: Severity::Internal,
                }
            }
        }

        PagesquareError::Serialization(_) => HumanError {
            message: "The list of edits couldn't be understood.".into(),
            suggestion: "Check that brightness and contrast are numbers, the switches are true/false, and the crop is a rectangle or a list of points.".into(),
            severity: Severity::BadInput,
        },
    }
}
