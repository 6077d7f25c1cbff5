// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: the operation set a caller hands to the pipeline and the
// crop selection shapes it can carry.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned crop rectangle.
///
/// Values are signed so that selections dragged past the image edge can be
/// expressed; the crop stage clamps them into bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// The two crop selection shapes.
///
/// In JSON a rectangle is an object `{left, top, width, height}` and a polygon
/// is an array of `{x, y}` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CropSpec {
    Rectangle(CropRect),
    Polygon(Vec<Point>),
}

/// The set of edits requested for one image.
///
/// Every field is optional; absent keys mean "leave the image alone" and keys
/// not listed here are ignored when parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operations {
    /// Brightness factor, 1.0 is neutral.
    pub brightness: Option<f32>,
    /// Contrast factor, 1.0 is neutral.
    pub contrast: Option<f32>,
    pub grayscale: bool,
    /// Adaptive histogram equalization plus sharpening.
    pub enhance: bool,
    pub crop: Option<CropSpec>,
    /// Detect the document outline and rectify it.
    pub perspective_correction: bool,
    /// Return the detection overlay instead of the rectified document.
    pub show_boundaries: bool,
    /// Name of a decorative layout.
    pub template: Option<String>,
}

impl Operations {
    /// Parse an operation set from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective `(brightness, contrast)` pair, or `None` when the stage
    /// should be skipped.
    ///
    /// Zero counts as "not set"; a missing partner defaults to 1.0.
    pub fn brightness_contrast(&self) -> Option<(f32, f32)> {
        let set = |value: Option<f32>| value.filter(|v| *v != 0.0);
        let brightness = set(self.brightness);
        let contrast = set(self.contrast);
        if brightness.is_none() && contrast.is_none() {
            return None;
        }
        Some((brightness.unwrap_or(1.0), contrast.unwrap_or(1.0)))
    }

    /// Requested template name, ignoring empty strings.
    pub fn template_name(&self) -> Option<&str> {
        self.template.as_deref().filter(|name| !name.is_empty())
    }
}
