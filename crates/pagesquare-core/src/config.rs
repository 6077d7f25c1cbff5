// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which image a decorative template is composited from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    /// The image as decoded from the request, before crop and adjustments.
    #[default]
    Original,
    /// The cropped and adjusted image, before canvas normalization.
    Processed,
}

/// Tunable constants of the image pipeline.
///
/// `Default` reproduces the published behaviour; a deployment can override
/// individual fields from a JSON file, missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum side of the square output canvas, in pixels.
    pub canvas_size: u32,
    /// RGB fill used when padding an image to a square.
    pub background: [u8; 3],
    /// CLAHE clip limit, relative to a uniform histogram.
    pub clahe_clip_limit: f32,
    /// Number of CLAHE tiles along each axis.
    pub clahe_grid: u32,
    /// Gaussian sigma of the unsharp mask applied after equalization.
    pub sharpen_sigma: f32,
    /// Weight of the equalized luminance in the unsharp mask.
    pub sharpen_amount: f32,
    /// Weight of the blurred luminance in the unsharp mask (negative).
    pub sharpen_blur_weight: f32,
    /// Gaussian sigma applied before edge detection (a 5x5 kernel).
    pub edge_blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Dilation radius closing one-pixel gaps in the edge map. 0 disables it.
    pub edge_dilation: u8,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Image handed to a requested template.
    pub template_source: TemplateSource,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas_size: 1080,
            background: [255, 255, 255],
            clahe_clip_limit: 2.0,
            clahe_grid: 8,
            sharpen_sigma: 3.0,
            sharpen_amount: 1.5,
            sharpen_blur_weight: -0.5,
            edge_blur_sigma: 1.1,
            canny_low: 75.0,
            canny_high: 200.0,
            edge_dilation: 1,
            approx_epsilon_ratio: 0.02,
            template_source: TemplateSource::Original,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}
