// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestration: decodes an upload, runs the requested stages in
// their fixed order, and encodes the result as PNG.

use image::DynamicImage;
use pagesquare_core::error::Result;
use pagesquare_core::{Operations, PipelineConfig, TemplateSource};
use tracing::{debug, info, instrument, warn};

use crate::image::ImageProcessor;
use crate::template::{Template, find_template};

/// Runs operation sets against raw image bytes.
///
/// Stage order is fixed regardless of how the operations were written:
/// crop, brightness/contrast, enhance, grayscale, perspective correction,
/// canvas normalization, and finally template composition.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one image and return PNG bytes.
    ///
    /// Only decoding and encoding can fail. An unknown template name returns
    /// `raw` untouched. A known template composes either the decoded upload
    /// or the processed image, depending on [`PipelineConfig::template_source`],
    /// and its 1080x1080 layout replaces the normalized canvas.
    #[instrument(skip_all, fields(input_len = raw.len()))]
    pub fn process(&self, raw: &[u8], ops: &Operations) -> Result<Vec<u8>> {
        let decoded = ImageProcessor::from_bytes(raw)?;
        info!(
            width = decoded.width(),
            height = decoded.height(),
            ?ops,
            "Processing image"
        );

        let template = match ops.template_name() {
            Some(name) => match find_template(name) {
                Some(template) => Some(template),
                None => {
                    warn!(template = name, "Unknown template; returning input unchanged");
                    return Ok(raw.to_vec());
                }
            },
            None => None,
        };

        let source = self.config.template_source;
        if let (Some(template), TemplateSource::Original) = (template, source) {
            // Every other stage would be discarded, so skip them.
            debug!(template = template.name, "Composing the decoded upload");
            return compose(template, decoded.as_dynamic());
        }

        let processed = self.adjust(decoded, ops);

        match template {
            Some(template) => {
                debug!(template = template.name, "Composing the processed image");
                compose(template, processed.as_dynamic())
            }
            None => processed
                .normalize_to_canvas(self.config.canvas_size, self.config.background)
                .to_png_bytes(),
        }
    }

    /// Crop, pixel adjustments and perspective correction, in that order.
    fn adjust(&self, mut image: ImageProcessor, ops: &Operations) -> ImageProcessor {
        if let Some(crop) = &ops.crop {
            image = image.crop(crop);
        }
        if let Some((brightness, contrast)) = ops.brightness_contrast() {
            image = image.adjust_brightness_contrast(brightness, contrast);
        }
        if ops.enhance {
            image = image.enhance(&self.config);
        }
        if ops.grayscale {
            image = image.grayscale();
        }
        if ops.perspective_correction {
            image = image.correct_perspective(&self.config, ops.show_boundaries);
        }
        image
    }
}

fn compose(template: &Template, image: &DynamicImage) -> Result<Vec<u8>> {
    let canvas = template.apply(image);
    ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(canvas)).to_png_bytes()
}

/// Process one image with the default configuration.
pub fn process_image(raw: &[u8], ops: &Operations) -> Result<Vec<u8>> {
    Pipeline::default().process(raw, ops)
}
