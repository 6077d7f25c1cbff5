// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Template compositor: a fixed registry of named decorative layouts.

pub mod layouts;

use std::sync::LazyLock;

use image::{DynamicImage, RgbImage};
use serde::Serialize;
use tracing::{info, instrument, warn};

pub use layouts::TEMPLATE_SIZE;

/// A named decorative layout.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    layout: fn(&DynamicImage) -> RgbImage,
}

impl Template {
    /// Compose `image` into this layout.
    pub fn apply(&self, image: &DynamicImage) -> RgbImage {
        (self.layout)(image)
    }
}

static REGISTRY: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        Template {
            name: "minimal",
            description: "Clean design with subtle border",
            layout: layouts::minimal,
        },
        Template {
            name: "gradient",
            description: "Modern gradient background",
            layout: layouts::gradient,
        },
        Template {
            name: "polaroid",
            description: "Classic Polaroid style",
            layout: layouts::polaroid,
        },
        Template {
            name: "magazine",
            description: "Editorial magazine layout",
            layout: layouts::magazine,
        },
    ]
});

/// Every registered template, in display order.
pub fn list_templates() -> &'static [Template] {
    &REGISTRY
}

/// Look a template up by its exact name.
pub fn find_template(name: &str) -> Option<&'static Template> {
    REGISTRY.iter().find(|t| t.name == name)
}

/// Compose `image` into the named template, or `None` if no such template
/// exists.
#[instrument(skip(image))]
pub fn apply_template(image: &DynamicImage, name: &str) -> Option<RgbImage> {
    let Some(template) = find_template(name) else {
        warn!("Unknown template requested");
        return None;
    };
    info!(
        width = image.width(),
        height = image.height(),
        "Applying template"
    );
    Some(template.apply(image))
}
