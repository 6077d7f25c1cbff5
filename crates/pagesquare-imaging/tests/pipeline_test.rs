// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end tests: raw bytes in, PNG bytes out.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use pagesquare_core::{CropRect, CropSpec, Operations, PipelineConfig, Point};
use pagesquare_imaging::{ImageProcessor, Pipeline, process_image};

fn encode(image: DynamicImage) -> Vec<u8> {
    ImageProcessor::from_dynamic(image).to_png_bytes().unwrap()
}

fn decode(png: &[u8]) -> DynamicImage {
    image::load_from_memory_with_format(png, ImageFormat::Png).unwrap()
}

fn white(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([255, 255, 255]),
    )))
}

#[test]
fn neutral_adjustments_give_a_white_square() {
    let ops = Operations::from_json(r#"{"brightness": 1.0, "contrast": 1.0}"#).unwrap();
    let out = decode(&process_image(&white(500, 300), &ops).unwrap()).to_rgb8();

    assert_eq!(out.width(), out.height());
    assert!(out.width() >= 1080);
    assert!(out.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn minimal_template_centres_the_upload() {
    let input = encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        500,
        300,
        Rgb([20, 90, 160]),
    )));
    let plain = process_image(&input, &Operations::default()).unwrap();
    let ops = Operations::from_json(r#"{"template": "minimal"}"#).unwrap();
    let templated = process_image(&input, &ops).unwrap();
    assert_ne!(plain, templated);

    let out = decode(&templated).to_rgb8();
    assert_eq!(out.dimensions(), (1080, 1080));
    assert_eq!(out.get_pixel(10, 10).0, [255, 255, 255]);
    assert_eq!(out.get_pixel(540, 100).0, [255, 255, 255]);
    assert_eq!(out.get_pixel(540, 540).0, [20, 90, 160]);
}

#[test]
fn unknown_template_returns_input_bytes() {
    let input = white(40, 30);
    let ops = Operations::from_json(r#"{"template": "nonexistent", "grayscale": true}"#).unwrap();
    assert_eq!(process_image(&input, &ops).unwrap(), input);
}

#[test]
fn every_template_yields_a_1080_square() {
    let input = white(120, 200);
    for name in ["minimal", "gradient", "polaroid", "magazine"] {
        let ops = Operations {
            template: Some(name.to_string()),
            ..Operations::default()
        };
        let out = decode(&process_image(&input, &ops).unwrap());
        assert_eq!((out.width(), out.height()), (1080, 1080), "template {name}");
    }
}

#[test]
fn out_of_bounds_crop_is_clamped() {
    let config = PipelineConfig {
        canvas_size: 8,
        ..PipelineConfig::default()
    };
    let ops = Operations {
        crop: Some(CropSpec::Rectangle(CropRect {
            left: -5.0,
            top: 0.0,
            width: 10_000.0,
            height: 100.0,
        })),
        ..Operations::default()
    };
    let out = decode(&Pipeline::new(config).process(&white(100, 100), &ops).unwrap());
    assert_eq!((out.width(), out.height()), (100, 100));
}

#[test]
fn polygon_crop_keeps_dimensions_and_adds_alpha() {
    let config = PipelineConfig {
        canvas_size: 8,
        ..PipelineConfig::default()
    };
    let ops = Operations {
        crop: Some(CropSpec::Polygon(vec![
            Point::new(2.0, 2.0),
            Point::new(17.0, 2.0),
            Point::new(17.0, 17.0),
            Point::new(2.0, 17.0),
        ])),
        ..Operations::default()
    };
    let out = decode(&Pipeline::new(config).process(&white(20, 20), &ops).unwrap());
    let rgba = out.to_rgba8();
    assert_eq!(rgba.dimensions(), (20, 20));
    assert_eq!(rgba.get_pixel(0, 0).0[3], 0);
    assert_eq!(rgba.get_pixel(10, 10).0[3], 255);
}

#[test]
fn grayscale_output_has_equal_channels() {
    let input = encode(DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
        Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255])
    })));
    let ops = Operations::from_json(r#"{"grayscale": true, "enhance": true}"#).unwrap();
    let out = decode(&process_image(&input, &ops).unwrap()).to_rgba8();
    assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
}

#[test]
fn perspective_on_featureless_image_only_normalizes() {
    let input = encode(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        300,
        300,
        Luma([128]),
    )));
    let ops = Operations::from_json(r#"{"perspective_correction": true, "show_boundaries": true}"#)
        .unwrap();
    let out = decode(&process_image(&input, &ops).unwrap()).to_luma8();
    assert_eq!(out.dimensions(), (1080, 1080));
    assert!(out.pixels().all(|p| p.0[0].abs_diff(128) <= 1));
}

/// 240x180 photo of a bright page on a dark desk.
fn page_on_desk() -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_fn(240, 180, |x, y| {
        if (40..200).contains(&x) && (30..150).contains(&y) {
            Rgb([240, 240, 235])
        } else {
            Rgb([30, 30, 40])
        }
    })))
}

#[test]
fn detected_document_is_handled_before_padding() {
    // A tiny canvas leaves the padded 240x240 square unscaled; the photo
    // occupies rows 30..210.
    let pipeline = Pipeline::new(PipelineConfig {
        canvas_size: 8,
        ..PipelineConfig::default()
    });
    let desk_spot = (30, 55);

    let plain = decode(&pipeline.process(&page_on_desk(), &Operations::default()).unwrap());
    let plain = plain.to_rgb8();
    assert_eq!(plain.dimensions(), (240, 240));
    assert!(plain.get_pixel(desk_spot.0, desk_spot.1).0[0] < 60);

    let ops = Operations::from_json(r#"{"perspective_correction": true}"#).unwrap();
    let rectified = decode(&pipeline.process(&page_on_desk(), &ops).unwrap()).to_rgb8();
    assert_eq!(rectified.dimensions(), (240, 240));
    assert_eq!(rectified.get_pixel(120, 5).0, [255, 255, 255]);
    let spot = rectified.get_pixel(desk_spot.0, desk_spot.1).0;
    assert!(spot[0] > 150, "page should cover the old desk area, got {spot:?}");

    let ops = Operations::from_json(r#"{"perspective_correction": true, "show_boundaries": true}"#)
        .unwrap();
    let overlay = decode(&pipeline.process(&page_on_desk(), &ops).unwrap());
    assert!(matches!(overlay, DynamicImage::ImageRgba8(_)));
    assert_eq!((overlay.width(), overlay.height()), (240, 240));
    let overlay = overlay.to_rgba8();
    assert!(overlay.pixels().any(|p| p.0 == [0, 255, 0, 255]), "edge overlay drawn");
    assert_eq!(overlay.get_pixel(120, 5).0, [255, 255, 255, 255]);
}

#[test]
fn undecodable_upload_is_bad_input() {
    let err = process_image(b"\x89PNG not really", &Operations::default()).unwrap_err();
    assert!(err.is_bad_input());
}
