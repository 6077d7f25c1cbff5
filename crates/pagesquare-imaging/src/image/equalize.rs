// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Luminance enhancement: contrast-limited adaptive histogram equalization
// (CLAHE) and unsharp masking on single-channel images.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Contrast-limited adaptive histogram equalization.
///
/// The image is divided into a `grid` x `grid` layout of tiles (fewer along an
/// axis shorter than `grid` pixels). Each tile gets its own equalization
/// lookup table built from a histogram clipped at
/// `clip_limit * tile_pixels / 256`, with the clipped excess spread evenly
/// over all bins. Every output pixel is a bilinear blend of the tables of the
/// four nearest tile centres. A `clip_limit` of zero or less disables
/// clipping.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles_x = grid.clamp(1, width);
    let tiles_y = grid.clamp(1, height);
    let x_bounds = tile_bounds(width, tiles_x);
    let y_bounds = tile_bounds(height, tiles_y);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y as usize {
        for tx in 0..tiles_x as usize {
            let mut histogram = [0u32; 256];
            for y in y_bounds[ty]..y_bounds[ty + 1] {
                for x in x_bounds[tx]..x_bounds[tx + 1] {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let area = (x_bounds[tx + 1] - x_bounds[tx]) * (y_bounds[ty + 1] - y_bounds[ty]);
            luts.push(tile_lut(&mut histogram, area, clip_limit));
        }
    }

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;

    GrayImage::from_fn(width, height, |x, y| {
        let (tx0, tx1, ax) = neighbours(x, tile_w, tiles_x);
        let (ty0, ty1, ay) = neighbours(y, tile_h, tiles_y);
        let value = gray.get_pixel(x, y).0[0] as usize;
        let lut = |tx: usize, ty: usize| f32::from(luts[ty * tiles_x as usize + tx][value]);

        let top = lut(tx0, ty0) * (1.0 - ax) + lut(tx1, ty0) * ax;
        let bottom = lut(tx0, ty1) * (1.0 - ax) + lut(tx1, ty1) * ax;
        let blended = top * (1.0 - ay) + bottom * ay;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Sharpen by subtracting a Gaussian-blurred copy:
/// `amount * v + blur_weight * blur(v)`.
pub fn unsharp_mask(gray: &GrayImage, sigma: f32, amount: f32, blur_weight: f32) -> GrayImage {
    if sigma <= 0.0 {
        return gray.clone();
    }
    let blurred = gaussian_blur_f32(gray, sigma);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = f32::from(gray.get_pixel(x, y).0[0]);
        let b = f32::from(blurred.get_pixel(x, y).0[0]);
        Luma([(amount * v + blur_weight * b).round().clamp(0.0, 255.0) as u8])
    })
}

/// Pixel boundaries of `tiles` near-equal spans covering `len` pixels.
fn tile_bounds(len: u32, tiles: u32) -> Vec<u32> {
    (0..=tiles)
        .map(|i| (u64::from(i) * u64::from(len) / u64::from(tiles)) as u32)
        .collect()
}

/// The two tile indices whose centres bracket `pos`, and the weight of the
/// second one.
fn neighbours(pos: u32, tile_size: f32, tiles: u32) -> (usize, usize, f32) {
    let t = (pos as f32 + 0.5) / tile_size - 0.5;
    let last = (tiles - 1) as f32;
    if t <= 0.0 {
        return (0, 0, 0.0);
    }
    if t >= last {
        return (last as usize, last as usize, 0.0);
    }
    let lower = t.floor();
    (lower as usize, lower as usize + 1, t - lower)
}

/// Equalization table for one tile, clipping its histogram first.
fn tile_lut(histogram: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in histogram.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let per_bin = excess / 256;
        let remainder = (excess % 256) as usize;
        for bin in histogram.iter_mut() {
            *bin += per_bin;
        }
        if remainder > 0 {
            let step = (256 / remainder).max(1);
            for bin in histogram.iter_mut().step_by(step).take(remainder) {
                *bin += 1;
            }
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (entry, &count) in lut.iter_mut().zip(histogram.iter()) {
        cumulative += count;
        *entry = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
