// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry helpers: corner ordering, polygon masks, polygon simplification,
// and homography solving.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;
use pagesquare_core::Point;
use serde::Serialize;

/// Four document corners as produced by edge detection.
///
/// The stored order is whatever the detector found; use
/// [`CornerSet::ordered`] before mapping corners onto a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerSet {
    points: [Point; 4],
}

impl CornerSet {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Corners in detection order.
    pub fn raw(&self) -> &[Point; 4] {
        &self.points
    }

    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn ordered(&self) -> [Point; 4] {
        order_corners(&self.points)
    }
}

/// Reorder four points into `[top_left, top_right, bottom_right, bottom_left]`.
///
/// Top-left has the smallest `x + y`, bottom-right the largest. Top-right has
/// the smallest `y - x`, bottom-left the largest. Ties keep the first point.
pub fn order_corners(points: &[Point; 4]) -> [Point; 4] {
    let sum = |p: &Point| p.x + p.y;
    let diff = |p: &Point| p.y - p.x;

    [
        pick(points, |a, b| sum(a) < sum(b)),
        pick(points, |a, b| diff(a) < diff(b)),
        pick(points, |a, b| sum(a) > sum(b)),
        pick(points, |a, b| diff(a) > diff(b)),
    ]
}

/// First point for which no other point is strictly `better`.
fn pick(points: &[Point; 4], better: impl Fn(&Point, &Point) -> bool) -> Point {
    points
        .iter()
        .skip(1)
        .fold(points[0], |best, p| if better(p, &best) { *p } else { best })
}

const MASK_VERTEX_LIMIT: f64 = 8.0;

/// Rasterize a closed polygon into a `width` x `height` mask (255 inside,
/// 0 outside).
///
/// Coordinates are clamped to eight times the larger image side and rounded
/// to whole pixels; repeated vertices and an explicit closing vertex are
/// dropped. Returns `None` when fewer than three distinct vertices remain.
pub fn polygon_mask(width: u32, height: u32, polygon: &[Point]) -> Option<GrayImage> {
    // The rasterizer does i32 edge arithmetic and plots every edge point.
    let limit = f64::from(width.max(height).max(1)) * MASK_VERTEX_LIMIT;
    let snap = |v: f64| v.clamp(-limit, limit).round() as i32;

    let mut vertices: Vec<PixelPoint<i32>> = Vec::with_capacity(polygon.len());
    for p in polygon {
        let vertex = PixelPoint::new(snap(p.x), snap(p.y));
        if vertices.last() != Some(&vertex) {
            vertices.push(vertex);
        }
    }
    while vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return None;
    }

    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, &vertices, Luma([255u8]));
    Some(mask)
}

/// Solve the 3x3 homography mapping each `src[i]` onto `dst[i]`.
///
/// Returns the row-major matrix normalized so that the last entry is 1, or
/// `None` when the points are degenerate (three or more collinear).
pub fn solve_homography(src: &[Point; 4], dst: &[Point; 4]) -> Option<[f64; 9]> {
    // Eight equations in h00..h21 with h22 fixed to 1:
    //   u = (h00 x + h01 y + h02) / (h20 x + h21 y + 1)
    //   v = (h10 x + h11 y + h12) / (h20 x + h21 y + 1)
    let mut system = [[0.0f64; 9]; 8];
    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        system[2 * i] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y, d.x];
        system[2 * i + 1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y, d.y];
    }

    let h = solve_linear_system(system)?;
    Some([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0])
}

/// Gaussian elimination with partial pivoting on an 8x8 augmented matrix.
fn solve_linear_system(mut m: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    const N: usize = 8;

    for col in 0..N {
        let pivot = (col..N).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot][col].abs() < 1e-10 {
            return None;
        }
        m.swap(col, pivot);

        for row in (col + 1)..N {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=N {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut x = [0.0f64; N];
    for row in (0..N).rev() {
        let tail: f64 = ((row + 1)..N).map(|k| m[row][k] * x[k]).sum();
        x[row] = (m[row][N] - tail) / m[row][row];
    }
    Some(x)
}

/// Map a point through a row-major homography.
pub fn project(matrix: &[f64; 9], p: Point) -> Option<Point> {
    let w = matrix[6] * p.x + matrix[7] * p.y + matrix[8];
    if w.abs() < f64::EPSILON {
        return None;
    }
    Some(Point::new(
        (matrix[0] * p.x + matrix[1] * p.y + matrix[2]) / w,
        (matrix[3] * p.x + matrix[4] * p.y + matrix[5]) / w,
    ))
}

/// Area enclosed by a closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i].x * points[j].y - points[j].x * points[i].y
        })
        .sum();
    twice.abs() / 2.0
}

/// Perimeter of a closed polygon.
pub fn closed_arc_length(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| distance(points[i], points[(i + 1) % n])).sum()
}

/// Simplify a closed contour with the Douglas-Peucker algorithm.
///
/// The contour is split at its first point and the point farthest from it;
/// both chains are simplified independently and vertices left collinear
/// (within `epsilon`) at the seams are removed afterwards.
pub fn approximate_polygon(contour: &[Point], epsilon: f64) -> Vec<Point> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let anchor = contour[0];
    let far = (1..n).fold(1, |best, i| {
        if distance(anchor, contour[i]) > distance(anchor, contour[best]) {
            i
        } else {
            best
        }
    });

    let mut vertices = Vec::new();
    douglas_peucker(&contour[..=far], epsilon, &mut vertices);
    let mut tail: Vec<Point> = contour[far..].to_vec();
    tail.push(anchor);
    douglas_peucker(&tail, epsilon, &mut vertices);

    drop_collinear(vertices, epsilon)
}

/// Push the retained vertices of an open chain, excluding its last point.
fn douglas_peucker(chain: &[Point], epsilon: f64, out: &mut Vec<Point>) {
    let last = chain.len() - 1;
    if last < 2 {
        out.push(chain[0]);
        return;
    }

    let (index, max_distance) = (1..last)
        .map(|i| (i, line_distance(chain[i], chain[0], chain[last])))
        .fold((0, 0.0f64), |best, cur| if cur.1 > best.1 { cur } else { best });

    if max_distance > epsilon {
        douglas_peucker(&chain[..=index], epsilon, out);
        douglas_peucker(&chain[index..], epsilon, out);
    } else {
        out.push(chain[0]);
    }
}

fn drop_collinear(mut vertices: Vec<Point>, epsilon: f64) -> Vec<Point> {
    let mut changed = true;
    while changed && vertices.len() > 3 {
        changed = false;
        let n = vertices.len();
        for i in 0..n {
            let prev = vertices[(i + n - 1) % n];
            let next = vertices[(i + 1) % n];
            if line_distance(vertices[i], prev, next) <= epsilon {
                vertices.remove(i);
                changed = true;
                break;
            }
        }
    }
    vertices
}

fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let length = distance(a, b);
    if length < f64::EPSILON {
        return distance(p, a);
    }
    ((b.x - a.x) * (a.y - p.y) - (a.x - p.x) * (b.y - a.y)).abs() / length
}
