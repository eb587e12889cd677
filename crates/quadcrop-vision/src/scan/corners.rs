// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering: rotational sort around the centroid, plus the anchor
// step that pins index 0 to the top-left corner.

use std::cmp::Ordering;

use quadcrop_core::{Point, Quad};

/// Sort four points by `atan2` angle around their centroid, ascending.
///
/// Any other number of points is returned unchanged. The sort is stable, so
/// equal angles keep their input order. With y pointing down, ascending
/// angle is a clockwise traversal on screen.
pub fn order_corners(points: &[Point]) -> Vec<Point> {
    if points.len() != 4 {
        return points.to_vec();
    }

    let (sx, sy) = points
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let (cx, cy) = (sx / 4.0, sy / 4.0);
    let angle = |p: &Point| (p.y as f64 - cy).atan2(p.x as f64 - cx);

    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| angle(a).partial_cmp(&angle(b)).unwrap_or(Ordering::Equal));
    ordered
}

/// Rotate a rotationally ordered set so the point with the smallest `x + y`
/// comes first, keeping the traversal direction.
pub fn anchor_top_left(points: &[Point]) -> Vec<Point> {
    let mut anchored = points.to_vec();
    let start = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (a.x + a.y)
                .partial_cmp(&(b.x + b.y))
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    anchored.rotate_left(start);
    anchored
}

/// Order a quad rotationally and, when `anchor` is set, start it at the
/// top-left corner so it reads TL, TR, BR, BL.
pub fn order_quad(quad: &Quad, anchor: bool) -> Quad {
    let ordered = order_corners(quad.corners());
    let ordered = if anchor { anchor_top_left(&ordered) } else { ordered };
    // Ordering is a permutation, so the length is still 4.
    Quad::from_slice(&ordered).unwrap_or(*quad)
}
