// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar polygon helpers used by the quadrilateral selector.

use quadcrop_core::Point;

/// Area enclosed by a closed polygon (shoelace formula, absolute value).
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice_area += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    twice_area.abs() / 2.0
}

/// Perimeter of a closed polygon.
pub fn arc_length(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].distance(&points[(i + 1) % n]) as f64)
        .sum()
}

/// Simplify a closed polygon so no dropped vertex lies farther than
/// `epsilon` from the simplified outline (Douglas-Peucker).
///
/// The curve is split at the vertex farthest from the first one and both
/// halves are simplified as open chains. A final pass removes vertices that
/// sit within `epsilon` of the chord through their neighbours, which catches
/// a start vertex lying in the middle of a straight side.
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let start = points[0];
    let far = (1..n)
        .max_by(|&a, &b| {
            start
                .distance(&points[a])
                .total_cmp(&start.distance(&points[b]))
        })
        .unwrap_or(0);
    if start.distance(&points[far]) == 0.0 {
        return vec![start];
    }

    let first_half = simplify_open(&points[..=far], epsilon);
    let mut second_chain = points[far..].to_vec();
    second_chain.push(start);
    let second_half = simplify_open(&second_chain, epsilon);

    // Both halves include their endpoints; drop the shared ones.
    let mut polygon: Vec<Point> = first_half[..first_half.len() - 1].to_vec();
    polygon.extend_from_slice(&second_half[..second_half.len() - 1]);

    prune_flat_vertices(polygon, epsilon)
}

/// Iterative Douglas-Peucker over an open chain, endpoints always kept.
fn simplify_open(chain: &[Point], epsilon: f64) -> Vec<Point> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_dist = 0.0f64;
        let mut index = first;
        for i in first + 1..last {
            let d = segment_distance(chain[i], chain[first], chain[last]);
            if d > max_dist {
                max_dist = d;
                index = i;
            }
        }
        if max_dist > epsilon {
            keep[index] = true;
            stack.push((first, index));
            stack.push((index, last));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn prune_flat_vertices(mut polygon: Vec<Point>, epsilon: f64) -> Vec<Point> {
    let mut i = 0;
    while polygon.len() > 3 && i < polygon.len() {
        let n = polygon.len();
        let prev = polygon[(i + n - 1) % n];
        let next = polygon[(i + 1) % n];
        if segment_distance(polygon[i], prev, next) <= epsilon {
            polygon.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    polygon
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}
