// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral selection: pick the largest four-vertex contour approximation
// that covers enough of the image to be a document.

use quadcrop_core::{Contour, Quad};
use tracing::{debug, instrument, warn};

use super::geometry::{approximate_polygon, arc_length, polygon_area};

/// Approximation tolerance as a fraction of each contour's perimeter.
pub const APPROX_EPSILON_FRACTION: f64 = 0.02;

/// `selectDocumentQuad(contours, imageArea, minAreaFraction) -> CornerSet?`
///
/// Contours whose area is not strictly greater than
/// `min_area_fraction * image_area` are skipped. Survivors are simplified
/// with a tolerance of 2% of their perimeter; among the four-vertex results
/// the one whose original contour area is largest wins (first seen on ties).
///
/// `None` is the ordinary "no document found" outcome.
#[instrument(skip(contours), fields(contours = contours.len()))]
pub fn select_document_quad(
    contours: &[Contour],
    image_area: f64,
    min_area_fraction: f64,
) -> Option<Quad> {
    let min_area = min_area_fraction * image_area;
    let mut best: Option<(f64, Quad)> = None;

    for contour in contours {
        let area = polygon_area(&contour.points);
        if area <= min_area {
            continue;
        }

        let epsilon = APPROX_EPSILON_FRACTION * arc_length(&contour.points);
        let approx = approximate_polygon(&contour.points, epsilon);
        debug!(area, vertices = approx.len(), "Candidate contour approximated");
        if approx.len() != 4 {
            continue;
        }

        let beats_best = best.as_ref().is_none_or(|(best_area, _)| area > *best_area);
        if beats_best {
            if let Ok(quad) = Quad::from_slice(&approx) {
                best = Some((area, quad));
            }
        }
    }

    match best {
        Some((area, quad)) => {
            debug!(area, min_area, "Document quadrilateral selected");
            Some(quad)
        }
        None => {
            warn!(min_area, "No four-sided contour above the area threshold");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::edges::external_contours;
    use image::{GrayImage, Luma};
    use quadcrop_core::Point;

    fn rect_contour(x0: f32, y0: f32, x1: f32, y1: f32) -> Contour {
        Contour::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    fn triangle_contour() -> Contour {
        Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(90.0, 0.0),
            Point::new(45.0, 90.0),
        ])
    }

    #[test]
    fn empty_contour_list_finds_nothing() {
        assert!(select_document_quad(&[], 10_000.0, 0.01).is_none());
    }

    #[test]
    fn synthetic_square_is_found_within_tolerance() {
        let mut binary = GrayImage::new(200, 200);
        for y in 40..160 {
            for x in 50..170 {
                binary.put_pixel(x, y, Luma([255]));
            }
        }
        let contours = external_contours(&binary);
        let quad = select_document_quad(&contours, 200.0 * 200.0, 0.05).expect("square found");

        let expected = [(50.0, 40.0), (169.0, 40.0), (169.0, 159.0), (50.0, 159.0)];
        for (ex, ey) in expected {
            let hit = quad
                .corners()
                .iter()
                .any(|p| (p.x - ex).abs() <= 2.0 && (p.y - ey).abs() <= 2.0);
            assert!(hit, "no corner near ({ex}, {ey}) in {:?}", quad);
        }
    }

    #[test]
    fn area_threshold_is_strict() {
        // 10 x 10 = 100 = 0.01 * 10_000: exactly at the boundary.
        let at_boundary = rect_contour(0.0, 0.0, 10.0, 10.0);
        assert!(select_document_quad(&[at_boundary], 10_000.0, 0.01).is_none());

        // 10 x 10.1 = 101: one unit above.
        let above = rect_contour(0.0, 0.0, 10.0, 10.1);
        assert!(select_document_quad(&[above], 10_000.0, 0.01).is_some());
    }

    #[test]
    fn non_quadrilaterals_are_ignored() {
        assert!(select_document_quad(&[triangle_contour()], 10_000.0, 0.01).is_none());
    }

    #[test]
    fn largest_quadrilateral_wins() {
        let small = rect_contour(0.0, 0.0, 20.0, 20.0);
        let large = rect_contour(30.0, 30.0, 90.0, 80.0);
        let quad = select_document_quad(
            &[small, triangle_contour(), large.clone()],
            10_000.0,
            0.01,
        )
        .expect("quad");
        assert_eq!(quad.to_vec(), large.points);
    }

    #[test]
    fn first_seen_wins_ties() {
        let first = rect_contour(0.0, 0.0, 20.0, 20.0);
        let second = rect_contour(50.0, 50.0, 70.0, 70.0);
        let quad = select_document_quad(&[first.clone(), second], 10_000.0, 0.01).expect("quad");
        assert_eq!(quad.to_vec(), first.points);
    }
}
