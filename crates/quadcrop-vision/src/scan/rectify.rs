// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: map four ordered corners onto an upright
// rectangle and resample the source through the projective transform.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use quadcrop_core::error::{QuadcropError, Result};
use quadcrop_core::{CornerRole, Quad};
use tracing::{debug, info, instrument, warn};

/// Smallest output side that still defines a non-degenerate rectangle.
pub const MIN_OUTPUT_EXTENT: u32 = 2;

/// Quads enclosing less than this many square pixels are treated as
/// collinear.
const MIN_QUAD_AREA: f64 = 1.0;

/// Consecutive corners turning by less than this sine (about 0.6 degrees)
/// are treated as collinear.
const MIN_CORNER_SINE: f64 = 0.01;

/// Output sides may be at most this multiple of the source's long edge, and
/// the output area at most its square times the source area.
pub const MAX_OUTPUT_SCALE: f64 = 2.0;

/// Fill for output pixels whose source lies outside the image.
const OUTSIDE_FILL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Output width and height before rounding: the longer of each pair of
/// opposing edges of a TL, TR, BR, BL ordered quad.
pub fn output_size(corners: &Quad) -> (f32, f32) {
    let [tl, tr, br, bl] = CornerRole::ALL.map(|role| corners.corner(role));

    let width = tr.distance(&tl).max(br.distance(&bl));
    let height = bl.distance(&tl).max(br.distance(&tr));
    (width, height)
}

/// Reject corner sets where any three consecutive corners are coincident
/// or collinear; the four-point projection is singular for those.
pub fn check_corner_turns(corners: &Quad) -> Result<()> {
    let c = corners.corners();
    for i in 0..4 {
        let (a, b, next) = (c[i], c[(i + 1) % 4], c[(i + 2) % 4]);
        let (ux, uy) = (b.x as f64 - a.x as f64, b.y as f64 - a.y as f64);
        let (vx, vy) = (next.x as f64 - b.x as f64, next.y as f64 - b.y as f64);
        let (len_u, len_v) = (ux.hypot(uy), vx.hypot(vy));
        if len_u < f64::EPSILON || len_v < f64::EPSILON {
            return Err(QuadcropError::DegenerateGeometry(format!(
                "corners {i} and {} coincide",
                if len_u < f64::EPSILON { (i + 1) % 4 } else { (i + 2) % 4 }
            )));
        }
        let sine = (ux * vy - uy * vx).abs() / (len_u * len_v);
        if sine < MIN_CORNER_SINE {
            return Err(QuadcropError::DegenerateGeometry(format!(
                "corners {i}, {} and {} are collinear",
                (i + 1) % 4,
                (i + 2) % 4
            )));
        }
    }
    Ok(())
}

/// Check a raw output size against the limits implied by a source of
/// `source_w` x `source_h` pixels.
fn check_output_budget(raw_w: f32, raw_h: f32, source_w: u32, source_h: u32) -> Result<()> {
    let long_edge = source_w.max(source_h) as f64;
    let max_side = MAX_OUTPUT_SCALE * long_edge;
    let max_pixels = MAX_OUTPUT_SCALE * MAX_OUTPUT_SCALE * source_w as f64 * source_h as f64;
    let (w, h) = (raw_w.round() as f64, raw_h.round() as f64);
    if w > max_side || h > max_side || w * h > max_pixels {
        return Err(QuadcropError::DegenerateGeometry(format!(
            "output of {raw_w:.0}x{raw_h:.0} pixels exceeds the limit for a {source_w}x{source_h} source"
        )));
    }
    Ok(())
}

/// Build the source-to-destination projection for `corners` and an output
/// of `width` x `height` pixels.
pub fn perspective_mapping(corners: &Quad, width: u32, height: u32) -> Result<Projection> {
    let (w, h) = ((width - 1) as f32, (height - 1) as f32);
    let dest = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    let src = corners.corners().map(<(f32, f32)>::from);

    Projection::from_control_points(src, dest).ok_or_else(|| {
        QuadcropError::DegenerateGeometry("corner correspondences are singular".into())
    })
}

/// `rectify(source, orderedCorners) -> output`.
///
/// `corners` are read positionally as top-left, top-right, bottom-right,
/// bottom-left. The result is always RGBA; samples from outside the source
/// become transparent black.
#[instrument(skip(source), fields(src_w = source.width(), src_h = source.height()))]
pub fn rectify(source: &DynamicImage, corners: &Quad) -> Result<RgbaImage> {
    if corners
        .corners()
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(QuadcropError::DegenerateGeometry(
            "corner coordinates must be finite".into(),
        ));
    }

    check_corner_turns(corners).inspect_err(|e| warn!(error = %e, "Degenerate corners"))?;

    let (raw_w, raw_h) = output_size(corners);
    check_output_budget(raw_w, raw_h, source.width(), source.height())
        .inspect_err(|e| warn!(error = %e, "Output too large"))?;
    let out_w = raw_w.round() as u32;
    let out_h = raw_h.round() as u32;
    if out_w < MIN_OUTPUT_EXTENT || out_h < MIN_OUTPUT_EXTENT {
        warn!(raw_w, raw_h, "Rectangle too small to rectify");
        return Err(QuadcropError::DegenerateGeometry(format!(
            "output would be {out_w}x{out_h} pixels"
        )));
    }

    let area = corners.area();
    if area < MIN_QUAD_AREA {
        warn!(area, "Corners are collinear");
        return Err(QuadcropError::DegenerateGeometry(format!(
            "corners enclose an area of {area:.2} square pixels"
        )));
    }

    let projection = perspective_mapping(corners, out_w, out_h)?;
    debug!(out_w, out_h, "Perspective mapping computed");

    let rgba_input = source.to_rgba8();
    let mut output = RgbaImage::new(out_w, out_h);
    warp_into(
        &rgba_input,
        &projection,
        Interpolation::Bilinear,
        OUTSIDE_FILL,
        &mut output,
    );

    info!(out_w, out_h, "Perspective correction applied");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use quadcrop_core::Point;

    const RED: Rgb<u8> = Rgb([220, 30, 30]);
    const BLUE: Rgb<u8> = Rgb([30, 30, 220]);
    const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

    fn quad(points: [(f32, f32); 4]) -> Quad {
        Quad::new(points.map(Point::from))
    }

    /// 200x150 image; inside (40,30)-(160,120) the left half is red and the
    /// right half blue.
    fn two_tone_document() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(200, 150, |x, y| {
            if !(40..=160).contains(&x) || !(30..=120).contains(&y) {
                GRAY
            } else if x < 100 {
                RED
            } else {
                BLUE
            }
        }))
    }

    fn close_to(actual: Rgba<u8>, expected: Rgb<u8>) -> bool {
        actual.0[3] == 255
            && actual.0[..3]
                .iter()
                .zip(expected.0)
                .all(|(a, e)| (*a as i32 - e as i32).abs() <= 3)
    }

    #[test]
    fn trapezoid_uses_longest_opposing_edges() {
        let corners = quad([(10.0, 0.0), (110.0, 0.0), (120.0, 80.0), (0.0, 80.0)]);
        let (w, h) = output_size(&corners);
        assert!((w - 120.0).abs() < 1e-4);
        assert!((h - 6500f32.sqrt()).abs() < 1e-3);

        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(130, 90, GRAY));
        let out = rectify(&source, &corners).expect("rectify");
        assert_eq!(out.dimensions(), (120, 81));
    }

    #[test]
    fn taller_side_sets_height() {
        let corners = quad([(0.0, 0.0), (50.0, 10.0), (50.0, 60.0), (0.0, 90.0)]);
        let (_, h) = output_size(&corners);
        assert!((h - 90.0).abs() < 1e-4);
    }

    #[test]
    fn unskewed_rectangle_round_trips_like_a_crop() {
        let source = two_tone_document();
        let corners = quad([(40.0, 30.0), (160.0, 30.0), (160.0, 120.0), (40.0, 120.0)]);
        let out = rectify(&source, &corners).expect("rectify");

        assert_eq!(out.dimensions(), (120, 90));
        let aspect = out.width() as f32 / out.height() as f32;
        assert!((aspect - 120.0 / 90.0).abs() < 0.02);

        let crop = source.crop_imm(40, 30, 120, 90);
        for (x, y) in [(10, 10), (30, 45), (50, 80), (70, 10), (100, 45), (110, 80)] {
            let expected = crop.get_pixel(x, y);
            let expected = Rgb([expected.0[0], expected.0[1], expected.0[2]]);
            assert!(
                close_to(*out.get_pixel(x, y), expected),
                "pixel ({x},{y}) = {:?}, crop has {:?}",
                out.get_pixel(x, y),
                expected
            );
        }
    }

    #[test]
    fn samples_outside_source_are_transparent() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([255, 255, 255])));
        let corners = quad([(-50.0, -50.0), (49.0, -50.0), (49.0, 49.0), (-50.0, 49.0)]);
        let out = rectify(&source, &corners).expect("rectify");
        assert_eq!(out.get_pixel(10, 10).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(90, 90).0, [255, 255, 255, 255]);
    }

    #[test]
    fn coincident_corners_are_degenerate() {
        let source = two_tone_document();
        let corners = quad([(5.0, 5.0); 4]);
        assert!(matches!(
            rectify(&source, &corners),
            Err(QuadcropError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn collinear_corners_are_degenerate() {
        let source = two_tone_document();
        let corners = quad([(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (150.0, 0.0)]);
        assert!(matches!(
            rectify(&source, &corners),
            Err(QuadcropError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn three_collinear_corners_are_degenerate() {
        let source = two_tone_document();
        let corners = quad([(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (50.0, 80.0)]);
        assert!(corners.area() >= 1.0);
        assert!(matches!(
            rectify(&source, &corners),
            Err(QuadcropError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn gently_bent_side_is_still_accepted() {
        // A 3 px bow over a 120 px side is a real photo, not a straight line.
        let corners = quad([(40.0, 30.0), (100.0, 27.0), (160.0, 30.0), (100.0, 120.0)]);
        assert!(check_corner_turns(&corners).is_ok());
    }

    #[test]
    fn oversized_output_is_rejected_before_allocating() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, GRAY));
        for extent in [60_000.0, 1e12] {
            let corners = quad([(0.0, 0.0), (extent, 0.0), (extent, extent), (0.0, extent)]);
            assert!(matches!(
                rectify(&source, &corners),
                Err(QuadcropError::DegenerateGeometry(_))
            ));
        }
        // Twice the source's long edge is still allowed.
        let corners = quad([(0.0, 0.0), (99.0, 0.0), (99.0, 99.0), (0.0, 99.0)]);
        assert_eq!(rectify(&source, &corners).expect("rectify").dimensions(), (99, 99));
    }

    #[test]
    fn non_finite_corners_are_degenerate() {
        let source = two_tone_document();
        let corners = quad([(f32::NAN, 0.0), (50.0, 0.0), (50.0, 50.0), (0.0, 50.0)]);
        assert!(rectify(&source, &corners).is_err());
    }

    #[test]
    fn grayscale_source_yields_rgba_output() {
        let source = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(40, 40, image::Luma([90])));
        let corners = quad([(5.0, 5.0), (34.0, 5.0), (34.0, 34.0), (5.0, 34.0)]);
        let out = rectify(&source, &corners).expect("rectify");
        assert_eq!(out.get_pixel(10, 10).0, [90, 90, 90, 255]);
    }
}
