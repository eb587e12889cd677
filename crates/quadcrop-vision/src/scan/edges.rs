// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge and contour extraction: Canny with fixed or Otsu-derived thresholds,
// morphological closing, and external border following.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::close;
use quadcrop_core::config::EdgeThresholds;
use quadcrop_core::{Contour, Point};
use tracing::{debug, instrument};

/// Resolve the Canny threshold pair for `blurred`.
///
/// The Otsu policy uses half the Otsu level as the low threshold and the
/// level itself as the high threshold.
pub fn resolve_thresholds(blurred: &GrayImage, policy: EdgeThresholds) -> (f32, f32) {
    match policy {
        EdgeThresholds::Fixed { low, high } => (low, high),
        EdgeThresholds::Otsu => {
            let otsu = otsu_level(blurred) as f32;
            debug!(otsu, "Otsu level computed");
            (otsu * 0.5, otsu)
        }
    }
}

/// Close gaps in an edge map with a square structuring element of
/// `kernel_size`; 0 returns a copy.
pub fn close_edges(edges: &GrayImage, kernel_size: u32) -> GrayImage {
    if kernel_size == 0 {
        return edges.clone();
    }
    let radius = (kernel_size / 2).min(u8::MAX as u32) as u8;
    close(edges, Norm::LInf, radius)
}

/// Smallest threshold handed to Canny. Hysteresis must never accept the
/// zero-strength border left by non-maximum suppression.
pub const MIN_CANNY_THRESHOLD: f32 = 1.0;

/// Threshold pair actually used by [`detect_edges`]: both at least
/// [`MIN_CANNY_THRESHOLD`], and `high >= low`.
pub fn clamp_thresholds(low: f32, high: f32) -> (f32, f32) {
    let low = if low.is_finite() { low.max(MIN_CANNY_THRESHOLD) } else { MIN_CANNY_THRESHOLD };
    let high = if high.is_finite() { high.max(low) } else { low };
    (low, high)
}

/// Canny edge map: 255 on edges, 0 elsewhere.
#[instrument(skip(blurred), fields(width = blurred.width(), height = blurred.height()))]
pub fn detect_edges(blurred: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (low, high) = clamp_thresholds(low, high);
    let edges = canny(blurred, low, high);
    debug!(low, high, "Canny edge detection complete");
    edges
}

/// `extractEdges(blurred, low, high, closeKernel) -> binary edge image`.
pub fn extract_edges(blurred: &GrayImage, low: f32, high: f32, close_kernel_size: u32) -> GrayImage {
    let edges = detect_edges(blurred, low, high);
    close_edges(&edges, close_kernel_size)
}

/// Outer borders that are not nested inside any other border.
#[instrument(skip(binary), fields(width = binary.width(), height = binary.height()))]
pub fn external_contours(binary: &GrayImage) -> Vec<Contour> {
    let contours = find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            Contour::new(
                c.points
                    .into_iter()
                    .map(|p| Point::new(p.x as f32, p.y as f32))
                    .collect(),
            )
        })
        .collect::<Vec<_>>();

    debug!(count = contours.len(), "External contours extracted");
    contours
}
