// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the quadcrop-vision pipeline: full detection on a
// photo-sized synthetic card, and rectification of the detected corners.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use quadcrop_core::DetectionConfig;
use quadcrop_vision::{DocumentDetector, rectify};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 2000x1500 desk with a slightly rotated light card, large enough that the
/// detector has to downscale before it starts.
fn synthetic_photo() -> DynamicImage {
    let mut img = RgbImage::from_pixel(2000, 1500, Rgb([45, 48, 52]));
    let card = [
        Point::new(420, 260),
        Point::new(1610, 330),
        Point::new(1560, 1190),
        Point::new(380, 1110),
    ];
    draw_polygon_mut(&mut img, &card, Rgb([236, 234, 228]));
    DynamicImage::ImageRgb8(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_detection(c: &mut Criterion) {
    let photo = synthetic_photo();
    let detector = match DocumentDetector::new(DetectionConfig::default()) {
        Ok(detector) => detector,
        Err(e) => panic!("default config rejected: {e}"),
    };

    c.bench_function("detect (2000x1500)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&photo))));
    });
}

fn bench_rectify(c: &mut Criterion) {
    let photo = synthetic_photo();
    let corners = DocumentDetector::new(DetectionConfig::default())
        .and_then(|detector| detector.detect(&photo))
        .ok()
        .and_then(|detection| detection.corners_in_source());
    let Some(corners) = corners else {
        panic!("synthetic card was not detected");
    };

    c.bench_function("rectify (detected card)", |b| {
        b.iter(|| black_box(rectify(black_box(&photo), &corners)));
    });
}

criterion_group!(benches, bench_detection, bench_rectify);
criterion_main!(benches);
