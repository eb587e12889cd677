// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document detector: the single parameterised pipeline from a raw photo to
// four ordered corner points.

use image::{DynamicImage, GrayImage};
use quadcrop_core::config::{BlurKernel, DetectionConfig};
use quadcrop_core::error::{QuadcropError, Result};
use quadcrop_core::{Contour, Quad};
use tracing::{debug, info, instrument, warn};

use super::corners::order_quad;
use super::edges::{close_edges, detect_edges, external_contours, resolve_thresholds};
use super::preprocess::{adaptive_blur_kernel, binarize, blur, to_grayscale};
use super::quad::select_document_quad;
use crate::image::downscale_long_edge;

/// Parameter values actually used for one run, after adaptive policies
/// were resolved against the working image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub blur_kernel: u32,
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub close_kernel_size: u32,
}

/// Every intermediate raster of one pipeline run.
///
/// Owned by the caller; dropping it releases all stage buffers at once.
pub struct StageOutputs {
    /// Resized colour image the other stages were computed from.
    pub working: DynamicImage,
    /// `working = original * scale`.
    pub scale: f32,
    pub blurred: GrayImage,
    pub edges: GrayImage,
    pub closed: GrayImage,
    pub contours: Vec<Contour>,
    pub params: ResolvedParams,
}

impl StageOutputs {
    pub fn working_area(&self) -> f64 {
        self.working.width() as f64 * self.working.height() as f64
    }
}

/// Outcome of a detection run. `corners == None` means no document was
/// found, which is an expected result rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Ordered corners in working (resized) image space.
    pub corners: Option<Quad>,
    pub scale: f32,
    pub working_size: (u32, u32),
    pub params: ResolvedParams,
}

impl Detection {
    pub fn found(&self) -> bool {
        self.corners.is_some()
    }

    /// Corners mapped back to the pixel space of the original image.
    pub fn corners_in_source(&self) -> Option<Quad> {
        self.corners.map(|quad| quad.scaled(1.0 / self.scale))
    }
}

/// Runs preprocessing, edge extraction, quad selection and corner ordering
/// with one `DetectionConfig`.
#[derive(Debug, Clone)]
pub struct DocumentDetector {
    config: DetectionConfig,
}

impl DocumentDetector {
    /// Validate `config` and build a detector around it.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run every stage up to contour extraction and keep the intermediates.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn run_stages(&self, image: &DynamicImage) -> Result<StageOutputs> {
        if image.width() == 0 || image.height() == 0 {
            return Err(QuadcropError::ImageError("cannot scan an empty image".into()));
        }

        let (working, scale) = self
            .config
            .target_long_edge
            .and_then(|target| downscale_long_edge(image, target))
            .unwrap_or_else(|| (image.clone(), 1.0));

        let blur_kernel = match self.config.blur_kernel {
            BlurKernel::Adaptive => adaptive_blur_kernel(working.width()),
            BlurKernel::Fixed(size) => size,
        };
        let gray = to_grayscale(&working);
        let mut blurred = blur(&gray, blur_kernel, self.config.blur_mode);
        drop(gray);
        if let Some(params) = self.config.binarize {
            blurred = binarize(&blurred, params);
        }

        let (low, high) = resolve_thresholds(&blurred, self.config.thresholds);
        let edges = detect_edges(&blurred, low, high);
        let closed = close_edges(&edges, self.config.close_kernel_size);
        let contours = external_contours(&closed);

        let params = ResolvedParams {
            blur_kernel,
            low_threshold: low,
            high_threshold: high,
            close_kernel_size: self.config.close_kernel_size,
        };
        debug!(?params, contours = contours.len(), "Pipeline stages complete");

        Ok(StageOutputs {
            working,
            scale,
            blurred,
            edges,
            closed,
            contours,
            params,
        })
    }

    /// `findDocumentCorners(image) -> ordered corners?`
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection> {
        let stages = self.run_stages(image)?;

        let corners = select_document_quad(
            &stages.contours,
            stages.working_area(),
            self.config.min_area_fraction,
        )
        .map(|quad| order_quad(&quad, self.config.anchor_top_left));

        match &corners {
            Some(quad) => info!(corners = ?quad.corners(), "Document corners found"),
            None => warn!("Could not find document corners"),
        }

        Ok(Detection {
            corners,
            scale: stages.scale,
            working_size: (stages.working.width(), stages.working.height()),
            params: stages.params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::geometry::{approximate_polygon, arc_length, polygon_area};
    use crate::scan::rectify::rectify;
    use image::{Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point as PixelPoint;
    use quadcrop_core::config::EdgeThresholds;
    use quadcrop_core::{CornerRole, Point};

    /// Physical card proportions (ID-1: 85.6 x 54 mm).
    const CARD_RATIO: f32 = 85.6 / 54.0;

    /// A white card rotated by `degrees` on a dark desk, 1200x1600.
    fn photographed_card(degrees: f32) -> (DynamicImage, [Point; 4]) {
        let (w, h) = (1200u32, 1600u32);
        let (cx, cy) = (600.0f32, 800.0f32);
        let (half_w, half_h) = (450.0f32, 450.0 / CARD_RATIO);
        let (sin, cos) = degrees.to_radians().sin_cos();

        let corners = [(-half_w, -half_h), (half_w, -half_h), (half_w, half_h), (-half_w, half_h)]
            .map(|(dx, dy)| Point::new(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos));

        let mut img = RgbImage::from_pixel(w, h, Rgb([40, 45, 50]));
        let poly: Vec<PixelPoint<i32>> = corners
            .iter()
            .map(|p| PixelPoint::new(p.x.round() as i32, p.y.round() as i32))
            .collect();
        draw_polygon_mut(&mut img, &poly, Rgb([235, 235, 230]));
        (DynamicImage::ImageRgb8(img), corners)
    }

    #[test]
    fn blank_image_finds_no_document() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 200, Luma([200u8])));
        let detector = DocumentDetector::new(DetectionConfig::default()).expect("detector");
        let detection = detector.detect(&img).expect("detect");
        assert!(!detection.found());
        assert!(detection.corners_in_source().is_none());
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let detector = DocumentDetector::new(DetectionConfig::default()).expect("detector");
        assert!(matches!(detector.detect(&img), Err(QuadcropError::ImageError(_))));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = DetectionConfig {
            close_kernel_size: 4,
            ..DetectionConfig::default()
        };
        assert!(DocumentDetector::new(config).is_err());
    }

    #[test]
    fn stages_share_the_working_resolution() {
        let (img, _) = photographed_card(0.0);
        let detector = DocumentDetector::new(DetectionConfig::default()).expect("detector");
        let stages = detector.run_stages(&img).expect("stages");
        assert_eq!(stages.working.width(), 750);
        assert_eq!(stages.working.height(), 1000);
        assert_eq!(stages.blurred.dimensions(), (750, 1000));
        assert_eq!(stages.edges.dimensions(), (750, 1000));
        assert_eq!(stages.closed.dimensions(), (750, 1000));
        assert_eq!(stages.params.blur_kernel, 5);
        assert!(stages.params.low_threshold <= stages.params.high_threshold);
    }

    #[test]
    fn photographed_card_end_to_end() {
        let (img, truth) = photographed_card(8.0);
        let detector = DocumentDetector::new(DetectionConfig::default()).expect("detector");

        let stages = detector.run_stages(&img).expect("stages");
        assert!(stages.working.width().max(stages.working.height()) <= 1000);
        let min_area = 0.05 * stages.working_area();
        let quads = stages
            .contours
            .iter()
            .filter(|c| polygon_area(&c.points) > min_area)
            .filter(|c| approximate_polygon(&c.points, 0.02 * arc_length(&c.points)).len() == 4)
            .count();
        assert_eq!(quads, 1);

        let detection = detector.detect(&img).expect("detect");
        let corners = detection.corners_in_source().expect("card found");

        // Corners come back TL, TR, BR, BL in original pixel space.
        for (found, expected) in corners.corners().iter().zip(truth.iter()) {
            assert!(
                found.distance(expected) < 12.0,
                "corner {:?} too far from {:?}",
                found,
                expected
            );
        }
        assert!(corners.corner(CornerRole::TopLeft).y < corners.corner(CornerRole::BottomLeft).y);

        let out = rectify(&img, &corners).expect("rectify");
        let aspect = out.width() as f32 / out.height() as f32;
        assert!(
            (aspect / CARD_RATIO - 1.0).abs() < 0.05,
            "aspect {aspect} vs card {CARD_RATIO}"
        );
    }

    #[test]
    fn fixed_thresholds_and_median_blur_also_find_the_card() {
        let (img, _) = photographed_card(-5.0);
        let config = DetectionConfig {
            blur_kernel: BlurKernel::Fixed(5),
            blur_mode: quadcrop_core::config::BlurMode::GaussianMedian,
            thresholds: EdgeThresholds::Fixed { low: 50.0, high: 150.0 },
            min_area_fraction: 0.01,
            ..DetectionConfig::default()
        };
        let detection = DocumentDetector::new(config)
            .expect("detector")
            .detect(&img)
            .expect("detect");
        assert!(detection.found());
        assert_eq!(detection.params.low_threshold, 50.0);
        assert_eq!(detection.working_size, (750, 1000));
    }
}
