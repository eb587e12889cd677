// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug harness: renders any intermediate pipeline stage for live tuning.

use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use quadcrop_core::error::Result;
use quadcrop_core::Contour;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::sliders::{DebugParams, Slider};
use crate::image::to_rgba_output;
use crate::scan::detector::DocumentDetector;
use crate::scan::geometry::polygon_area;

const PASS_COLOUR: Rgba<u8> = Rgba([0, 255, 0, 255]);
const FAIL_COLOUR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const STROKE_RADIUS: i32 = 2;

/// Which intermediate raster to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebugStage {
    Blurred,
    Edges,
    Closed,
    /// Working image with every external contour outlined.
    #[default]
    Final,
}

/// Slider state plus the selected stage. Every render recomputes the whole
/// pipeline from the source image.
#[derive(Debug, Clone, Default)]
pub struct DebugHarness {
    params: DebugParams,
    stage: DebugStage,
}

impl DebugHarness {
    pub fn new(params: DebugParams, stage: DebugStage) -> Self {
        Self { params, stage }
    }

    pub fn params(&self) -> &DebugParams {
        &self.params
    }

    pub fn stage(&self) -> DebugStage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: DebugStage) {
        self.stage = stage;
    }

    pub fn set_slider(&mut self, slider: Slider, position: u32) -> Result<()> {
        self.params.apply(slider, position)
    }

    /// Run the pipeline on `source` and render the selected stage as RGBA.
    #[instrument(skip(self, source), fields(stage = ?self.stage))]
    pub fn render(&self, source: &DynamicImage) -> Result<RgbaImage> {
        let detector = DocumentDetector::new(self.params.to_config())?;
        let stages = detector.run_stages(source)?;

        let rendered = match self.stage {
            DebugStage::Blurred => gray_to_rgba(stages.blurred),
            DebugStage::Edges => gray_to_rgba(stages.edges),
            DebugStage::Closed => gray_to_rgba(stages.closed),
            DebugStage::Final => {
                let min_area = self.params.min_area_fraction * stages.working_area();
                let mut canvas = to_rgba_output(&stages.working);
                let mut passing = 0usize;
                for contour in &stages.contours {
                    let passes = polygon_area(&contour.points) > min_area;
                    passing += passes as usize;
                    draw_contour(&mut canvas, contour, if passes { PASS_COLOUR } else { FAIL_COLOUR });
                }
                debug!(total = stages.contours.len(), passing, "Contours drawn");
                canvas
            }
        };
        Ok(rendered)
    }
}

fn gray_to_rgba(gray: GrayImage) -> RgbaImage {
    to_rgba_output(&DynamicImage::ImageLuma8(gray))
}

/// Outline a closed contour with a stroke about five pixels wide.
fn draw_contour(canvas: &mut RgbaImage, contour: &Contour, colour: Rgba<u8>) {
    let n = contour.points.len();
    for (i, p) in contour.points.iter().enumerate() {
        let next = contour.points[(i + 1) % n];
        draw_line_segment_mut(canvas, (p.x, p.y), (next.x, next.y), colour);
        draw_filled_circle_mut(
            canvas,
            (p.x.round() as i32, p.y.round() as i32),
            STROKE_RADIUS,
            colour,
        );
    }
}
