// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session: one source image, its detected or user-edited corners, and
// the drag gesture state used to adjust them.
//
// The session is the only place corner state lives. Hosts keep one session
// per image and hand it to the worker (or call it directly) for detection
// and rectification.

use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use quadcrop_core::error::{QuadcropError, Result};
use quadcrop_core::human_errors::{HumanError, no_document_found};
use quadcrop_core::{DetectionConfig, Point, Quad, SessionId};
use tracing::{debug, info, instrument};

use crate::image::ImageProcessor;
use crate::scan::corners::order_quad;
use crate::scan::detector::{Detection, DocumentDetector};
use crate::scan::rectify::rectify;

/// How close (in source pixels) a touch must land to grab a corner.
pub const DEFAULT_TOUCH_TOLERANCE: f32 = 40.0;

/// Index of the corner nearest to `at`, if it lies strictly within
/// `tolerance`. Ties go to the lower index.
pub fn nearest_corner(quad: &Quad, at: Point, tolerance: f32) -> Option<usize> {
    quad.corners()
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.distance(&at)))
        .filter(|&(_, d)| d < tolerance)
        .fold(None, |best: Option<(usize, f32)>, (i, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

#[derive(Debug, Clone)]
pub struct ScanSession {
    id: SessionId,
    source: Arc<DynamicImage>,
    config: DetectionConfig,
    detection: Option<Detection>,
    /// Source-space corners, TL, TR, BR, BL.
    corners: Option<Quad>,
    active_corner: Option<usize>,
}

impl ScanSession {
    /// Start a session for an already-decoded (and oriented) image.
    pub fn new(source: DynamicImage, config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        if source.width() == 0 || source.height() == 0 {
            return Err(QuadcropError::ImageError("cannot scan an empty image".into()));
        }
        let session = Self {
            id: SessionId::new(),
            source: Arc::new(source),
            config,
            detection: None,
            corners: None,
            active_corner: None,
        };
        info!(session = %session.id, "Scan session started");
        Ok(session)
    }

    /// Decode `data`, apply its EXIF orientation and start a session.
    pub fn from_bytes(data: &[u8], config: DetectionConfig) -> Result<Self> {
        Self::new(ImageProcessor::from_bytes(data)?.into_dynamic(), config)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn source(&self) -> &Arc<DynamicImage> {
        &self.source
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }

    pub fn corners(&self) -> Option<&Quad> {
        self.corners.as_ref()
    }

    pub fn active_corner(&self) -> Option<usize> {
        self.active_corner
    }

    /// Run detection on the source image and adopt its corners.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn detect(self) -> Result<Self> {
        let detection = DocumentDetector::new(self.config.clone())?.detect(&self.source)?;
        Ok(self.apply_detection(detection))
    }

    /// Adopt a detection computed elsewhere (e.g. on the worker). A run with
    /// no result clears the corner set.
    pub fn apply_detection(mut self, detection: Detection) -> Self {
        self.corners = detection.corners_in_source();
        self.active_corner = None;
        debug!(session = %self.id, found = detection.found(), "Detection applied");
        self.detection = Some(detection);
        self
    }

    /// Install a corner set supplied by the caller. Exactly four points are
    /// required; they are re-ordered TL, TR, BR, BL.
    pub fn with_corners(mut self, points: &[Point]) -> Result<Self> {
        let quad = Quad::from_slice(points)?;
        self.corners = Some(order_quad(&quad, self.config.anchor_top_left));
        self.active_corner = None;
        Ok(self)
    }

    /// Begin a drag on the corner nearest to `at`. Returns the grabbed index.
    pub fn grab_corner(&mut self, at: Point, tolerance: f32) -> Option<usize> {
        self.active_corner = self
            .corners
            .as_ref()
            .and_then(|quad| nearest_corner(quad, at, tolerance));
        self.active_corner
    }

    /// Move the grabbed corner to `to`. Returns false when nothing is grabbed.
    pub fn drag_to(&mut self, to: Point) -> Result<bool> {
        match (self.active_corner, self.corners.as_mut()) {
            (Some(index), Some(quad)) => {
                quad.set_corner(index, to)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn release(&mut self) {
        self.active_corner = None;
    }

    /// Rectify the source image with the current corners.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn rectify(&self) -> Result<RgbaImage> {
        let corners = self.corners.as_ref().ok_or(QuadcropError::NoCorners)?;
        rectify(&self.source, corners)
    }

    /// Message for the host after a detection that found nothing.
    pub fn status_message(&self) -> Option<HumanError> {
        match &self.detection {
            Some(detection) if !detection.found() => Some(no_document_found()),
            _ => None,
        }
    }
}
