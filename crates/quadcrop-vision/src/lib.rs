// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quadcrop-vision: Document quadrilateral detection and perspective
// rectification.
//
// Provides image loading with EXIF orientation, the detection pipeline
// (blur, Canny, closing, contours, quad selection, corner ordering),
// perspective rectification, a debug harness for tuning, per-image scan
// sessions with corner editing, and a background worker.

pub mod debug;
pub mod image;
pub mod scan;
pub mod session;
pub mod worker;

// Re-export the primary types so callers can use `quadcrop_vision::DocumentDetector` etc.
pub use crate::debug::{DebugHarness, DebugParams, DebugStage, Slider};
pub use crate::image::ImageProcessor;
pub use crate::scan::{Detection, DocumentDetector, order_corners, rectify};
pub use crate::session::{DEFAULT_TOUCH_TOLERANCE, ScanSession};
pub use crate::worker::{DetectionWorker, DisplaySlot, JobKind, PendingResult, Ticket};
