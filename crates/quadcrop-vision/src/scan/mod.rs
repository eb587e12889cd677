// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: preprocessing, edge/contour extraction, quadrilateral
// selection, corner ordering and perspective rectification.

pub mod corners;
pub mod detector;
pub mod edges;
pub mod geometry;
pub mod preprocess;
pub mod quad;
pub mod rectify;

pub use corners::{anchor_top_left, order_corners, order_quad};
pub use detector::{Detection, DocumentDetector, ResolvedParams, StageOutputs};
pub use preprocess::adaptive_blur_kernel;
pub use quad::select_document_quad;
pub use rectify::rectify;
