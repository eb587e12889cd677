// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Quadcrop.

use thiserror::Error;

/// Top-level error type for all Quadcrop operations.
///
/// "No document found" is deliberately absent: the detector reports it as an
/// empty corner set, not as a failure.
#[derive(Debug, Error)]
pub enum QuadcropError {
    // -- Input boundary --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Parameters --
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    // -- Corner set --
    #[error("a corner set needs exactly 4 points, got {0}")]
    CornerCount(usize),

    #[error("corner index {0} is out of range")]
    CornerIndex(usize),

    #[error("no document corners available")]
    NoCorners,

    #[error("degenerate corner geometry: {0}")]
    DegenerateGeometry(String),

    // -- Background execution --
    #[error("background task failed: {0}")]
    Worker(String),

    // -- Storage / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuadcropError>;
