// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: oriented decoding, resolution normalisation and RGBA output.

pub mod processor;

pub use processor::{ImageProcessor, downscale_long_edge, to_rgba_output};
