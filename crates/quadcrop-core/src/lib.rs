// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadcrop: Core types, configuration and error definitions shared by the
// detection pipeline and its hosts.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod telemetry;
pub mod types;

pub use config::DetectionConfig;
pub use error::QuadcropError;
pub use types::*;
