// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug tooling: stage-by-stage rendering driven by tuning sliders.

pub mod harness;
pub mod sliders;

pub use harness::{DebugHarness, DebugStage};
pub use sliders::{DebugParams, Slider};
