// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tuning sliders: raw slider positions mapped to pipeline parameters.

use std::ops::RangeInclusive;

use quadcrop_core::config::{BlurKernel, BlurMode, DetectionConfig, EdgeThresholds};
use quadcrop_core::error::{QuadcropError, Result};
use serde::{Deserialize, Serialize};

const KERNEL_POSITIONS: RangeInclusive<u32> = 0..=10;
const THRESHOLD_POSITIONS: RangeInclusive<u32> = 0..=255;

/// One adjustable parameter exposed to a tuning UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slider {
    BlurKernel,
    LowThreshold,
    HighThreshold,
    CloseKernel,
}

impl Slider {
    pub const ALL: [Slider; 4] = [
        Slider::BlurKernel,
        Slider::LowThreshold,
        Slider::HighThreshold,
        Slider::CloseKernel,
    ];

    /// Valid raw positions.
    pub fn range(self) -> RangeInclusive<u32> {
        match self {
            Self::BlurKernel | Self::CloseKernel => KERNEL_POSITIONS,
            Self::LowThreshold | Self::HighThreshold => THRESHOLD_POSITIONS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BlurKernel => "Blur kernel size",
            Self::LowThreshold => "Canny low threshold",
            Self::HighThreshold => "Canny high threshold",
            Self::CloseKernel => "Close kernel size",
        }
    }

    /// Map a raw position to the parameter value it selects.
    ///
    /// Kernel sliders map `p` to `2p + 1`, with `p == 0` meaning disabled
    /// (0). Threshold sliders map positions one-to-one.
    pub fn value_at(self, position: u32) -> Result<f32> {
        if !self.range().contains(&position) {
            return Err(QuadcropError::InvalidParameter(format!(
                "{} position {} outside {:?}",
                self.label(),
                position,
                self.range()
            )));
        }
        Ok(match self {
            Self::BlurKernel | Self::CloseKernel => kernel_from_position(position) as f32,
            Self::LowThreshold | Self::HighThreshold => position as f32,
        })
    }
}

/// `p -> 2p + 1`, `0 -> 0` (disabled).
pub fn kernel_from_position(position: u32) -> u32 {
    if position == 0 { 0 } else { position * 2 + 1 }
}

/// Inverse of [`kernel_from_position`] for odd sizes and 0.
pub fn position_from_kernel(kernel: u32) -> u32 {
    kernel.saturating_sub(1) / 2
}

/// Live parameter set driven by the sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugParams {
    pub blur_kernel: u32,
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub close_kernel_size: u32,
    /// Contours above this fraction of the working area are drawn as passing.
    pub min_area_fraction: f64,
}

impl Default for DebugParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            low_threshold: 50.0,
            high_threshold: 150.0,
            close_kernel_size: 5,
            min_area_fraction: 0.01,
        }
    }
}

impl DebugParams {
    /// Move `slider` to `position`, updating the matching parameter.
    pub fn apply(&mut self, slider: Slider, position: u32) -> Result<()> {
        let value = slider.value_at(position)?;
        match slider {
            Slider::BlurKernel => self.blur_kernel = value as u32,
            Slider::LowThreshold => self.low_threshold = value,
            Slider::HighThreshold => self.high_threshold = value,
            Slider::CloseKernel => self.close_kernel_size = value as u32,
        }
        Ok(())
    }

    /// Slider position that reproduces the current value.
    pub fn position(&self, slider: Slider) -> u32 {
        match slider {
            Slider::BlurKernel => position_from_kernel(self.blur_kernel),
            Slider::LowThreshold => self.low_threshold as u32,
            Slider::HighThreshold => self.high_threshold as u32,
            Slider::CloseKernel => position_from_kernel(self.close_kernel_size),
        }
    }

    /// Detection configuration for these parameters. Thresholds dragged past
    /// each other are swapped so Canny always gets `low <= high`.
    pub fn to_config(&self) -> DetectionConfig {
        let low = self.low_threshold.min(self.high_threshold);
        let high = self.low_threshold.max(self.high_threshold);
        DetectionConfig {
            blur_kernel: BlurKernel::Fixed(self.blur_kernel),
            blur_mode: BlurMode::Gaussian,
            binarize: None,
            thresholds: EdgeThresholds::Fixed { low, high },
            close_kernel_size: self.close_kernel_size,
            min_area_fraction: self.min_area_fraction,
            ..DetectionConfig::default()
        }
    }
}
