// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration: the single parameter set driving every pipeline
// stage. Constructed per detection call; hosts may serialise tuned values.

use serde::{Deserialize, Serialize};

use crate::error::{QuadcropError, Result};

/// Long-edge length (pixels) that photos are normalised to before detection.
pub const DEFAULT_TARGET_LONG_EDGE: u32 = 1000;

/// How the noise-reduction kernel size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlurKernel {
    /// Scale the kernel with the working image width (3..=15, always odd).
    Adaptive,
    /// Use the given odd kernel size. `Fixed(0)` disables smoothing.
    Fixed(u32),
}

/// Smoothing filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlurMode {
    Gaussian,
    /// Gaussian followed by a median filter of the same kernel size.
    GaussianMedian,
}

/// Canny threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeThresholds {
    Fixed { low: f32, high: f32 },
    /// `low = 0.5 * otsu`, `high = otsu`, computed on the blurred image.
    Otsu,
}

/// Local-mean adaptive binarisation applied after smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarizeParams {
    /// Half-size of the square neighbourhood used for the local mean.
    pub block_radius: u32,
    /// Subtracted from the local mean to form the per-pixel threshold.
    pub offset: i32,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self {
            block_radius: 15,
            offset: 10,
        }
    }
}

/// Parameters for one document detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Long edge the input is downscaled to before processing (`None` keeps
    /// the original resolution).
    pub target_long_edge: Option<u32>,
    pub blur_kernel: BlurKernel,
    pub blur_mode: BlurMode,
    pub binarize: Option<BinarizeParams>,
    pub thresholds: EdgeThresholds,
    /// Square structuring element size for closing the edge map (0 = off).
    pub close_kernel_size: u32,
    /// Contours must enclose strictly more than this fraction of the working
    /// image area.
    pub min_area_fraction: f64,
    /// Rotate ordered corners so index 0 is the top-left-most point.
    pub anchor_top_left: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            target_long_edge: Some(DEFAULT_TARGET_LONG_EDGE),
            blur_kernel: BlurKernel::Adaptive,
            blur_mode: BlurMode::Gaussian,
            binarize: None,
            thresholds: EdgeThresholds::Otsu,
            close_kernel_size: 5,
            min_area_fraction: 0.05,
            anchor_top_left: true,
        }
    }
}

impl DetectionConfig {
    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.target_long_edge == Some(0) {
            return Err(QuadcropError::InvalidParameter(
                "target_long_edge must be positive".into(),
            ));
        }

        if let BlurKernel::Fixed(size) = self.blur_kernel {
            if size != 0 && size % 2 == 0 {
                return Err(QuadcropError::InvalidParameter(format!(
                    "blur kernel size must be odd or 0, got {size}"
                )));
            }
        }

        if self.close_kernel_size != 0 && self.close_kernel_size % 2 == 0 {
            return Err(QuadcropError::InvalidParameter(format!(
                "close kernel size must be odd or 0, got {}",
                self.close_kernel_size
            )));
        }

        if let EdgeThresholds::Fixed { low, high } = self.thresholds {
            if !(low >= 0.0 && high >= 0.0) {
                return Err(QuadcropError::InvalidParameter(format!(
                    "edge thresholds must be non-negative, got {low}/{high}"
                )));
            }
            if low > high {
                return Err(QuadcropError::InvalidParameter(format!(
                    "low edge threshold {low} exceeds high threshold {high}"
                )));
            }
        }

        if !(0.0..1.0).contains(&self.min_area_fraction) {
            return Err(QuadcropError::InvalidParameter(format!(
                "min_area_fraction must lie in [0, 1), got {}",
                self.min_area_fraction
            )));
        }

        Ok(())
    }

    /// Fixed Canny thresholds instead of the Otsu-derived pair.
    pub fn with_fixed_thresholds(mut self, low: f32, high: f32) -> Self {
        self.thresholds = EdgeThresholds::Fixed { low, high };
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
