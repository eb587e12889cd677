// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing stage: grayscale conversion, kernel-sized smoothing and
// optional local-mean binarisation.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use quadcrop_core::config::{BinarizeParams, BlurMode};
use tracing::{debug, instrument};

/// Width at which the adaptive policy yields its base kernel.
const BASE_RESOLUTION: f64 = 1000.0;
const BASE_KERNEL: f64 = 5.0;
const MIN_ADAPTIVE_KERNEL: u32 = 3;
const MAX_ADAPTIVE_KERNEL: u32 = 15;

/// Blur kernel size scaled with image width.
///
/// `clamp(oddify(round(width / 1000 * 5)), 3, 15)`, where `oddify` bumps even
/// values up to the next odd number.
pub fn adaptive_blur_kernel(width: u32) -> u32 {
    let scaled = (width as f64 / BASE_RESOLUTION * BASE_KERNEL).round() as u32;
    let odd = if scaled % 2 == 0 { scaled + 1 } else { scaled };
    odd.clamp(MIN_ADAPTIVE_KERNEL, MAX_ADAPTIVE_KERNEL)
}

/// Gaussian sigma matching a square kernel of `kernel_size` taps.
///
/// The usual relation when only a kernel size is given.
pub fn kernel_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Luma conversion using the standard Rec. 709 weights.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Smooth a grayscale image with an odd `kernel_size`; 0 returns a copy.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn blur(gray: &GrayImage, kernel_size: u32, mode: BlurMode) -> GrayImage {
    if kernel_size == 0 {
        debug!("Smoothing disabled");
        return gray.clone();
    }

    let gaussian = gaussian_blur_f32(gray, kernel_sigma(kernel_size));
    match mode {
        BlurMode::Gaussian => gaussian,
        BlurMode::GaussianMedian => {
            let radius = kernel_size / 2;
            median_filter(&gaussian, radius, radius)
        }
    }
}

/// `preprocess(image, kernel) -> blurred grayscale`.
pub fn preprocess(image: &DynamicImage, kernel_size: u32, mode: BlurMode) -> GrayImage {
    let gray = to_grayscale(image);
    blur(&gray, kernel_size, mode)
}

/// Adaptive thresholding to a black-and-white image.
///
/// Uses a local mean approach: for each pixel, the threshold is the mean
/// intensity within a `block_radius` neighbourhood, minus `offset`.
/// Pixels darker than the local threshold become black; others become white.
#[instrument(skip(gray), fields(block_radius = params.block_radius, offset = params.offset))]
pub fn binarize(gray: &GrayImage, params: BinarizeParams) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral = compute_integral_image(gray);

    let output = GrayImage::from_fn(width, height, |x, y| {
        let local_mean = region_mean(&integral, width, height, x, y, params.block_radius);
        let threshold = (local_mean as i32 - params.offset).clamp(0, 255) as u8;
        let value = gray.get_pixel(x, y).0[0];
        Luma([if value < threshold { 0u8 } else { 255u8 }])
    });

    debug!("Binarization complete");
    output
}

// -- Integral image helpers ---------------------------------------------------

/// Summed-area table with a zero-padded first row and column.
///
/// `table[y * (width+1) + x]` is the sum of all pixels in `[0, x) x [0, y)`.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value of the square of `radius` around (cx, cy), clamped to
/// the image bounds.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = (cx as usize + radius as usize + 1).min(img_width as usize);
    let y2 = (cy as usize + radius as usize + 1).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 128.0;
    }

    let sum = integral[y2 * stride + x2] as f64
        - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}
