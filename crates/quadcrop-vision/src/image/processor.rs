// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decoding with EXIF orientation, resolution normalisation
// and output-format normalisation. Operates on in-memory images using the
// `image` crate.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use quadcrop_core::error::QuadcropError;
use tracing::{debug, info, instrument};

/// Holds one correctly oriented source raster.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so the
/// previous raster is dropped as soon as it is replaced.
///
/// ```ignore
/// let (working, scale) = ImageProcessor::open("photo.jpg")?
///     .normalize_long_edge(1000);
/// let rgba = to_rgba_output(&working.into_dynamic());
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an image from a file path, applying its EXIF orientation.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, QuadcropError> {
        let data = std::fs::read(path.as_ref())?;
        let processor = Self::from_bytes(&data)?;
        info!(
            width = processor.width(),
            height = processor.height(),
            "Image loaded"
        );
        Ok(processor)
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.), applying the EXIF
    /// orientation reported by the decoder so every pipeline stage sees an
    /// upright raster.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, QuadcropError> {
        let decode_err =
            |err: image::ImageError| QuadcropError::Decode(format!("failed to decode image: {}", err));

        let mut decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()
            .map_err(decode_err)?;
        let orientation = decoder.orientation().map_err(decode_err)?;
        let mut image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
        image.apply_orientation(orientation);

        debug!(
            width = image.width(),
            height = image.height(),
            ?orientation,
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Wrap an already-decoded, already-oriented `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Downscale so the longer edge equals `target`, preserving aspect ratio.
    ///
    /// Returns the new processor and the applied scale factor
    /// (`working = original * scale`). Images already within `target` are
    /// left untouched with a scale of 1.0.
    pub fn normalize_long_edge(self, target: u32) -> (Self, f32) {
        match downscale_long_edge(&self.image, target) {
            Some((image, scale)) => (Self { image }, scale),
            None => (self, 1.0),
        }
    }
}

/// Downscaled copy of `image` whose longer edge equals `target`, resampled
/// straight from the borrowed raster. `None` when no resize is needed.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn downscale_long_edge(image: &DynamicImage, target: u32) -> Option<(DynamicImage, f32)> {
    let (w, h) = (image.width(), image.height());
    let long_edge = w.max(h);
    if target == 0 || long_edge <= target {
        debug!("No resize needed");
        return None;
    }

    let scale = target as f32 / long_edge as f32;
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle);

    info!(
        from_w = w,
        from_h = h,
        to_w = new_w,
        to_h = new_h,
        scale,
        "Normalised resolution"
    );
    Some((resized, scale))
}

/// Normalise any raster (including single-channel stage outputs) to RGBA.
pub fn to_rgba_output(image: &DynamicImage) -> RgbaImage {
    image.to_rgba8()
}
