// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What to render and what comes back.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::coloring::{ColoringMode, Rgb};
use crate::depth::estimate_max_iterations;
use crate::errors::RenderError;
use crate::planes::Viewport;

/// How much smaller a preview is than the full render, per side.
pub const PREVIEW_DIVISOR: usize = 2;

/// Everything the engine needs for one render.  Built fresh by the
/// caller for each call; the engine keeps nothing between calls.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    viewport: Viewport,
    width: usize,
    height: usize,
    mode: ColoringMode,
    quick: bool,
    supersample: bool,
    #[serde(default)]
    max_iterations: Option<u32>,
}

impl RenderRequest {
    /// A full-quality, supersampled request.  Fails if either side of
    /// the raster is shorter than two pixels.
    pub fn new(
        viewport: Viewport,
        width: usize,
        height: usize,
        mode: ColoringMode,
    ) -> Result<Self, RenderError> {
        let request = RenderRequest {
            viewport,
            width,
            height,
            mode,
            quick: false,
            supersample: true,
            max_iterations: None,
        };
        request.validate()?;
        Ok(request)
    }

    /// Set the quick-preview flag.
    pub fn with_quick(self, quick: bool) -> Self {
        RenderRequest { quick, ..self }
    }

    /// Ask for (or turn off) 2x2 supersampling.  Quick requests never
    /// supersample, whatever this says.
    pub fn with_supersample(self, supersample: bool) -> Self {
        RenderRequest { supersample, ..self }
    }

    /// Replace the estimated iteration cap with a fixed one, for
    /// exports that want a known depth at any size.
    pub fn with_max_iterations(self, max_iterations: u32) -> Result<Self, RenderError> {
        if max_iterations == 0 {
            return Err(RenderError::InvalidIterations(max_iterations));
        }
        Ok(RenderRequest {
            max_iterations: Some(max_iterations),
            ..self
        })
    }

    /// The same request as a quick preview: the same viewport at
    /// `1/PREVIEW_DIVISOR` of the resolution (never below two pixels a
    /// side), fewer iterations, no supersampling.  Interactive callers
    /// render this first and the full request after it.
    pub fn preview(&self) -> Self {
        RenderRequest {
            width: std::cmp::max(self.width / PREVIEW_DIVISOR, 2),
            height: std::cmp::max(self.height / PREVIEW_DIVISOR, 2),
            quick: true,
            ..*self
        }
    }

    /// Checks a request, which may have arrived through
    /// deserialization rather than `new`.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width < 2 || self.height < 2 {
            return Err(RenderError::InvalidRenderSize(self.width, self.height));
        }
        if self.max_iterations == Some(0) {
            return Err(RenderError::InvalidIterations(0));
        }
        let vp = &self.viewport;
        Viewport::new(vp.min_re(), vp.max_re(), vp.min_im(), vp.max_im()).map(|_| ())
    }

    /// The region being rendered.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The coloring algorithm.
    pub fn mode(&self) -> ColoringMode {
        self.mode
    }

    /// Is this a preview?
    pub fn is_quick(&self) -> bool {
        self.quick
    }

    /// Whether pixels will actually be supersampled.  Previews never
    /// are.
    pub fn supersampled(&self) -> bool {
        self.supersample && !self.quick
    }

    /// The iteration cap this request will run with.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
            .unwrap_or_else(|| estimate_max_iterations(&self.viewport, self.quick))
    }
}

/// A rendered image: `width * height` pixels, row-major from the top
/// left, three bytes per pixel in red, green, blue order, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

/// Bytes per pixel in a raster.
pub const CHANNELS: usize = 3;

impl Raster {
    pub(crate) fn blank(width: usize, height: usize) -> Self {
        Raster {
            width,
            height,
            pixels: vec![0 as u8; width * height * CHANNELS],
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The color at column `x`, row `y`, or `None` outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = (y * self.width + x) * CHANNELS;
        Some(Rgb(self.pixels[o], self.pixels[o + 1], self.pixels[o + 2]))
    }

    /// The raw RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Hand over the raw RGB bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// Wrap the buffer as an `image` crate image, ready for encoding.
    pub fn into_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width as u32, self.height as u32, self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Pixel;

    #[test]
    fn requests_need_two_pixels_a_side() {
        let vp = Viewport::default();
        assert_eq!(
            RenderRequest::new(vp, 1, 10, ColoringMode::Linear),
            Err(RenderError::InvalidRenderSize(1, 10))
        );
        assert!(RenderRequest::new(vp, 10, 0, ColoringMode::Linear).is_err());
        assert!(RenderRequest::new(vp, 2, 2, ColoringMode::Linear).is_ok());
    }

    #[test]
    fn previews_never_supersample() {
        let r = RenderRequest::new(Viewport::default(), 8, 8, ColoringMode::Smooth).unwrap();
        assert!(r.supersampled());
        assert!(!r.preview().supersampled());
        assert!(r.preview().is_quick());
        assert!(r.preview().max_iterations() <= r.max_iterations());
    }

    #[test]
    fn previews_render_at_half_size() {
        let r = RenderRequest::new(Viewport::default(), 800, 601, ColoringMode::Linear).unwrap();
        let p = r.preview();
        assert_eq!((p.width(), p.height()), (400, 300));
        assert_eq!(p.viewport(), r.viewport());
        assert_eq!(p.max_iterations(), 125);
        assert!(p.validate().is_ok());

        // Never below the two-pixel minimum.
        let tiny = RenderRequest::new(Viewport::default(), 3, 2, ColoringMode::Linear).unwrap();
        let p = tiny.preview();
        assert_eq!((p.width(), p.height()), (2, 2));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn explicit_iterations_override_the_estimate() {
        let r = RenderRequest::new(Viewport::default(), 8, 8, ColoringMode::Smooth).unwrap();
        assert_eq!(r.max_iterations(), 500);
        assert_eq!(r.with_max_iterations(42).unwrap().max_iterations(), 42);
        assert!(r.with_max_iterations(0).is_err());
    }

    #[test]
    fn deserialized_requests_are_checked() {
        let r = RenderRequest::new(Viewport::default(), 8, 8, ColoringMode::Smooth).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        let back: RenderRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        let bad = json.replace("\"width\":8", "\"width\":1");
        let bad: RenderRequest = serde_json::from_str(&bad).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn raster_lookup_is_row_major() {
        let mut raster = Raster::blank(3, 2);
        // Row 1, column 2 of a 3-wide raster is pixel 5.
        raster.bytes_mut()[5 * CHANNELS..][..3].copy_from_slice(&[1, 2, 3]);
        assert_eq!(raster.pixel(2, 1), Some(Rgb(1, 2, 3)));
        assert_eq!(raster.pixel(0, 0), Some(Rgb(0, 0, 0)));
        assert_eq!(raster.pixel(3, 0), None);
        let img = raster.into_image().unwrap();
        assert_eq!(img.get_pixel(2, 1).channels(), &[1, 2, 3]);
    }
}
