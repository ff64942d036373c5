// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes a rectangle on the
//! complex plane, and the PlaneMapper, which relates that rectangle
//! to an integral plane of pixels with an origin at 0,0 in the upper
//! left hand corner.
//!
//! Viewports are values.  Navigation (zooming, panning, dragging,
//! jumping to a coordinate) never changes a viewport in place; it
//! produces a new one, and every constructor checks that the result
//! is still a proper rectangle.

use num::Complex;
use serde::{Deserialize, Serialize};

use crate::errors::RenderError;

/// The default zoom step of one mouse-wheel notch.  Less than one
/// zooms in.
pub const ZOOM_STEP: f64 = 0.9;

/// A rectangle on the complex plane, treating the real part as the
/// x-component and the imaginary part as the y-component.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewport")]
pub struct Viewport {
    min_re: f64,
    max_re: f64,
    min_im: f64,
    max_im: f64,
}

// Deserialization goes through the same checks as Viewport::new.
#[derive(Deserialize)]
struct RawViewport {
    min_re: f64,
    max_re: f64,
    min_im: f64,
    max_im: f64,
}

impl std::convert::TryFrom<RawViewport> for Viewport {
    type Error = RenderError;

    fn try_from(raw: RawViewport) -> Result<Self, Self::Error> {
        Viewport::new(raw.min_re, raw.max_re, raw.min_im, raw.max_im)
    }
}

impl Default for Viewport {
    /// The whole set: real axis from -2 to 1, imaginary from -1.2 to 1.2.
    fn default() -> Self {
        Viewport {
            min_re: -2.0,
            max_re: 1.0,
            min_im: -1.2,
            max_im: 1.2,
        }
    }
}

impl Viewport {
    /// Constructor.  Fails unless `min_re < max_re` and
    /// `min_im < max_im`, with all four bounds finite.
    pub fn new(min_re: f64, max_re: f64, min_im: f64, max_im: f64) -> Result<Self, RenderError> {
        let finite = min_re.is_finite() && max_re.is_finite() && min_im.is_finite() && max_im.is_finite();
        if !finite || !(min_re < max_re) || !(min_im < max_im) {
            return Err(RenderError::InvalidViewport {
                min_re,
                max_re,
                min_im,
                max_im,
            });
        }
        Ok(Viewport {
            min_re,
            max_re,
            min_im,
            max_im,
        })
    }

    /// Build a viewport from its left-lower and right-upper corners.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Result<Self, RenderError> {
        Viewport::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// A viewport of the given extents around a center point.  This is
    /// the "go to coordinate" operation.
    pub fn centered(center: Complex<f64>, re_range: f64, im_range: f64) -> Result<Self, RenderError> {
        if !(re_range > 0.0) || !(im_range > 0.0) {
            return Err(RenderError::InvalidNavigation(format!(
                "ranges must be positive, got {} x {}",
                re_range, im_range
            )));
        }
        Viewport::new(
            center.re - re_range / 2.0,
            center.re + re_range / 2.0,
            center.im - im_range / 2.0,
            center.im + im_range / 2.0,
        )
    }

    /// Left edge.
    pub fn min_re(&self) -> f64 {
        self.min_re
    }

    /// Right edge.
    pub fn max_re(&self) -> f64 {
        self.max_re
    }

    /// Bottom edge.
    pub fn min_im(&self) -> f64 {
        self.min_im
    }

    /// Top edge.
    pub fn max_im(&self) -> f64 {
        self.max_im
    }

    /// Width of the viewport along the real axis.  Used both as the
    /// zoom level shown to users and as the input to the iteration
    /// depth estimate.
    pub fn scale(&self) -> f64 {
        self.max_re - self.min_re
    }

    /// Height of the viewport along the imaginary axis.
    pub fn im_range(&self) -> f64 {
        self.max_im - self.min_im
    }

    /// The center of the rectangle.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            (self.min_re + self.max_re) / 2.0,
            (self.min_im + self.max_im) / 2.0,
        )
    }

    /// Scale both extents by `factor` about the center.  A factor
    /// below one zooms in, above one zooms out.
    pub fn zoom(&self, factor: f64) -> Result<Self, RenderError> {
        if !(factor > 0.0) || !factor.is_finite() {
            return Err(RenderError::InvalidNavigation(format!(
                "zoom factor must be positive and finite, got {}",
                factor
            )));
        }
        Viewport::centered(self.center(), self.scale() * factor, self.im_range() * factor)
    }

    /// Translate by a delta measured on the complex plane.
    pub fn pan(&self, dre: f64, dim: f64) -> Result<Self, RenderError> {
        Viewport::new(
            self.min_re + dre,
            self.max_re + dre,
            self.min_im + dim,
            self.max_im + dim,
        )
    }

    /// Translate by a mouse drag of `(dx, dy)` pixels on a surface of
    /// `width` by `height` pixels.  Dragging right moves the view left,
    /// dragging down moves it up, so the plane follows the pointer.
    pub fn drag(&self, dx: f64, dy: f64, width: usize, height: usize) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidRenderSize(width, height));
        }
        let dre = -dx * (self.scale() / width as f64);
        let dim = dy * (self.im_range() / height as f64);
        self.pan(dre, dim)
    }
}

/// Maps pixels of a `width` by `height` raster onto a viewport.  Row
/// zero is the top of the image, the maximum imaginary part; the first
/// and last pixel of each axis sit exactly on the viewport's edges.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    origin: Complex<f64>,
    // Distance on the complex plane between neighbouring pixels.
    step: (f64, f64),
}

impl PlaneMapper {
    /// The caller guarantees both sides are at least 2; the request
    /// validation does that before any mapper is built.
    pub fn new(viewport: &Viewport, width: usize, height: usize) -> PlaneMapper {
        debug_assert!(width >= 2 && height >= 2);
        PlaneMapper {
            origin: Complex::new(viewport.min_re, viewport.max_im),
            step: (
                viewport.scale() / (width - 1) as f64,
                viewport.im_range() / (height - 1) as f64,
            ),
        }
    }

    /// Given a (possibly fractional) pixel position, return the
    /// equivalent point on the complex plane.  Fractional positions
    /// are what supersampling feeds in.
    #[inline]
    pub fn pixel_to_point(&self, x: f64, y: f64) -> Complex<f64> {
        Complex::new(
            self.origin.re + x * self.step.0,
            self.origin.im - y * self.step.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        assert!(Viewport::new(1.0, -1.0, -1.0, 1.0).is_err());
        assert!(Viewport::new(-1.0, 1.0, 1.0, 1.0).is_err());
        assert!(Viewport::new(std::f64::NAN, 1.0, -1.0, 1.0).is_err());
        assert!(Viewport::new(-1.0, std::f64::INFINITY, -1.0, 1.0).is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        let vp = Viewport::new(-1.0, 1.0, -1.0, 1.0).unwrap();
        assert_eq!(vp.scale(), 2.0);
        assert_eq!(vp.center(), Complex::new(0.0, 0.0));
    }

    #[test]
    fn corners_of_the_raster_land_on_the_edges() {
        let vp = Viewport::default();
        let pm = PlaneMapper::new(&vp, 4, 3);
        assert_eq!(pm.pixel_to_point(0.0, 0.0), Complex::new(-2.0, 1.2));
        let p = pm.pixel_to_point(3.0, 2.0);
        assert!(close(p.re, 1.0));
        assert!(close(p.im, -1.2));
        let p = pm.pixel_to_point(1.0, 1.0);
        assert!(close(p.re, -1.0));
        assert!(close(p.im, 0.0));
    }

    #[test]
    fn zoom_keeps_the_center() {
        let vp = Viewport::default();
        let zoomed = vp.zoom(ZOOM_STEP).unwrap();
        assert!(close(zoomed.center().re, vp.center().re));
        assert!(close(zoomed.center().im, vp.center().im));
        assert!(close(zoomed.scale(), 3.0 * 0.9));
        assert!(close(zoomed.im_range(), 2.4 * 0.9));
        assert!(vp.zoom(0.0).is_err());
        assert!(vp.zoom(-2.0).is_err());
        assert!(vp.zoom(std::f64::NAN).is_err());
    }

    #[test]
    fn drag_follows_the_pointer() {
        let vp = Viewport::default();
        // 100 pixels right on a 300 pixel wide surface is a third of
        // the width, one unit of the real axis.
        let moved = vp.drag(100.0, 0.0, 300, 240).unwrap();
        assert!(close(moved.min_re(), -3.0));
        assert!(close(moved.max_re(), 0.0));
        let moved = vp.drag(0.0, 24.0, 300, 240).unwrap();
        assert!(close(moved.max_im(), 1.44));
        assert!(vp.drag(1.0, 1.0, 0, 10).is_err());
    }

    #[test]
    fn goto_builds_around_the_center() {
        let vp = Viewport::centered(Complex::new(-0.75, 0.1), 0.5, 0.4).unwrap();
        assert!(close(vp.min_re(), -1.0));
        assert!(close(vp.max_im(), 0.3));
        assert!(Viewport::centered(Complex::new(0.0, 0.0), 0.0, 1.0).is_err());
    }

    #[test]
    fn deserializing_rejects_inverted_viewports() {
        let json = r#"{"min_re":1.0,"max_re":-1.0,"min_im":-1.0,"max_im":1.0}"#;
        assert!(serde_json::from_str::<Viewport>(json).is_err());
        let json = r#"{"min_re":-1.0,"max_re":1.0,"min_im":-1.0,"max_im":1.0}"#;
        let vp: Viewport = serde_json::from_str(json).unwrap();
        assert_eq!(vp, Viewport::new(-1.0, 1.0, -1.0, 1.0).unwrap());
    }
}
