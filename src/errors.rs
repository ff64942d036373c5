// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Failures the engine reports before it starts rendering.  Nothing
//! inside the pixel pipeline is allowed to fail; these are all
//! rejections of the caller's input.

use failure::Fail;

/// Why a viewport or a render request was refused.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum RenderError {
    /// The rectangle is empty, inverted, or has a non-finite corner.
    #[fail(
        display = "invalid viewport: re [{}, {}], im [{}, {}]",
        min_re, max_re, min_im, max_im
    )]
    InvalidViewport {
        /// Left edge of the rejected rectangle.
        min_re: f64,
        /// Right edge of the rejected rectangle.
        max_re: f64,
        /// Bottom edge of the rejected rectangle.
        min_im: f64,
        /// Top edge of the rejected rectangle.
        max_im: f64,
    },

    /// Fewer than two pixels along one axis; the step size would be a
    /// division by zero.
    #[fail(display = "invalid render size {}x{}: both sides must be at least 2", _0, _1)]
    InvalidRenderSize(usize, usize),

    /// An explicit iteration cap of zero.
    #[fail(display = "invalid iteration count {}: must be at least 1", _0)]
    InvalidIterations(u32),

    /// A navigation step that cannot produce a valid viewport, e.g. a
    /// zoom factor that is zero, negative, or NaN.
    #[fail(display = "invalid navigation parameter: {}", _0)]
    InvalidNavigation(String),
}
