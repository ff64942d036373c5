#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring `z` and adding `c`, starting from
//! zero, never sends `z` off to infinity.  Points outside the set
//! escape, some quickly and some only after thousands of steps; that
//! "velocity" is what we color.
//!
//! A caller describes what it wants with a `Viewport` (the rectangle
//! of the plane to look at) and a `RenderRequest` (how many pixels,
//! which coloring, preview or full quality), and gets back a `Raster`
//! of RGB pixels.  The work is spread over a pool of threads that
//! exists only for the duration of the call.
//!
//! ```no_run
//! use mandel::{render, ColoringMode, RenderRequest, Viewport};
//!
//! let request = RenderRequest::new(Viewport::default(), 800, 640, ColoringMode::Smooth)?;
//! let preview = render(&request.preview())?;
//! let full = render(&request)?;
//! # Ok::<(), mandel::RenderError>(())
//! ```

pub mod coloring;
pub mod depth;
pub mod errors;
pub mod escape;
pub mod planes;
pub mod request;
pub mod tiles;

pub use crate::coloring::{color, ColoringMode, Rgb};
pub use crate::depth::estimate_max_iterations;
pub use crate::errors::RenderError;
pub use crate::planes::{Viewport, ZOOM_STEP};
pub use crate::request::{Raster, RenderRequest};
pub use crate::tiles::TileRenderer;

use log::debug;
use std::time::Instant;

/// Render a request on `max(cores, 4)` threads.  Blocks until every
/// pixel is done.  Fails only on a malformed request, before any work
/// starts.
pub fn render(request: &RenderRequest) -> Result<Raster, RenderError> {
    render_with_threads(request, tiles::default_threads())
}

/// As `render`, with an explicit number of worker threads.  The
/// output is identical for every thread count.
pub fn render_with_threads(request: &RenderRequest, threads: usize) -> Result<Raster, RenderError> {
    request.validate()?;
    let start = Instant::now();
    let raster = TileRenderer::new(request).render(threads);
    debug!(
        "{}x{} {} render done in {:?}",
        request.width(),
        request.height(),
        request.mode(),
        start.elapsed()
    );
    Ok(raster)
}
