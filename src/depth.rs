// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! How deep to iterate.  The deeper we zoom, the closer neighbouring
//! pixels are on the plane, and the more iterations it takes to tell
//! them apart; a fixed cap either wastes time on the overview or
//! washes out the detail.

use num::clamp;

use crate::planes::Viewport;

/// Iteration cap for the widest views.
pub const MIN_DEPTH: u32 = 500;
/// Iteration cap for the deepest views.
pub const MAX_DEPTH: u32 = 10_000;
/// Floor for preview renders.
pub const MIN_QUICK_DEPTH: u32 = 100;

/// Estimate the iteration cap for a viewport.  Grows with the log of
/// the zoom, measured against the real-axis width of 3 of the default
/// view.  Quick previews get a quarter of that, but never fewer than
/// `MIN_QUICK_DEPTH`.
pub fn estimate_max_iterations(viewport: &Viewport, quick: bool) -> u32 {
    let raw = 500.0 + 10_000.0 * (3.0 / viewport.scale()).log10();
    let base = clamp(raw, MIN_DEPTH as f64, MAX_DEPTH as f64) as u32;
    if quick {
        clamp((base as f64 * 0.25) as u32, MIN_QUICK_DEPTH, base)
    } else {
        base
    }
}
