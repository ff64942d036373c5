// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning escape times into colors.  Each mode is a pure function of
//! the iteration count, the cap, and one auxiliary value: the final
//! modulus of `z` for the smooth modes, the boundary distance for
//! `Distance`.  Every mode paints points that reached the cap black.

use num::clamp;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::escape::PixelSample;

/// One pixel, red, green, blue.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Interior points and anything we can't color.
pub const BLACK: Rgb = Rgb(0, 0, 0);

/// Iterations per trip around the color wheel in `Rainbow` mode.
pub const RAINBOW_PERIOD: f64 = 64.0;

/// The 16-entry palette cycled by `ColorMap`, running from dark brown
/// through deep blue and pale yellow to orange.
pub const PALETTE: [Rgb; 16] = [
    Rgb(66, 30, 15),
    Rgb(25, 7, 26),
    Rgb(9, 1, 47),
    Rgb(4, 4, 73),
    Rgb(0, 7, 100),
    Rgb(12, 44, 138),
    Rgb(24, 82, 177),
    Rgb(57, 125, 209),
    Rgb(134, 181, 229),
    Rgb(211, 236, 248),
    Rgb(241, 233, 191),
    Rgb(248, 201, 95),
    Rgb(255, 170, 0),
    Rgb(204, 128, 0),
    Rgb(153, 87, 0),
    Rgb(106, 52, 3),
];

/// The available coloring algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColoringMode {
    /// Magenta ramp proportional to the escape time.
    Linear,
    /// Three offset polynomial bumps; blue for fast escapes, red late.
    Sinusoidal,
    /// Continuous (fractional) escape count, no banding.
    Smooth,
    /// Cycles the 16-entry palette.
    ColorMap,
    /// Grayscale by estimated distance to the boundary.
    Distance,
    /// Hue wheel over the continuous escape count.
    Rainbow,
}

impl ColoringMode {
    /// Every mode, in the order the viewer's number keys select them.
    pub const ALL: [ColoringMode; 6] = [
        ColoringMode::Linear,
        ColoringMode::Sinusoidal,
        ColoringMode::Smooth,
        ColoringMode::ColorMap,
        ColoringMode::Distance,
        ColoringMode::Rainbow,
    ];

    /// Does this mode want the distance estimate as its auxiliary
    /// value?  That costs a derivative per iteration, so the renderer
    /// only pays for it when asked.
    pub fn needs_distance(self) -> bool {
        self == ColoringMode::Distance
    }

    /// Lower-case name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ColoringMode::Linear => "linear",
            ColoringMode::Sinusoidal => "sinusoidal",
            ColoringMode::Smooth => "smooth",
            ColoringMode::ColorMap => "colormap",
            ColoringMode::Distance => "distance",
            ColoringMode::Rainbow => "rainbow",
        }
    }
}

impl Default for ColoringMode {
    fn default() -> Self {
        ColoringMode::Linear
    }
}

impl fmt::Display for ColoringMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        ColoringMode::ALL
            .iter()
            .find(|m| m.name() == lower)
            .cloned()
            .ok_or_else(|| format!("unknown coloring mode '{}'", s))
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    clamp(v, 0.0, 255.0) as u8
}

fn linear(iter: u32, max_iter: u32) -> Rgb {
    let v = (255 * u64::from(iter) / u64::from(max_iter)) as u8;
    Rgb(v, 0, v)
}

fn sinusoidal(iter: u32, max_iter: u32) -> Rgb {
    let t = f64::from(iter) / f64::from(max_iter);
    let u = 1.0 - t;
    Rgb(
        channel(9.0 * u * t * t * t * 255.0),
        channel(15.0 * u * u * t * t * 255.0),
        channel(8.5 * u * u * u * t * 255.0),
    )
}

// The fractional escape count.  Without a modulus above one the
// log-log correction is undefined and we fall back to the integer.
fn continuous(iter: u32, modulus: f64) -> f64 {
    if modulus > 1.0 && modulus.ln() > 0.0 {
        f64::from(iter) + 1.0 - modulus.ln().ln() / 2.0_f64.ln()
    } else {
        f64::from(iter)
    }
}

fn smooth(iter: u32, max_iter: u32, modulus: f64) -> Rgb {
    let t = continuous(iter, modulus) / f64::from(max_iter);
    Rgb(
        channel(255.0 * t),
        channel(255.0 * (1.0 - t)),
        channel(255.0 * (0.5 + 0.5 * (3.0 * t * PI).cos())),
    )
}

fn color_map(iter: u32, max_iter: u32) -> Rgb {
    if iter > 0 && iter < max_iter {
        PALETTE[(iter % 16) as usize]
    } else {
        BLACK
    }
}

fn distance(d: f64) -> Rgb {
    let normalized = if d.is_nan() { 0.0 } else { clamp(d * 0.1, 0.0, 1.0) };
    let shade = (255.0 * (1.0 - normalized)) as u8;
    Rgb(shade, shade, shade)
}

// Hue from the continuous escape count, full saturation and value.
fn rainbow(iter: u32, modulus: f64) -> Rgb {
    let mu = continuous(iter, modulus).max(0.0);
    let hue = (mu / RAINBOW_PERIOD).fract() * 6.0;
    let sector = hue.floor();
    let f = hue - sector;
    let rise = channel(255.0 * f);
    let fall = channel(255.0 * (1.0 - f));
    match sector as u8 {
        0 => Rgb(255, rise, 0),
        1 => Rgb(fall, 255, 0),
        2 => Rgb(0, 255, rise),
        3 => Rgb(0, fall, 255),
        4 => Rgb(rise, 0, 255),
        _ => Rgb(255, 0, fall),
    }
}

/// Color a point that took `iter` of `max_iter` iterations.  `aux` is
/// the final modulus of `z`, or the boundary distance in `Distance`
/// mode.  Points that reached the cap are black in every mode.
pub fn color(iter: u32, max_iter: u32, aux: f64, mode: ColoringMode) -> Rgb {
    if iter >= max_iter {
        return BLACK;
    }
    match mode {
        ColoringMode::Linear => linear(iter, max_iter),
        ColoringMode::Sinusoidal => sinusoidal(iter, max_iter),
        ColoringMode::Smooth => smooth(iter, max_iter, aux),
        ColoringMode::ColorMap => color_map(iter, max_iter),
        ColoringMode::Distance => distance(aux),
        ColoringMode::Rainbow => rainbow(iter, aux),
    }
}

/// Color a sample, picking the auxiliary value the mode wants.
pub fn color_sample(sample: &PixelSample, mode: ColoringMode) -> Rgb {
    let aux = if mode.needs_distance() {
        sample.distance
    } else {
        sample.final_modulus
    };
    color(sample.iterations, sample.max_iterations, aux, mode)
}
