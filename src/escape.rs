// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Takes a point `c` on the complex plane
//! and repeatedly applies `z = z * z + c`, starting from zero,
//! measuring how quickly `z` leaves the circle of radius 2.  Points
//! that never leave within the iteration cap are taken to be in the
//! set.

use num::Complex;

/// The square of the escape radius.
pub const BAILOUT: f64 = 4.0;

/// What iterating a single point produced.  Consumed right away by the
/// coloring function.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelSample {
    /// Iterations performed; equal to `max_iterations` for points
    /// that never escaped.
    pub iterations: u32,
    /// The cap the point was iterated against.
    pub max_iterations: u32,
    /// `|z|` when the loop stopped.
    pub final_modulus: f64,
    /// Estimated distance to the boundary of the set; zero unless the
    /// distance variant was run.
    pub distance: f64,
}

impl PixelSample {
    /// A point known to be inside the set without iterating it.
    pub fn interior(max_iterations: u32) -> Self {
        PixelSample {
            iterations: max_iterations,
            max_iterations,
            final_modulus: 0.0,
            distance: 0.0,
        }
    }

    /// Did the point stay bounded for the whole run?
    pub fn is_interior(&self) -> bool {
        self.iterations >= self.max_iterations
    }
}

/// Closed-form test for the two biggest components of the set: the
/// main cardioid and the period-2 bulb centered on -1.  Points inside
/// either never escape, so there is no point in iterating them.
#[inline]
pub fn is_interior(c: Complex<f64>) -> bool {
    let x = c.re - 0.25;
    let q = x * x + c.im * c.im;
    if q * (q + x) < 0.25 * c.im * c.im {
        return true;
    }
    let x = c.re + 1.0;
    x * x + c.im * c.im < 0.0625
}

/// Iterate `c` until it escapes or `limit` iterations have passed.
pub fn escape_time(c: Complex<f64>, limit: u32) -> PixelSample {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    let mut i = 0;
    while i < limit && z.norm_sqr() <= BAILOUT {
        z = z * z + c;
        i += 1;
    }
    PixelSample {
        iterations: i,
        max_iterations: limit,
        final_modulus: z.norm(),
        distance: 0.0,
    }
}

/// As `escape_time`, but also carries the derivative `dz/dc` along
/// the orbit and turns it into an exterior distance estimate,
/// `|z| ln|z| / |dz|`.  Where that is undefined (`|z| <= 1`, or a
/// vanishing derivative) the distance is zero.
pub fn escape_distance(c: Complex<f64>, limit: u32) -> PixelSample {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    let mut dz: Complex<f64> = Complex { re: 1.0, im: 0.0 };
    let mut i = 0;
    while i < limit && z.norm_sqr() <= BAILOUT {
        dz = z * dz * 2.0 + 1.0;
        z = z * z + c;
        i += 1;
    }
    let modulus = z.norm();
    let derivative = dz.norm();
    let distance = if derivative == 0.0 || modulus <= 1.0 {
        0.0
    } else {
        modulus * modulus.ln() / derivative
    };
    PixelSample {
        iterations: i,
        max_iterations: limit,
        final_modulus: modulus,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        let s = escape_time(Complex::new(0.0, 0.0), 500);
        assert_eq!(s.iterations, 500);
        assert!(s.is_interior());
        assert_eq!(s.final_modulus, 0.0);
    }

    #[test]
    fn far_points_escape_on_the_first_step() {
        // z1 = c, |c|^2 = 8 > 4.
        let s = escape_time(Complex::new(2.0, 2.0), 500);
        assert_eq!(s.iterations, 1);
        assert!((s.final_modulus - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn two_sits_on_the_boundary() {
        // 2 -> 6: z1 = 2 is exactly on the circle and does not count
        // as escaped, z2 = 6 does.
        let s = escape_time(Complex::new(2.0, 0.0), 100);
        assert_eq!(s.iterations, 2);
        assert_eq!(s.final_modulus, 6.0);
    }

    #[test]
    fn fast_reject_knows_the_main_components() {
        assert!(is_interior(Complex::new(0.0, 0.0)));
        assert!(is_interior(Complex::new(-1.0, 0.0)));
        assert!(is_interior(Complex::new(-0.5, 0.3)));
        assert!(!is_interior(Complex::new(2.0, 2.0)));
        assert!(!is_interior(Complex::new(0.3, 0.0)));
        assert!(!is_interior(Complex::new(-1.3, 0.0)));
    }

    #[test]
    fn distance_matches_escape_time() {
        let c = Complex::new(0.5, 0.5);
        let plain = escape_time(c, 1000);
        let dist = escape_distance(c, 1000);
        assert_eq!(plain.iterations, dist.iterations);
        assert_eq!(plain.final_modulus, dist.final_modulus);
        assert!(dist.distance > 0.0);
    }

    #[test]
    fn distance_of_interior_points_is_zero() {
        let s = escape_distance(Complex::new(-0.1, 0.1), 1000);
        assert!(s.is_interior());
        assert_eq!(s.distance, 0.0);
    }

    #[test]
    fn distance_shrinks_towards_the_boundary() {
        // Walking along the real axis towards the cusp at 0.25.
        let far = escape_distance(Complex::new(1.0, 0.0), 1000).distance;
        let near = escape_distance(Complex::new(0.26, 0.0), 1000).distance;
        assert!(near < far, "near {} far {}", near, far);
    }
}
