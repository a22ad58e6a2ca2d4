//! Angle utilities used by the rigid registration stage.

use std::f64::consts::PI;

/// Wraps an angle into the range (−π, π].
#[inline]
pub fn wrap_pi(angle: f64) -> f64 {
    let mut a = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wrap_pi_basic() {
        assert!(approx_eq(wrap_pi(0.5), 0.5));
        assert!(approx_eq(wrap_pi(PI), PI));
        assert!(approx_eq(wrap_pi(-PI), PI));
        assert!(approx_eq(wrap_pi(3.0 * PI), PI));
        assert!(approx_eq(wrap_pi(2.0 * PI + 0.25), 0.25));
    }
}
