//! Newton's-method root finding over scalar functions
//!
//! The slope is approximated by central differences and the iteration count
//! is fixed: there is no convergence tolerance. Every call therefore costs the
//! same number of function evaluations, which keeps a simulation tick bounded.
//! Divergence is silent; callers validate the result with [`is_usable_root`].

use serde::{Deserialize, Serialize};

use crate::consts::{DERIVATIVE_HALF_DELTA, NEWTON_STEPS};

/// Tuning for the Newton iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonParams {
    /// Half-width of the central difference used for the slope
    pub half_delta: f64,
    /// Number of iterations applied (8 is enough for smooth curves)
    pub steps: u8,
}

impl Default for NewtonParams {
    fn default() -> Self {
        Self {
            half_delta: DERIVATIVE_HALF_DELTA,
            steps: NEWTON_STEPS,
        }
    }
}

/// Central-difference inverse slope `2h / (f(x+h) - f(x-h))`
#[inline]
fn rate_reciprocal<F>(f: &F, x: f64, half_delta: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    2.0 * half_delta / (f(x + half_delta) - f(x - half_delta))
}

/// Apply `steps` Newton iterations to `f` starting at `guess`.
///
/// Returns the final estimate and the inverse slope evaluated there, which
/// callers can reuse as the local tangent rate. A flat function yields an
/// infinite reciprocal and the estimate becomes NaN/Inf.
pub fn find_zero<F>(guess: f64, f: F, half_delta: f64, steps: u8) -> (f64, f64)
where
    F: Fn(f64) -> f64,
{
    let mut guess = guess;
    for _ in 0..steps {
        guess -= f(guess) * rate_reciprocal(&f, guess, half_delta);
    }
    (guess, rate_reciprocal(&f, guess, half_delta))
}

/// Solve `f(t) = target` by finding a zero of `t -> f(t) - target`
pub fn find_equals<F>(guess: f64, target: f64, f: F, half_delta: f64, steps: u8) -> f64
where
    F: Fn(f64) -> f64,
{
    find_zero(guess, |t| f(t) - target, half_delta, steps).0
}

/// Find a stationary point of `f` (a zero of its central-difference derivative)
pub fn find_critical_point<F>(guess: f64, f: F, params: NewtonParams) -> f64
where
    F: Fn(f64) -> f64,
{
    let h = params.half_delta;
    let derivative = |t: f64| (f(t + h) - f(t - h)) / (2.0 * h);
    find_zero(guess, derivative, h, params.steps).0
}

/// A Newton result is usable when it is finite and lies inside `[min_t, max_t]`
#[inline]
pub fn is_usable_root(t: f64, min_t: f64, max_t: f64) -> bool {
    t.is_finite() && t >= min_t && t <= max_t
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_zero_sqrt_two() {
        let (root, rate) = find_zero(1.0, |x| x * x - 2.0, 0.005, 8);
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-9);
        // Slope of x² - 2 at sqrt(2) is 2 sqrt(2)
        assert!((rate - 1.0 / (2.0 * 2.0_f64.sqrt())).abs() < 1e-6);
    }

    #[test]
    fn test_zero_steps_returns_guess() {
        let (root, _) = find_zero(3.0, |x| x - 1.0, 0.005, 0);
        assert_eq!(root, 3.0);
    }

    #[test]
    fn test_flat_function_is_not_usable() {
        let (root, rate) = find_zero(0.5, |_| 1.0, 0.005, 8);
        assert!(rate.is_infinite());
        assert!(!is_usable_root(root, 0.0, 1.0));
    }

    #[test]
    fn test_find_equals() {
        let t = find_equals(0.5, 0.25, |t: f64| t.sin(), 0.005, 8);
        assert!((t.sin() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_find_critical_point() {
        // (t - 1.5)² + 3 has its minimum at 1.5
        let t = find_critical_point(0.0, |t: f64| (t - 1.5).powi(2) + 3.0, NewtonParams::default());
        assert!((t - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_is_usable_root() {
        assert!(is_usable_root(0.5, 0.0, 1.0));
        assert!(!is_usable_root(1.5, 0.0, 1.0));
        assert!(!is_usable_root(f64::NAN, 0.0, 1.0));
    }

    proptest! {
        #[test]
        fn prop_converges_near_known_root(root in -100.0f64..100.0, offset in -0.5f64..0.5) {
            // Smooth, monotonic cubic with a single root at `root`
            let f = |x: f64| (x - root) + 0.1 * (x - root).powi(3);
            let (found, _) = find_zero(root + offset, f, 0.005, 8);
            prop_assert!((found - root).abs() < 1e-4);
        }

        #[test]
        fn prop_sine_root_near_pi(offset in -0.3f64..0.3) {
            let (found, _) = find_zero(std::f64::consts::PI + offset, |x: f64| x.sin(), 0.005, 8);
            prop_assert!((found - std::f64::consts::PI).abs() < 1e-4);
        }
    }
}
