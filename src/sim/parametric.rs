//! Parametric functions and numeric calculus helpers
//!
//! A parametric function maps a scalar parameter `t` to a 2D point. Derived
//! functions (derivative, normal, coordinate projections) are new parametric
//! functions that capture the original by reference count, so composing them
//! is cheap and every value stays a pure function of `t`.

use std::fmt;
use std::sync::Arc;

use glam::DVec2;

use crate::consts::{DERIVATIVE_HALF_DELTA, NORMAL_HALF_DELTA};
use crate::perp_ccw;

type ParamFn = dyn Fn(f64) -> DVec2 + Send + Sync;

/// A pure function `t -> (x, y)`
#[derive(Clone)]
pub struct ParametricFunction {
    f: Arc<ParamFn>,
}

impl fmt::Debug for ParametricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParametricFunction").finish_non_exhaustive()
    }
}

impl ParametricFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> DVec2 + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Evaluate the function at `t`
    #[inline]
    pub fn eval(&self, t: f64) -> DVec2 {
        (self.f)(t)
    }

    /// Central-difference derivative: `f'(t) = (f(t+h) - f(t-h)) / 2h`
    ///
    /// The error is O(h²) for smooth functions. Smoothness is not checked.
    pub fn derivative(&self, half_delta: f64) -> Self {
        let f = Arc::clone(&self.f);
        Self::new(move |t| (f(t + half_delta) - f(t - half_delta)) / (2.0 * half_delta))
    }

    /// Derivative with the default half-delta
    pub fn default_derivative(&self) -> Self {
        self.derivative(DERIVATIVE_HALF_DELTA)
    }

    /// Apply `derivative` `n` times; `n = 0` returns the function unchanged.
    ///
    /// Evaluation cost is 2^n calls of the base function and rounding error
    /// grows with each order, so keep `n` small and `half_delta` coarse.
    pub fn nth_derivative(&self, n: u8, half_delta: f64) -> Self {
        (0..n).fold(self.clone(), |f, _| f.derivative(half_delta))
    }

    /// Counter-clockwise perpendicular of the tangent: `t -> (-f'(t).y, f'(t).x)`
    ///
    /// Not normalized; its length is the local speed of the parametrization.
    pub fn normal(&self, half_delta: f64) -> Self {
        let derivative = self.derivative(half_delta);
        Self::new(move |t| perp_ccw(derivative.eval(t)))
    }

    /// Normal with the default (coarser) half-delta
    pub fn default_normal(&self) -> Self {
        self.normal(NORMAL_HALF_DELTA)
    }

    /// Scalar projection `t -> f(t).x`
    pub fn x_component(&self) -> impl Fn(f64) -> f64 + Send + Sync + use<> {
        let f = Arc::clone(&self.f);
        move |t| f(t).x
    }

    /// Scalar projection `t -> f(t).y`
    pub fn y_component(&self) -> impl Fn(f64) -> f64 + Send + Sync + use<> {
        let f = Arc::clone(&self.f);
        move |t| f(t).y
    }

    // === Stock shapes ===

    /// Straight segment from `from` (t = 0) to `to` (t = 1)
    pub fn line(from: DVec2, to: DVec2) -> Self {
        Self::new(move |t| from + (to - from) * t)
    }

    /// Horizontal line `t -> (t, y)`; the parameter is the x coordinate
    pub fn horizontal_line(y: f64) -> Self {
        Self::new(move |t| DVec2::new(t, y))
    }

    /// Circle `t -> center + radius * (cos t, sin t)`
    pub fn circle(center: DVec2, radius: f64) -> Self {
        Self::new(move |t| center + radius * DVec2::new(t.cos(), t.sin()))
    }

    /// Ellipse in screen coordinates (y grows downward), angle measured
    /// counter-clockwise as seen on screen: `(rx cos t, -ry sin t)`
    pub fn ellipse_arc(center: DVec2, radii: DVec2) -> Self {
        Self::new(move |t| center + DVec2::new(radii.x * t.cos(), -radii.y * t.sin()))
    }

    /// Parabola `t -> (vertex.x + t, vertex.y + curvature * t²)`
    pub fn parabola(vertex: DVec2, curvature: f64) -> Self {
        Self::new(move |t| DVec2::new(vertex.x + t, vertex.y + curvature * t * t))
    }
}
