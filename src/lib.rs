//! Curve Bounce - a ball bouncing against parametric curves
//!
//! Core modules:
//! - `sim`: Deterministic simulation (calculus helpers, root finding, curves,
//!   collision detection, bounce integration)
//! - `settings`: Data-driven configuration (JSON)
//! - `error`: Configuration/validation errors
//!
//! Rendering, input and windowing live outside this crate. A host supplies the
//! ball and curve geometry each tick and reads back position and velocity.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{CurveError, CurveResult};
pub use settings::SimConfig;

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Tick rate of the reference timer (Hz)
    pub const TICK_HZ: f64 = 24.0;
    /// One tick, in the time units velocities are expressed in
    pub const SIM_DT: f64 = 1.0;

    /// Default half-width of the central difference used by `derivative`
    pub const DERIVATIVE_HALF_DELTA: f64 = 0.005;
    /// Default half-width used by `normal` (coarser, smoother normals)
    pub const NORMAL_HALF_DELTA: f64 = 0.05;
    /// Default Newton iteration count (fixed, no tolerance stopping rule)
    pub const NEWTON_STEPS: u8 = 8;

    /// Default curve sampling step
    pub const CURVE_STEP: f64 = 0.01;
    /// Default stroke thickness of a curve for geometric collision
    pub const STROKE_THICKNESS: f64 = 1.0;

    /// Ball defaults
    pub const BALL_RADIUS: f64 = 10.0;

    /// Below this length a direction vector is treated as zero
    pub const EPSILON: f64 = 1e-9;
}

/// Mean of a set of points, `None` when empty
#[inline]
pub fn mean_point(points: &[DVec2]) -> Option<DVec2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(DVec2::ZERO, |acc, p| acc + *p);
    Some(sum / points.len() as f64)
}

/// Counter-clockwise perpendicular of a vector: (x, y) -> (-y, x)
#[inline]
pub fn perp_ccw(v: DVec2) -> DVec2 {
    DVec2::new(-v.y, v.x)
}
