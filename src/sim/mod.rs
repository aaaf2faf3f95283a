//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed iteration counts (no tolerance loops)
//! - Caller-supplied timestep
//! - Stable iteration order (by ball ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod curve;
pub mod newton;
pub mod parametric;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, DetectionMode, ball_curve_collision, detect, reflect_velocity};
pub use curve::{Bounds, Curve, Polyline, Samples};
pub use newton::{NewtonParams, find_critical_point, find_equals, find_zero, is_usable_root};
pub use parametric::ParametricFunction;
pub use state::{Ball, Color, ContactPhase, ReflectionModel, SimulationState, color_gradient};
pub use tick::{Body, Scene, SimEvent, TickOutcome, tick};
