//! Ball and per-ball simulation state
//!
//! The host owns every `Ball` and `SimulationState`; the integrator only
//! mutates them. Each ball carries its own state so several balls never share
//! mutable data.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::BALL_RADIUS;

/// Contact phase used to debounce collision response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactPhase {
    /// No contact; gravity applies
    #[default]
    Free,
    /// Overlapping a curve, bounce already processed
    Contact,
}

/// How velocity is redirected when contact begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionModel {
    /// Point velocity from the mean contact point toward the ball centre,
    /// keeping its speed
    #[default]
    CenterOffset,
    /// Mirror velocity about the detector's surface normal
    SurfaceNormal,
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

/// `count` colours stepping evenly from `start` to `end` (inclusive)
pub fn color_gradient(start: Color, end: Color, count: usize) -> Vec<Color> {
    let max = count.saturating_sub(1);
    (0..count)
        .map(|i| {
            if max == 0 {
                start
            } else {
                start.lerp(end, i as f64 / max as f64)
            }
        })
        .collect()
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub center: DVec2,
    pub radius: f64,
    /// Copy of `SimulationState::velocity`, refreshed after every tick.
    /// `tick` integrates the state's velocity, so change velocity through
    /// the state (or `Body::set_velocity`), not here.
    pub velocity: DVec2,
    pub color: Color,
}

impl Ball {
    pub fn new(id: u32, center: DVec2, radius: f64) -> Self {
        Self {
            id,
            center,
            radius,
            velocity: DVec2::ZERO,
            color: Color::RED,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(0, DVec2::ZERO, BALL_RADIUS)
    }
}

/// Mutable physics state of one ball across ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Constant acceleration per unit time
    pub gravity: DVec2,
    pub velocity: DVec2,
    /// Surface reaction against gravity while in contact.
    /// Reported to the host, not integrated; zero when free.
    pub normal_force: DVec2,
    pub phase: ContactPhase,
    pub reflection: ReflectionModel,
    /// Ticks advanced so far
    pub time_ticks: u64,
}

impl SimulationState {
    pub fn new(gravity: DVec2, velocity: DVec2) -> Self {
        Self {
            gravity,
            velocity,
            normal_force: DVec2::ZERO,
            phase: ContactPhase::Free,
            reflection: ReflectionModel::default(),
            time_ticks: 0,
        }
    }

    /// State whose velocity starts at the ball's
    pub fn for_ball(ball: &Ball, gravity: DVec2) -> Self {
        Self::new(gravity, ball.velocity)
    }

    pub fn with_reflection(mut self, reflection: ReflectionModel) -> Self {
        self.reflection = reflection;
        self
    }

    #[inline]
    pub fn is_in_contact(&self) -> bool {
        self.phase == ContactPhase::Contact
    }
}
