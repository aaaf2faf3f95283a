//! Simulation settings
//!
//! Plain data, loaded from and saved to JSON. `build_scene` turns a validated
//! config into curves and balls ready to tick.

use std::f64::consts::{PI, TAU};
use std::path::Path;
use std::time::Duration;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{BALL_RADIUS, CURVE_STEP, TICK_HZ};
use crate::error::{CurveError, CurveResult, ensure_finite};
use crate::sim::{
    Ball, Color, Curve, DetectionMode, ParametricFunction, ReflectionModel, Scene, SimulationState,
    color_gradient,
};

/// Shape of a curve, in canvas coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveShape {
    /// `t -> (t, y)`
    HorizontalLine { y: f64 },
    /// `from` at t = 0 to `to` at t = 1
    Line { from: DVec2, to: DVec2 },
    Circle { center: DVec2, radius: f64 },
    /// Screen-space ellipse, angle counter-clockwise on screen
    EllipseArc { center: DVec2, radii: DVec2 },
    /// `t -> (vertex.x + t, vertex.y + curvature * t²)`
    Parabola { vertex: DVec2, curvature: f64 },
}

impl CurveShape {
    pub fn to_function(&self) -> ParametricFunction {
        match *self {
            CurveShape::HorizontalLine { y } => ParametricFunction::horizontal_line(y),
            CurveShape::Line { from, to } => ParametricFunction::line(from, to),
            CurveShape::Circle { center, radius } => ParametricFunction::circle(center, radius),
            CurveShape::EllipseArc { center, radii } => ParametricFunction::ellipse_arc(center, radii),
            CurveShape::Parabola { vertex, curvature } => ParametricFunction::parabola(vertex, curvature),
        }
    }
}

/// One curve: shape plus sampled domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub shape: CurveShape,
    pub min_t: f64,
    pub max_t: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub closed: bool,
}

fn default_step() -> f64 {
    CURVE_STEP
}

impl CurveConfig {
    pub fn build(&self) -> CurveResult<Curve> {
        Curve::new(self.shape.to_function(), self.min_t, self.max_t, self.step, self.closed)
    }
}

impl Default for CurveConfig {
    /// Lower half of an ellipse: a bowl across an 800x600 canvas
    fn default() -> Self {
        Self {
            shape: CurveShape::EllipseArc {
                center: DVec2::new(400.0, 300.0),
                radii: DVec2::new(350.0, 250.0),
            },
            min_t: PI,
            max_t: TAU,
            step: CURVE_STEP,
            closed: false,
        }
    }
}

/// Ball spawn settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallConfig {
    pub radius: f64,
    /// Number of balls spawned
    pub count: usize,
    /// Colour of the first ball
    pub start_color: Color,
    /// Colour of the last ball (gradient in between)
    pub end_color: Color,
    pub position: DVec2,
    pub velocity: DVec2,
    /// Max random offset added to each velocity component
    #[serde(default)]
    pub jitter: f64,
    /// Seed for the jitter RNG
    #[serde(default)]
    pub seed: u64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            count: 1,
            start_color: Color::RED,
            end_color: Color::RED,
            // Canvas centre, a third of the way down
            position: DVec2::new(400.0, 200.0),
            velocity: DVec2::new(3.0, 0.0),
            jitter: 0.0,
            seed: 12345,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub ball: BallConfig,
    pub curves: Vec<CurveConfig>,
    /// Acceleration per tick, canvas units (y down)
    pub gravity: DVec2,
    /// Timer rate for the runner
    pub tick_hz: f64,
    #[serde(default)]
    pub detection: DetectionMode,
    #[serde(default)]
    pub reflection: ReflectionModel,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ball: BallConfig::default(),
            curves: vec![CurveConfig::default()],
            gravity: DVec2::new(0.0, 0.5),
            tick_hz: TICK_HZ,
            detection: DetectionMode::default(),
            reflection: ReflectionModel::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate JSON
    pub fn from_json(json: &str) -> CurveResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> CurveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> CurveResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> CurveResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> CurveResult<()> {
        let ball = &self.ball;
        ensure_finite(ball.radius, "ball.radius")?;
        if ball.radius <= 0.0 {
            return Err(CurveError::invalid_config("ball.radius must be > 0"));
        }
        if ball.count == 0 {
            return Err(CurveError::invalid_config("ball.count must be > 0"));
        }
        ensure_finite(ball.jitter, "ball.jitter")?;
        if ball.jitter < 0.0 {
            return Err(CurveError::invalid_config("ball.jitter must be >= 0"));
        }
        if !ball.position.is_finite() {
            return Err(CurveError::NonFinite("ball.position"));
        }
        if !ball.velocity.is_finite() {
            return Err(CurveError::NonFinite("ball.velocity"));
        }
        if !self.gravity.is_finite() {
            return Err(CurveError::NonFinite("gravity"));
        }
        ensure_finite(self.tick_hz, "tick_hz")?;
        if self.tick_hz <= 0.0 {
            return Err(CurveError::invalid_config("tick_hz must be > 0"));
        }
        self.tick_duration()?;

        match self.detection {
            DetectionMode::Geometric { thickness } => {
                ensure_finite(thickness, "detection.thickness")?;
                if thickness < 0.0 {
                    return Err(CurveError::invalid_config("detection.thickness must be >= 0"));
                }
            }
            DetectionMode::Newton(params) => {
                ensure_finite(params.half_delta, "detection.half_delta")?;
                if params.half_delta <= 0.0 {
                    return Err(CurveError::invalid_config("detection.half_delta must be > 0"));
                }
                if params.steps == 0 {
                    return Err(CurveError::invalid_config("detection.steps must be > 0"));
                }
            }
        }

        if self.curves.is_empty() {
            return Err(CurveError::invalid_config("at least one curve is required"));
        }
        for curve in &self.curves {
            curve.build()?;
        }
        Ok(())
    }

    /// Spawn balls: ids from 1, colours graded start to end, velocities
    /// jittered by a seeded RNG so a config always spawns the same balls
    pub fn spawn_balls(&self) -> Vec<Ball> {
        let cfg = &self.ball;
        let mut rng = Pcg32::seed_from_u64(cfg.seed);
        color_gradient(cfg.start_color, cfg.end_color, cfg.count)
            .into_iter()
            .enumerate()
            .map(|(i, color)| {
                let jitter = if cfg.jitter > 0.0 {
                    DVec2::new(
                        rng.random_range(-cfg.jitter..=cfg.jitter),
                        rng.random_range(-cfg.jitter..=cfg.jitter),
                    )
                } else {
                    DVec2::ZERO
                };
                Ball::new(i as u32 + 1, cfg.position, cfg.radius)
                    .with_velocity(cfg.velocity + jitter)
                    .with_color(color)
            })
            .collect()
    }

    /// Validate and build everything the runner ticks
    pub fn build_scene(&self) -> CurveResult<Scene> {
        self.validate()?;
        let curves = self
            .curves
            .iter()
            .map(CurveConfig::build)
            .collect::<CurveResult<Vec<_>>>()?;

        let mut scene = Scene::new(curves, self.detection);
        for ball in self.spawn_balls() {
            let state = SimulationState::for_ball(&ball, self.gravity).with_reflection(self.reflection);
            scene.add_ball(ball, state);
        }
        Ok(scene)
    }

    /// Tick period in seconds
    pub fn tick_period(&self) -> f64 {
        1.0 / self.tick_hz
    }

    /// Tick period as a `Duration`; fails if `tick_hz` is too small to represent
    pub fn tick_duration(&self) -> CurveResult<Duration> {
        Duration::try_from_secs_f64(self.tick_period()).map_err(|e| {
            CurveError::invalid_config(format!("tick_hz {} gives an unusable period: {e}", self.tick_hz))
        })
    }
}
