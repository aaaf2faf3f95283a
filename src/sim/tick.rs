//! Fixed timestep simulation tick
//!
//! Advances one ball against a set of curves. The contact phase debounces the
//! bounce: velocity is redirected once when contact begins and then left alone
//! until the ball separates from every curve.

use glam::DVec2;
use log::{debug, trace, warn};

use super::collision::{CollisionResult, DetectionMode, detect, redirect_velocity, reflect_velocity};
use super::curve::Curve;
use super::state::{Ball, ContactPhase, ReflectionModel, SimulationState};
use crate::consts::EPSILON;

/// Notification for the host (drawing markers, sounds, debug overlays)
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Ball touched a curve; `point` is the mean intersection point
    ContactBegan { ball_id: u32, point: DVec2 },
    /// Ball separated from all curves
    ContactEnded { ball_id: u32 },
    /// Ball overlapped a curve with no usable bounce direction; it stays Free
    DegenerateBounce { ball_id: u32 },
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Collision detector reported overlap this tick
    pub hit: bool,
    /// Contact phase changed this tick
    pub contact_changed: bool,
    pub events: Vec<SimEvent>,
    /// Raw detector output
    pub collision: CollisionResult,
}

/// Advance `ball` and its `state` by `dt`
///
/// Non-finite or non-positive `dt` leaves everything untouched.
pub fn tick(
    state: &mut SimulationState,
    ball: &mut Ball,
    curves: &[Curve],
    mode: &DetectionMode,
    dt: f64,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if !dt.is_finite() || dt <= 0.0 {
        trace!("ball {}: skipping tick with dt={dt}", ball.id);
        return outcome;
    }

    let collision = detect(curves, ball.center, ball.radius, mode);
    outcome.hit = collision.hit;

    match (state.phase, collision.hit) {
        (ContactPhase::Free, true) => {
            if begin_contact(state, ball, &collision, &mut outcome) {
                update_normal_force(state, &collision);
            } else {
                // No usable bounce direction counts as no contact
                state.velocity += state.gravity * dt;
            }
        }
        (ContactPhase::Contact, true) => {
            update_normal_force(state, &collision);
        }
        (ContactPhase::Contact, false) => {
            debug!("ball {}: contact ended", ball.id);
            state.phase = ContactPhase::Free;
            state.normal_force = DVec2::ZERO;
            outcome.contact_changed = true;
            outcome.events.push(SimEvent::ContactEnded { ball_id: ball.id });
            state.velocity += state.gravity * dt;
        }
        (ContactPhase::Free, false) => {
            state.velocity += state.gravity * dt;
        }
    }

    ball.center += state.velocity * dt;
    ball.velocity = state.velocity;
    state.time_ticks += 1;

    outcome.collision = collision;
    outcome
}

/// Free -> Contact: redirect velocity once.
///
/// Returns `false` and leaves the ball Free when there is no usable bounce
/// direction.
fn begin_contact(
    state: &mut SimulationState,
    ball: &Ball,
    collision: &CollisionResult,
    outcome: &mut TickOutcome,
) -> bool {
    let mean = collision.mean_point().unwrap_or(ball.center);
    let bounced = match state.reflection {
        ReflectionModel::CenterOffset => redirect_velocity(state.velocity, ball.center - mean),
        ReflectionModel::SurfaceNormal => {
            let n = collision.reflection_normal;
            (n.length_squared() > EPSILON).then(|| reflect_velocity(state.velocity, n))
        }
    };

    let Some(velocity) = bounced else {
        warn!(
            "ball {}: degenerate bounce at ({:.2}, {:.2}), treating as no contact",
            ball.id, mean.x, mean.y
        );
        outcome.events.push(SimEvent::DegenerateBounce { ball_id: ball.id });
        return false;
    };

    debug!(
        "ball {}: contact at ({:.2}, {:.2}), velocity {:?} -> {:?}",
        ball.id, mean.x, mean.y, state.velocity, velocity
    );
    state.phase = ContactPhase::Contact;
    state.velocity = velocity;
    outcome.contact_changed = true;
    outcome.events.push(SimEvent::ContactBegan {
        ball_id: ball.id,
        point: mean,
    });
    true
}

/// Surface reaction cancelling the gravity component that presses into it,
/// zero if gravity pulls away from the surface
fn update_normal_force(state: &mut SimulationState, collision: &CollisionResult) {
    let n = collision.reflection_normal;
    let into_surface = state.gravity.dot(n);
    state.normal_force = if into_surface < 0.0 {
        -into_surface * n
    } else {
        DVec2::ZERO
    };
}

/// A ball together with its own simulation state
#[derive(Debug, Clone)]
pub struct Body {
    pub ball: Ball,
    pub state: SimulationState,
}

impl Body {
    /// Override the velocity, keeping the ball's copy in step with the state
    pub fn set_velocity(&mut self, velocity: DVec2) {
        self.state.velocity = velocity;
        self.ball.velocity = velocity;
    }
}

/// Curves plus every simulated ball
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub curves: Vec<Curve>,
    pub bodies: Vec<Body>,
    pub mode: DetectionMode,
}

impl Scene {
    pub fn new(curves: Vec<Curve>, mode: DetectionMode) -> Self {
        Self {
            curves,
            bodies: Vec::new(),
            mode,
        }
    }

    pub fn add_ball(&mut self, ball: Ball, state: SimulationState) {
        self.bodies.push(Body { ball, state });
        self.bodies.sort_by_key(|b| b.ball.id);
    }

    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.bodies.iter().map(|b| &b.ball)
    }

    /// Tick every ball (in id order) and collect their events
    pub fn step(&mut self, dt: f64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for body in &mut self.bodies {
            let outcome = tick(&mut body.state, &mut body.ball, &self.curves, &self.mode, dt);
            events.extend(outcome.events);
        }
        events
    }
}
