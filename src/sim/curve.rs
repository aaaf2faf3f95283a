//! Sampled parametric curves
//!
//! A curve is a parametric function restricted to `[min_t, max_t]` and
//! sampled every `step`. Sampling is lazy ([`Curve::sample`]) and tracks the
//! axis-aligned bounds of the points seen so far; the collected polyline is
//! cached until the configuration changes.

use std::sync::OnceLock;

use glam::DVec2;
use log::trace;
use serde::{Deserialize, Serialize};

use super::collision::CollisionResult;
use super::newton::{NewtonParams, find_critical_point, find_equals, is_usable_root};
use super::parametric::ParametricFunction;
use crate::consts::NORMAL_HALF_DELTA;
use crate::error::{CurveError, CurveResult, ensure_finite};

/// Upper bound on samples per pass (rejects near-infinite ranges)
pub const MAX_SAMPLES: usize = 1_000_000;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Degenerate box holding a single point
    pub fn from_point(p: DVec2) -> Self {
        Self { min: p, max: p }
    }

    /// Box enclosing a disc
    pub fn around(center: DVec2, radius: f64) -> Self {
        let r = DVec2::splat(radius.abs());
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Grow to include `p` (never shrinks)
    #[inline]
    pub fn include(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Self {
        let m = DVec2::splat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Closed-interval overlap test on both axes
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Sampled points of a curve, in parameter order
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<DVec2>,
    /// Whether the last point connects back to the first
    pub closed: bool,
    pub bounds: Bounds,
}

impl Polyline {
    /// Consecutive point pairs, plus the closing pair when `closed`
    pub fn segments(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 1 => Some((*last, *first)),
            _ => None,
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    pub fn segment_count(&self) -> usize {
        let open = self.points.len().saturating_sub(1);
        if self.closed && self.points.len() > 1 {
            open + 1
        } else {
            open
        }
    }
}

/// Lazy, restartable pass over a curve's samples.
///
/// Bounds grow as points are yielded; read them with [`Samples::bounds`]
/// once the pass is done.
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    curve: &'a Curve,
    index: usize,
    count: usize,
    bounds: Option<Bounds>,
}

impl Samples<'_> {
    /// Bounds of the points yielded so far (`None` before the first point)
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

impl Iterator for Samples<'_> {
    type Item = DVec2;

    fn next(&mut self) -> Option<DVec2> {
        if self.index >= self.count {
            return None;
        }
        let p = self.curve.point_at(self.curve.parameter_at(self.index));
        self.index += 1;
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(p),
            None => self.bounds = Some(Bounds::from_point(p)),
        }
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples<'_> {}

/// Number of samples `min_t + i * step <= max_t`
fn sample_count(min_t: f64, max_t: f64, step: f64) -> usize {
    // Small slack so a domain that is an exact multiple of `step` keeps its end point
    ((max_t - min_t) / step + 1e-9).floor() as usize + 1
}

fn validate(min_t: f64, max_t: f64, step: f64) -> CurveResult<()> {
    ensure_finite(min_t, "min_t")?;
    ensure_finite(max_t, "max_t")?;
    ensure_finite(step, "step")?;
    if min_t > max_t {
        return Err(CurveError::invalid_domain(min_t, max_t));
    }
    if step <= 0.0 {
        return Err(CurveError::invalid_step(step));
    }
    let count = (max_t - min_t) / step;
    if count >= MAX_SAMPLES as f64 {
        return Err(CurveError::invalid_config(format!(
            "domain [{min_t}, {max_t}] with step {step} exceeds {MAX_SAMPLES} samples"
        )));
    }
    Ok(())
}

/// A parametric function over a sampled domain
#[derive(Debug, Clone)]
pub struct Curve {
    function: ParametricFunction,
    min_t: f64,
    max_t: f64,
    step: f64,
    closed: bool,
    polyline: OnceLock<Polyline>,
}

impl Curve {
    pub fn new(
        function: ParametricFunction,
        min_t: f64,
        max_t: f64,
        step: f64,
        closed: bool,
    ) -> CurveResult<Self> {
        validate(min_t, max_t, step)?;
        Ok(Self {
            function,
            min_t,
            max_t,
            step,
            closed,
            polyline: OnceLock::new(),
        })
    }

    pub fn function(&self) -> &ParametricFunction {
        &self.function
    }

    pub fn min_t(&self) -> f64 {
        self.min_t
    }

    pub fn max_t(&self) -> f64 {
        self.max_t
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_domain(&mut self, min_t: f64, max_t: f64) -> CurveResult<()> {
        validate(min_t, max_t, self.step)?;
        self.min_t = min_t;
        self.max_t = max_t;
        self.invalidate();
        Ok(())
    }

    pub fn set_step(&mut self, step: f64) -> CurveResult<()> {
        validate(self.min_t, self.max_t, step)?;
        self.step = step;
        self.invalidate();
        Ok(())
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.polyline = OnceLock::new();
    }

    /// Parameter of the `index`-th sample
    #[inline]
    pub fn parameter_at(&self, index: usize) -> f64 {
        // Index-based so long domains don't accumulate step error
        (self.min_t + index as f64 * self.step).min(self.max_t)
    }

    #[inline]
    pub fn point_at(&self, t: f64) -> DVec2 {
        self.function.eval(t)
    }

    /// Midpoint of the parameter domain
    pub fn mid_t(&self) -> f64 {
        0.5 * (self.min_t + self.max_t)
    }

    /// Start a fresh sampling pass
    pub fn sample(&self) -> Samples<'_> {
        Samples {
            curve: self,
            index: 0,
            count: sample_count(self.min_t, self.max_t, self.step),
            bounds: None,
        }
    }

    /// Sampled polyline (computed once per configuration)
    pub fn polyline(&self) -> &Polyline {
        self.polyline.get_or_init(|| {
            let mut samples = self.sample();
            let points: Vec<DVec2> = samples.by_ref().collect();
            // At least one sample exists because min_t <= max_t
            let bounds = samples
                .bounds()
                .unwrap_or_else(|| Bounds::from_point(self.point_at(self.min_t)));
            Polyline {
                points,
                closed: self.closed,
                bounds,
            }
        })
    }

    /// Bounding box of the sampled points
    pub fn bounds(&self) -> Bounds {
        self.polyline().bounds
    }

    /// Parameter of the sample closest to `p`
    pub fn nearest_sample_t(&self, p: DVec2) -> f64 {
        let index = self
            .polyline()
            .points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(p)
                    .partial_cmp(&b.distance_squared(p))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.parameter_at(index)
    }

    /// Parameter where the y coordinate is stationary (apex or trough),
    /// searched from the domain midpoint. `None` if Newton leaves the domain.
    pub fn extremum_y(&self, params: NewtonParams) -> Option<f64> {
        let t = find_critical_point(self.mid_t(), self.function.y_component(), params);
        is_usable_root(t, self.min_t, self.max_t).then_some(t)
    }

    /// Newton-method intersection test against a ball.
    ///
    /// Candidate parameters are where the curve's x coordinate meets the
    /// ball's left edge, right edge and vertical centre line, and where its y
    /// coordinate meets the top edge, bottom edge and horizontal centre line.
    /// Each is solved from the domain midpoint and from the sample nearest the
    /// ball. Candidates within `radius` of the centre are intersections.
    pub fn intersects_ball(&self, center: DVec2, radius: f64, params: NewtonParams) -> CollisionResult {
        if !Bounds::around(center, radius).overlaps(&self.bounds()) {
            return CollisionResult::miss();
        }

        let x = self.function.x_component();
        let y = self.function.y_component();
        let h = params.half_delta;
        let steps = params.steps;

        let x_targets = [center.x - radius, center.x + radius, center.x];
        let y_targets = [center.y - radius, center.y + radius, center.y];
        let seeds = [self.mid_t(), self.nearest_sample_t(center)];

        let mut found: Vec<f64> = Vec::new();
        for seed in seeds {
            let candidates = x_targets
                .iter()
                .map(|&target| find_equals(seed, target, &x, h, steps))
                .chain(y_targets.iter().map(|&target| find_equals(seed, target, &y, h, steps)));

            for t in candidates {
                if !is_usable_root(t, self.min_t, self.max_t) {
                    trace!("newton candidate t={t} rejected (outside [{}, {}])", self.min_t, self.max_t);
                    continue;
                }
                if self.point_at(t).distance(center) > radius {
                    continue;
                }
                if found.iter().any(|&u| (u - t).abs() < 1e-9) {
                    continue;
                }
                found.push(t);
            }
        }

        if found.is_empty() {
            return CollisionResult::miss();
        }

        let mean_t = found.iter().sum::<f64>() / found.len() as f64;
        let contact = self.point_at(mean_t);
        let mut normal = self
            .function
            .normal(NORMAL_HALF_DELTA)
            .eval(mean_t)
            .normalize_or_zero();
        // Face the ball so the normal works as a reflection normal
        if normal.dot(center - contact) < 0.0 {
            normal = -normal;
        }

        CollisionResult {
            hit: true,
            intersection_points: found.iter().map(|&t| self.point_at(t)).collect(),
            reflection_normal: normal,
            parameters: found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::TAU;

    fn unit_circle(step: f64) -> Curve {
        Curve::new(ParametricFunction::circle(DVec2::ZERO, 1.0), 0.0, TAU, step, true).unwrap()
    }

    fn floor_line() -> Curve {
        Curve::new(ParametricFunction::horizontal_line(105.0), 0.0, 200.0, 1.0, false).unwrap()
    }

    #[test]
    fn test_rejects_bad_config() {
        let f = ParametricFunction::horizontal_line(0.0);
        assert!(matches!(
            Curve::new(f.clone(), 2.0, 1.0, 0.1, false),
            Err(CurveError::InvalidDomain { .. })
        ));
        assert!(matches!(
            Curve::new(f.clone(), 0.0, 1.0, 0.0, false),
            Err(CurveError::InvalidStep(_))
        ));
        assert!(matches!(
            Curve::new(f.clone(), 0.0, 1.0, -0.5, false),
            Err(CurveError::InvalidStep(_))
        ));
        assert!(matches!(
            Curve::new(f.clone(), 0.0, f64::INFINITY, 0.5, false),
            Err(CurveError::NonFinite("max_t"))
        ));
        assert!(Curve::new(f, 0.0, 1.0, 1e-12, false).is_err());
    }

    #[test]
    fn test_setters_validate_and_keep_old_config() {
        let mut curve = floor_line();
        assert!(curve.set_domain(5.0, 1.0).is_err());
        assert_eq!((curve.min_t(), curve.max_t()), (0.0, 200.0));
        assert!(curve.set_step(0.0).is_err());
        assert_eq!(curve.step(), 1.0);
    }

    #[test]
    fn test_sample_includes_end_point() {
        let curve = Curve::new(ParametricFunction::horizontal_line(0.0), 0.0, 1.0, 0.1, false).unwrap();
        let points: Vec<_> = curve.sample().collect();
        assert_eq!(points.len(), 11);
        assert!((points[10].x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_stops_before_max_when_step_does_not_divide() {
        let curve = Curve::new(ParametricFunction::horizontal_line(0.0), 0.0, 1.0, 0.3, false).unwrap();
        let xs: Vec<f64> = curve.sample().map(|p| p.x).collect();
        assert_eq!(xs.len(), 4);
        assert!(xs.iter().all(|&x| x <= 1.0));
    }

    #[test]
    fn test_single_point_domain() {
        let curve = Curve::new(ParametricFunction::horizontal_line(3.0), 2.0, 2.0, 0.5, false).unwrap();
        let polyline = curve.polyline();
        assert_eq!(polyline.points, vec![DVec2::new(2.0, 3.0)]);
        assert_eq!(polyline.segment_count(), 0);
        assert_eq!(polyline.bounds, Bounds::from_point(DVec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_closed_unit_circle() {
        let curve = unit_circle(TAU / 64.0);
        let polyline = curve.polyline();
        let first = polyline.points[0];
        let last = *polyline.points.last().unwrap();
        assert!((first - last).length() < 1e-9);

        let b = polyline.bounds;
        assert!((b.min - DVec2::new(-1.0, -1.0)).length() < 1e-2);
        assert!((b.max - DVec2::new(1.0, 1.0)).length() < 1e-2);

        // Closing segment included
        assert_eq!(polyline.segment_count(), polyline.points.len());
    }

    #[test]
    fn test_bounds_grow_during_pass() {
        let curve = unit_circle(TAU / 8.0);
        let mut samples = curve.sample();
        samples.next();
        let early = samples.bounds().unwrap();
        assert_eq!(early.width(), 0.0);
        samples.by_ref().for_each(drop);
        let full = samples.bounds().unwrap();
        assert!(full.width() > 1.9 && full.height() > 1.9);

        // A new pass starts from nothing
        assert!(curve.sample().bounds().is_none());
    }

    #[test]
    fn test_cache_invalidated_by_setters() {
        let mut curve = floor_line();
        assert_eq!(curve.polyline().points.len(), 201);
        curve.set_domain(0.0, 10.0).unwrap();
        assert_eq!(curve.polyline().points.len(), 11);
        curve.set_closed(true);
        assert!(curve.polyline().closed);
    }

    #[test]
    fn test_extremum_y_of_parabola() {
        let curve = Curve::new(
            ParametricFunction::parabola(DVec2::new(0.0, 50.0), 0.5),
            -10.0,
            12.0,
            0.1,
            false,
        )
        .unwrap();
        let t = curve.extremum_y(NewtonParams::default()).unwrap();
        assert!(t.abs() < 1e-6);
    }

    #[test]
    fn test_newton_hit_on_flat_line() {
        let curve = floor_line();
        let result = curve.intersects_ball(DVec2::new(100.0, 100.0), 10.0, NewtonParams::default());
        assert!(result.hit);
        assert!(
            result
                .intersection_points
                .iter()
                .all(|p| (p.y - 105.0).abs() < 1e-9 && p.distance(DVec2::new(100.0, 100.0)) <= 10.0)
        );
        // Normal faces the ball (up the screen)
        assert!((result.reflection_normal - DVec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_newton_miss_far_away() {
        let curve = floor_line();
        let result = curve.intersects_ball(DVec2::new(100.0, 0.0), 10.0, NewtonParams::default());
        assert!(!result.hit);
        assert!(result.intersection_points.is_empty());
    }

    #[test]
    fn test_newton_hit_on_circle() {
        let curve = Curve::new(ParametricFunction::circle(DVec2::ZERO, 100.0), 0.0, TAU, 0.01, true).unwrap();
        // Ball just inside the rim on the right
        let center = DVec2::new(95.0, 0.0);
        let result = curve.intersects_ball(center, 8.0, NewtonParams::default());
        assert!(result.hit);
        // Normal points back toward the centre of the circle
        assert!(result.reflection_normal.x < -0.9);
    }

    proptest! {
        #[test]
        fn prop_sampling_is_deterministic(min_t in -10.0f64..10.0, span in 0.0f64..20.0, step in 0.01f64..1.0) {
            let curve = Curve::new(
                ParametricFunction::ellipse_arc(DVec2::new(3.0, 4.0), DVec2::new(5.0, 2.0)),
                min_t,
                min_t + span,
                step,
                false,
            ).unwrap();
            let a: Vec<DVec2> = curve.sample().collect();
            let b: Vec<DVec2> = curve.sample().collect();
            prop_assert_eq!(a, b);
        }
    }
}
