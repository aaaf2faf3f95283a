//! Collision detection and response for sampled curves
//!
//! The primary detector treats the ball as a filled disc and the curve as its
//! polyline stroked with a fixed thickness. A stroke overlaps the disc exactly
//! where the polyline centreline comes within `radius + thickness / 2` of the
//! ball centre, so each segment is clipped against that inflated disc.
//! Consecutive segments with a non-empty clip form one connected contact
//! region, and each region contributes its length-weighted centroid as an
//! intersection point.
//!
//! The Newton-method detector lives on [`Curve::intersects_ball`] and is
//! selected with [`DetectionMode::Newton`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::curve::{Bounds, Curve, Polyline};
use super::newton::NewtonParams;
use crate::consts::{EPSILON, STROKE_THICKNESS};
use crate::mean_point;

/// Result of a collision check
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionResult {
    /// Whether the ball overlaps the curve
    pub hit: bool,
    /// One point per contact region (geometric) or per root (Newton)
    pub intersection_points: Vec<DVec2>,
    /// Unit normal facing the ball centre (only meaningful if `hit`)
    pub reflection_normal: DVec2,
    /// Curve parameters of the intersection points (Newton mode only)
    pub parameters: Vec<f64>,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self::default()
    }

    /// Mean of the intersection points
    pub fn mean_point(&self) -> Option<DVec2> {
        mean_point(&self.intersection_points)
    }
}

/// How ball/curve overlap is computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionMode {
    /// Stroked polyline against the disc
    Geometric { thickness: f64 },
    /// Newton-method search for curve/ball-edge crossings
    Newton(NewtonParams),
}

impl Default for DetectionMode {
    fn default() -> Self {
        DetectionMode::Geometric {
            thickness: STROKE_THICKNESS,
        }
    }
}

/// Clip segment `a -> b` to the disc `|p - center| <= reach`.
///
/// Returns the clipped endpoints, or `None` if the segment misses the disc.
/// A zero-length segment clips to itself when inside.
pub fn clip_segment_to_disc(a: DVec2, b: DVec2, center: DVec2, reach: f64) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let f = a - center;
    let r_sq = reach * reach;

    let qa = d.length_squared();
    if qa < EPSILON * EPSILON {
        return (f.length_squared() <= r_sq).then_some((a, a));
    }

    // |f + d s|² = r²  ->  qa s² + qb s + qc = 0
    let qb = 2.0 * f.dot(d);
    let qc = f.length_squared() - r_sq;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }

    let sq = disc.sqrt();
    let s0 = ((-qb - sq) / (2.0 * qa)).max(0.0);
    let s1 = ((-qb + sq) / (2.0 * qa)).min(1.0);
    if s0 > s1 {
        return None;
    }
    Some((a + d * s0, a + d * s1))
}

/// Running centroid of one connected contact region
#[derive(Debug, Clone, Copy, Default)]
struct Region {
    weighted: DVec2,
    length: f64,
    point_sum: DVec2,
    point_count: u32,
}

impl Region {
    fn add(&mut self, from: DVec2, to: DVec2) {
        let len = from.distance(to);
        self.weighted += (from + to) * 0.5 * len;
        self.length += len;
        self.point_sum += from + to;
        self.point_count += 2;
    }

    fn merge(&mut self, other: &Region) {
        self.weighted += other.weighted;
        self.length += other.length;
        self.point_sum += other.point_sum;
        self.point_count += other.point_count;
    }

    fn centroid(&self) -> DVec2 {
        if self.length > EPSILON {
            self.weighted / self.length
        } else {
            // Tangential touch: the clip has no length
            self.point_sum / self.point_count.max(1) as f64
        }
    }
}

/// Contact regions between a stroked polyline and a disc, as centroids
pub fn stroke_contact_points(polyline: &Polyline, center: DVec2, radius: f64, thickness: f64) -> Vec<DVec2> {
    let reach = radius + thickness * 0.5;

    if polyline.points.len() == 1 {
        let p = polyline.points[0];
        return if p.distance(center) <= reach { vec![p] } else { Vec::new() };
    }

    let mut regions: Vec<Region> = Vec::new();
    let mut current: Option<Region> = None;
    let mut first_touches_start = false;
    let mut last_touches_end = false;
    let segment_count = polyline.segment_count();

    for (i, (a, b)) in polyline.segments().enumerate() {
        match clip_segment_to_disc(a, b, center, reach) {
            Some((from, to)) => {
                if i == 0 {
                    first_touches_start = true;
                }
                if i + 1 == segment_count {
                    last_touches_end = true;
                }
                // Clips only join when the vertex between them is inside the disc
                if a.distance(center) > reach {
                    if let Some(region) = current.take() {
                        regions.push(region);
                    }
                }
                current.get_or_insert_with(Region::default).add(from, to);
            }
            None => {
                if let Some(region) = current.take() {
                    regions.push(region);
                }
            }
        }
    }
    if let Some(region) = current.take() {
        regions.push(region);
    }

    // A region running through the seam of a closed polyline is one region
    let seam_inside = polyline.points.first().is_some_and(|p| p.distance(center) <= reach);
    if polyline.closed && seam_inside && first_touches_start && last_touches_end && regions.len() > 1 {
        if let Some(tail) = regions.pop() {
            regions[0].merge(&tail);
        }
    }

    regions.iter().map(Region::centroid).collect()
}

/// Geometric collision between a ball and a stroked polyline
pub fn ball_polyline_collision(center: DVec2, radius: f64, polyline: &Polyline, thickness: f64) -> CollisionResult {
    let stroke_bounds = polyline.bounds.expanded(thickness * 0.5);
    if !stroke_bounds.overlaps(&Bounds::around(center, radius)) {
        return CollisionResult::miss();
    }

    let points = stroke_contact_points(polyline, center, radius, thickness);
    let Some(mean) = mean_point(&points) else {
        return CollisionResult::miss();
    };

    CollisionResult {
        hit: true,
        intersection_points: points,
        reflection_normal: (center - mean).normalize_or_zero(),
        parameters: Vec::new(),
    }
}

/// Check a ball against one curve with the given detection mode
pub fn ball_curve_collision(center: DVec2, radius: f64, curve: &Curve, mode: &DetectionMode) -> CollisionResult {
    match mode {
        DetectionMode::Geometric { thickness } => {
            ball_polyline_collision(center, radius, curve.polyline(), *thickness)
        }
        DetectionMode::Newton(params) => curve.intersects_ball(center, radius, *params),
    }
}

/// Check a ball against every curve and merge the hits
pub fn detect(curves: &[Curve], center: DVec2, radius: f64, mode: &DetectionMode) -> CollisionResult {
    let mut merged = CollisionResult::miss();
    let mut normal_sum = DVec2::ZERO;

    for curve in curves {
        let result = ball_curve_collision(center, radius, curve, mode);
        if !result.hit {
            continue;
        }
        merged.hit = true;
        merged.intersection_points.extend(result.intersection_points);
        merged.parameters.extend(result.parameters);
        normal_sum += result.reflection_normal;
    }

    if merged.hit {
        merged.reflection_normal = normal_sum.normalize_or_zero();
    }
    merged
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Redirect velocity along `direction`, keeping its speed.
///
/// Returns `None` when `direction` has no length.
#[inline]
pub fn redirect_velocity(velocity: DVec2, direction: DVec2) -> Option<DVec2> {
    let len = direction.length();
    (len > EPSILON).then(|| direction * (velocity.length() / len))
}
