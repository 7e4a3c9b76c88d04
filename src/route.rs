use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// How a multi-waypoint route is interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStyle {
    /// Smooth curve through every waypoint (Catmull-Rom; quadratic Bezier
    /// for the two-point case).
    Spline,
    /// Straight legs between waypoints.
    Segments,
}

/// Metadata for one leg of a route, used to place labels along it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub length: f32,
    /// Point at half the leg's arc length.
    pub midpoint: Vec2,
    /// Unit tangent at the midpoint.
    pub tangent: Vec2,
    /// Unit normal at the midpoint (left of travel in y-down space).
    pub normal: Vec2,
    /// Label rotation folded into the readable range (-90, 90].
    pub rotation_deg: f32,
}

/// Sampled route with per-leg metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub full_path: Vec<Vec2>,
    pub segments: Vec<SegmentInfo>,
    pub total_length: f32,
}

impl RouteGeometry {
    /// Leg indices ranked longest-first for label placement, ties broken
    /// by original leg order.
    pub fn label_segments(&self) -> Vec<usize> {
        let mut ranked: Vec<(usize, f32)> = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.length))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.into_iter().map(|(i, _)| i).collect()
    }
}

/// One geometry option for a route, produced at a specific endpoint gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteVariant {
    /// Multiple of the anchor-ring radius the endpoints retreat by.
    pub gap_multiplier: f32,
    pub geometry: RouteGeometry,
}

/// Quadratic Bezier between two points. `curvature` is the perpendicular
/// offset of the control point as a signed fraction of the chord length;
/// zero yields a straight line.
pub fn quadratic_bezier(p0: Vec2, p2: Vec2, curvature: f32, samples: usize) -> Vec<Vec2> {
    let samples = samples.max(2);
    let chord = p2 - p0;
    let mid = (p0 + p2) * 0.5;
    let control = mid + chord.normalized().perp() * (curvature * chord.length());

    (0..samples)
        .map(|i| {
            let t = i as f32 / (samples - 1) as f32;
            let u = 1.0 - t;
            p0 * (u * u) + control * (2.0 * u * t) + p2 * (t * t)
        })
        .collect()
}

/// One Catmull-Rom span from `p1` to `p2` with neighbor control points.
pub fn catmull_rom_segment(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, samples: usize) -> Vec<Vec2> {
    let samples = samples.max(2);
    (0..samples)
        .map(|i| {
            let t = i as f32 / (samples - 1) as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            (p1 * 2.0
                + (p2 - p0) * t
                + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
                + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
                * 0.5
        })
        .collect()
}

/// Move `point` toward `target` by `distance`, stopping at `target`.
pub fn pull_back(point: Vec2, target: Vec2, distance: f32) -> Vec2 {
    let direction = target - point;
    let available = direction.length();
    if available <= 0.0 || distance <= 0.0 {
        return point;
    }
    if distance >= available {
        return target;
    }
    point + direction.normalized() * distance
}

fn segment_info(path: &[Vec2]) -> Option<SegmentInfo> {
    if path.len() < 2 {
        return None;
    }

    let lengths: Vec<f32> = path.windows(2).map(|w| w[0].distance(w[1])).collect();
    let total: f32 = lengths.iter().sum();
    if total <= 0.0 {
        return None;
    }

    // Sample index at half the arc length.
    let half = total / 2.0;
    let mut cumulative = 0.0;
    let mut mid_idx = path.len() - 1;
    for (i, len) in lengths.iter().enumerate() {
        cumulative += len;
        if cumulative >= half {
            mid_idx = i + 1;
            break;
        }
    }
    mid_idx = mid_idx.min(path.len() - 1);

    let raw_tangent = if mid_idx > 0 && mid_idx < path.len() - 1 {
        path[mid_idx + 1] - path[mid_idx - 1]
    } else if mid_idx < path.len() - 1 {
        path[mid_idx + 1] - path[mid_idx]
    } else {
        path[mid_idx] - path[mid_idx - 1]
    };
    let tangent = raw_tangent.normalized();
    let normal = tangent.perp();

    let mut rotation = tangent.y.atan2(tangent.x).to_degrees();
    if rotation > 90.0 {
        rotation -= 180.0;
    }
    if rotation <= -90.0 {
        rotation += 180.0;
    }

    Some(SegmentInfo {
        length: total,
        midpoint: path[mid_idx],
        tangent,
        normal,
        rotation_deg: rotation,
    })
}

/// Sampled geometry for a route through `waypoints`.
///
/// Returns `None` for degenerate input (fewer than two waypoints, or all
/// legs of zero length).
pub fn route_geometry(
    waypoints: &[Vec2],
    style: RouteStyle,
    samples_per_leg: usize,
    curvature: f32,
) -> Option<RouteGeometry> {
    let n = waypoints.len();
    if n < 2 {
        return None;
    }

    let mut full_path: Vec<Vec2> = Vec::new();
    let mut segments: Vec<SegmentInfo> = Vec::new();

    let mut push_leg = |leg: Vec<Vec2>| {
        if let Some(info) = segment_info(&leg) {
            segments.push(info);
            full_path.extend(leg);
        }
    };

    match style {
        RouteStyle::Segments => {
            for w in waypoints.windows(2) {
                let leg = quadratic_bezier(w[0], w[1], 0.0, samples_per_leg);
                push_leg(leg);
            }
        }
        RouteStyle::Spline if n == 2 => {
            push_leg(quadratic_bezier(
                waypoints[0],
                waypoints[1],
                curvature,
                samples_per_leg,
            ));
        }
        RouteStyle::Spline => {
            for i in 0..n - 1 {
                // Reflect the boundary waypoints to synthesize control
                // points at the ends of the spline.
                let p0 = if i > 0 {
                    waypoints[i - 1]
                } else {
                    waypoints[0] * 2.0 - waypoints[1]
                };
                let p3 = if i + 2 < n {
                    waypoints[i + 2]
                } else {
                    waypoints[n - 1] * 2.0 - waypoints[n - 2]
                };
                push_leg(catmull_rom_segment(
                    p0,
                    waypoints[i],
                    waypoints[i + 1],
                    p3,
                    samples_per_leg,
                ));
            }
        }
    }

    if segments.is_empty() {
        return None;
    }

    let total_length = segments.iter().map(|s| s.length).sum();
    Some(RouteGeometry {
        full_path,
        segments,
        total_length,
    })
}

/// Geometry variants for a route at each endpoint gap multiplier,
/// shortest gap first. The first and last waypoints retreat toward their
/// neighbor by `radius x multiplier` so arrows stop on the anchor ring
/// instead of piercing the city symbol.
pub fn route_variants(
    waypoints: &[Vec2],
    start_radius: f32,
    end_radius: f32,
    gap_multipliers: &[f32],
    style: RouteStyle,
    samples_per_leg: usize,
    curvature: f32,
) -> Vec<RouteVariant> {
    if waypoints.len() < 2 {
        return Vec::new();
    }

    let mut variants = Vec::with_capacity(gap_multipliers.len());
    for &gap in gap_multipliers {
        let mut adjusted = waypoints.to_vec();
        let last = adjusted.len() - 1;
        if start_radius > 0.0 {
            adjusted[0] = pull_back(adjusted[0], waypoints[1], start_radius * gap);
        }
        if end_radius > 0.0 {
            adjusted[last] = pull_back(adjusted[last], waypoints[last - 1], end_radius * gap);
        }

        if let Some(geometry) = route_geometry(&adjusted, style, samples_per_leg, curvature) {
            variants.push(RouteVariant {
                gap_multiplier: gap,
                geometry,
            });
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::{
        RouteStyle, catmull_rom_segment, pull_back, quadratic_bezier, route_geometry,
        route_variants,
    };
    use crate::geometry::Vec2;

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn bezier_hits_both_endpoints() {
        let p0 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(100.0, 40.0);
        let path = quadratic_bezier(p0, p2, 0.25, 20);
        assert_eq!(path.len(), 20);
        assert!(close(path[0], p0));
        assert!(close(path[19], p2));
    }

    #[test]
    fn zero_curvature_bezier_is_straight() {
        let path = quadratic_bezier(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0, 11);
        for p in &path {
            assert!(p.y.abs() < 1e-5);
        }
        assert!(close(path[5], Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn catmull_rom_interpolates_span_endpoints() {
        let p0 = Vec2::new(-10.0, 0.0);
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(10.0, 10.0);
        let p3 = Vec2::new(20.0, 10.0);
        let path = catmull_rom_segment(p0, p1, p2, p3, 30);
        assert!(close(path[0], p1));
        assert!(close(path[29], p2));
    }

    #[test]
    fn spline_route_passes_through_every_waypoint() {
        let waypoints = [
            Vec2::new(0.0, 0.0),
            Vec2::new(60.0, 20.0),
            Vec2::new(120.0, -10.0),
        ];
        let geometry = route_geometry(&waypoints, RouteStyle::Spline, 25, 0.0).unwrap();
        assert_eq!(geometry.segments.len(), 2);
        for waypoint in &waypoints {
            let nearest = geometry
                .full_path
                .iter()
                .map(|p| p.distance(*waypoint))
                .fold(f32::MAX, f32::min);
            assert!(nearest < 1e-3, "waypoint {:?} missed", waypoint);
        }
    }

    #[test]
    fn degenerate_routes_yield_nothing() {
        assert!(route_geometry(&[Vec2::ZERO], RouteStyle::Spline, 10, 0.0).is_none());
        assert!(route_geometry(&[Vec2::ZERO, Vec2::ZERO], RouteStyle::Spline, 10, 0.0).is_none());
    }

    #[test]
    fn label_segments_rank_longest_leg_first() {
        let waypoints = [
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(130.0, 0.0),
            Vec2::new(180.0, 0.0),
        ];
        let geometry = route_geometry(&waypoints, RouteStyle::Segments, 10, 0.0).unwrap();
        assert_eq!(geometry.label_segments(), vec![1, 2, 0]);
    }

    #[test]
    fn pull_back_moves_exactly_and_never_overshoots() {
        let p = Vec2::new(0.0, 0.0);
        let target = Vec2::new(10.0, 0.0);
        assert!(close(pull_back(p, target, 4.0), Vec2::new(4.0, 0.0)));
        assert!(close(pull_back(p, target, 25.0), target));
        assert!(close(pull_back(p, p, 5.0), p));
    }

    #[test]
    fn variants_retreat_endpoints_by_growing_gaps() {
        let waypoints = [Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)];
        let variants = route_variants(
            &waypoints,
            4.0,
            4.0,
            &[2.0, 3.0, 4.0],
            RouteStyle::Spline,
            20,
            0.0,
        );
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].gap_multiplier, 2.0);
        assert!(close(variants[0].geometry.full_path[0], Vec2::new(8.0, 0.0)));
        assert!(close(
            variants[2].geometry.full_path[0],
            Vec2::new(16.0, 0.0)
        ));
        let last = *variants[1].geometry.full_path.last().unwrap();
        assert!(close(last, Vec2::new(88.0, 0.0)));
    }
}
