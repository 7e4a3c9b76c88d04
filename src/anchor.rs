use std::f32::consts::FRAC_1_SQRT_2;

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Size, Vec2};

/// Compass direction around a point anchor.
///
/// Bearings follow the cartographic convention: 0 = north, clockwise.
/// Pixel space is y-down, so north points toward negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// Imhof candidate order: the 8 positions around a point anchor ranked by
/// cartographic legibility preference. This exact order is a content
/// contract relied on by map authors.
pub const IMHOF_ORDER: [Compass; 8] = [
    Compass::NE,
    Compass::E,
    Compass::NW,
    Compass::W,
    Compass::SE,
    Compass::SW,
    Compass::N,
    Compass::S,
];

impl Compass {
    /// Unit offset in y-down pixel space.
    pub fn unit(&self) -> Vec2 {
        let d = FRAC_1_SQRT_2;
        match self {
            Compass::N => Vec2::new(0.0, -1.0),
            Compass::NE => Vec2::new(d, -d),
            Compass::E => Vec2::new(1.0, 0.0),
            Compass::SE => Vec2::new(d, d),
            Compass::S => Vec2::new(0.0, 1.0),
            Compass::SW => Vec2::new(-d, d),
            Compass::W => Vec2::new(-1.0, 0.0),
            Compass::NW => Vec2::new(-d, -d),
        }
    }

    pub fn bearing_deg(&self) -> f32 {
        match self {
            Compass::N => 0.0,
            Compass::NE => 45.0,
            Compass::E => 90.0,
            Compass::SE => 135.0,
            Compass::S => 180.0,
            Compass::SW => 225.0,
            Compass::W => 270.0,
            Compass::NW => 315.0,
        }
    }

    pub fn opposite(&self) -> Compass {
        match self {
            Compass::N => Compass::S,
            Compass::NE => Compass::SW,
            Compass::E => Compass::W,
            Compass::SE => Compass::NW,
            Compass::S => Compass::N,
            Compass::SW => Compass::NE,
            Compass::W => Compass::E,
            Compass::NW => Compass::SE,
        }
    }

    /// Nearest compass direction for a bearing in degrees (0 = N, clockwise).
    pub fn from_bearing(bearing_deg: f32) -> Compass {
        let normalized = bearing_deg.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0) as usize % 8;
        [
            Compass::N,
            Compass::NE,
            Compass::E,
            Compass::SE,
            Compass::S,
            Compass::SW,
            Compass::W,
            Compass::NW,
        ][sector]
    }
}

/// Bearing from one point toward another (0 = north, clockwise), y-down.
pub fn bearing_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.x.atan2(-d.y).to_degrees().rem_euclid(360.0)
}

/// Natural approach direction of a route at its final anchor: the compass
/// sector the path arrives from, seen from the anchor.
pub fn approach_direction(prev: Vec2, anchor: Vec2) -> Compass {
    Compass::from_bearing(bearing_between(anchor, prev))
}

/// Candidate box for a footprint hung outward from a point anchor in the
/// given direction at the given clearance radius.
///
/// The box touches the anchor ring and extends away from it, so a NE label
/// has its bottom-left corner on the ring point, an E label its left edge
/// midpoint, and so on.
pub fn anchored_box(anchor: Vec2, dir: Compass, radius: f32, size: Size) -> BBox {
    let p = anchor + dir.unit() * radius;
    let (w, h) = (size.width, size.height);
    match dir {
        Compass::NE => BBox::new(p.x, p.y - h, w, h),
        Compass::E => BBox::new(p.x, p.y - h / 2.0, w, h),
        Compass::NW => BBox::new(p.x - w, p.y - h, w, h),
        Compass::W => BBox::new(p.x - w, p.y - h / 2.0, w, h),
        Compass::SE => BBox::new(p.x, p.y, w, h),
        Compass::SW => BBox::new(p.x - w, p.y, w, h),
        Compass::N => BBox::new(p.x - w / 2.0, p.y - h, w, h),
        Compass::S => BBox::new(p.x - w / 2.0, p.y, w, h),
    }
}

/// Segment indices of a polyline ranked longest-first, ties broken by
/// original segment order. Longer segments give a path label more room
/// and a steadier angle, so they are tried first.
pub fn rank_segments(path: &[Vec2]) -> Vec<usize> {
    if path.len() < 2 {
        return Vec::new();
    }
    let mut ranked: Vec<(usize, f32)> = path
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i, w[0].distance(w[1])))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    ranked.into_iter().map(|(i, _)| i).collect()
}

/// Label rotation along a segment, folded into the readable range
/// (-90, 90] so text never renders upside down.
pub fn segment_rotation_deg(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    let mut angle = d.y.atan2(d.x).to_degrees();
    if angle > 90.0 {
        angle -= 180.0;
    }
    if angle <= -90.0 {
        angle += 180.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::{
        Compass, IMHOF_ORDER, anchored_box, approach_direction, bearing_between, rank_segments,
        segment_rotation_deg,
    };
    use crate::geometry::{Size, Vec2};

    #[test]
    fn imhof_order_is_the_content_contract() {
        assert_eq!(
            IMHOF_ORDER,
            [
                Compass::NE,
                Compass::E,
                Compass::NW,
                Compass::W,
                Compass::SE,
                Compass::SW,
                Compass::N,
                Compass::S,
            ]
        );
    }

    #[test]
    fn north_points_up_in_pixel_space() {
        let n = Compass::N.unit();
        assert_eq!((n.x, n.y), (0.0, -1.0));
        let ne = Compass::NE.unit();
        assert!(ne.x > 0.0 && ne.y < 0.0);
        assert!((ne.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_between_cardinal_points() {
        let o = Vec2::ZERO;
        assert!((bearing_between(o, Vec2::new(0.0, -10.0)) - 0.0).abs() < 1e-4);
        assert!((bearing_between(o, Vec2::new(10.0, 0.0)) - 90.0).abs() < 1e-4);
        assert!((bearing_between(o, Vec2::new(0.0, 10.0)) - 180.0).abs() < 1e-4);
        assert!((bearing_between(o, Vec2::new(-10.0, 0.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn from_bearing_snaps_to_nearest_sector() {
        assert_eq!(Compass::from_bearing(10.0), Compass::N);
        assert_eq!(Compass::from_bearing(44.0), Compass::NE);
        assert_eq!(Compass::from_bearing(91.0), Compass::E);
        assert_eq!(Compass::from_bearing(359.0), Compass::N);
        assert_eq!(Compass::from_bearing(-45.0), Compass::NW);
    }

    #[test]
    fn approach_comes_from_the_previous_waypoint() {
        let anchor = Vec2::new(100.0, 100.0);
        let prev = Vec2::new(100.0, 160.0);
        assert_eq!(approach_direction(prev, anchor), Compass::S);
    }

    #[test]
    fn anchored_box_hangs_outward() {
        let size = Size::new(8.0, 4.0);
        let anchor = Vec2::ZERO;

        let ne = anchored_box(anchor, Compass::NE, 4.0, size);
        assert!(ne.x > 0.0);
        assert!(ne.bottom() < 0.0);

        let e = anchored_box(anchor, Compass::E, 4.0, size);
        assert_eq!(e.x, 4.0);
        assert!((e.center_y() - 0.0).abs() < 1e-6);

        let s = anchored_box(anchor, Compass::S, 4.0, size);
        assert!((s.center_x() - 0.0).abs() < 1e-6);
        assert_eq!(s.y, 4.0);

        let w = anchored_box(anchor, Compass::W, 4.0, size);
        assert_eq!(w.right(), -4.0);
    }

    #[test]
    fn segments_rank_longest_first_with_stable_ties() {
        // Lengths [50, 30, 80] -> order [2, 0, 1].
        let path = [
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 30.0),
            Vec2::new(130.0, 30.0),
        ];
        assert_eq!(rank_segments(&path), vec![2, 0, 1]);

        let tied = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
        ];
        assert_eq!(rank_segments(&tied), vec![0, 1]);
        assert!(rank_segments(&tied[..1]).is_empty());
    }

    #[test]
    fn rotation_stays_readable() {
        let a = Vec2::ZERO;
        assert_eq!(segment_rotation_deg(a, Vec2::new(10.0, 0.0)), 0.0);
        // Right-to-left segment folds back to horizontal.
        assert!(segment_rotation_deg(a, Vec2::new(-10.0, 0.0)).abs() < 1e-3);
        let steep = segment_rotation_deg(a, Vec2::new(1.0, 10.0));
        assert!(steep > -90.0 && steep <= 90.0);
    }
}
