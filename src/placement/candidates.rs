use crate::anchor::{Compass, IMHOF_ORDER, anchored_box, segment_rotation_deg};
use crate::config::PlacementConfig;
use crate::element::{Anchor, Element, ElementKind};
use crate::geometry::{BBox, Vec2};

/// Which rule produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateRank {
    /// Compass position on the clearance ring, with the tier index of the
    /// ring it came from.
    Compass { dir: Compass, tier: usize },
    /// Index of the polyline segment the label sits on.
    Segment(usize),
    /// Manual offset override; the single candidate there is.
    Fixed,
}

/// One proposed placement: ephemeral, generated per element and discarded
/// once the engine accepts or rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Center of the proposed box.
    pub center: Vec2,
    pub rotation_deg: f32,
    /// Conflict-test extents: the axis-aligned enclosure of the (possibly
    /// rotated) footprint.
    pub bbox: BBox,
    pub rank: CandidateRank,
}

/// Ordered candidate list for an element.
///
/// `excluded` removes compass directions from arrow-endpoint rings (the
/// direction the paired label settled on). Degenerate elements produce an
/// empty list; the engine reports them as suppressed rather than erroring.
pub fn candidates_for(
    element: &Element,
    config: &PlacementConfig,
    excluded: Option<Compass>,
) -> Vec<Candidate> {
    if element.footprint.is_empty() {
        return Vec::new();
    }

    if let Some(offset) = element.offset {
        return fixed_candidate(element, offset).into_iter().collect();
    }

    match element.kind {
        ElementKind::PointLabel | ElementKind::EventMarker => point_candidates(element, config),
        ElementKind::PathLabel => path_candidates(element),
        ElementKind::ArrowEndpoint => endpoint_candidates(element, config, excluded),
    }
}

fn fixed_candidate(element: &Element, offset: Vec2) -> Option<Candidate> {
    let anchor = element.anchor.reference_point()?;
    let center = anchor + offset;
    Some(Candidate {
        center,
        rotation_deg: 0.0,
        bbox: BBox::from_center(center, element.footprint),
        rank: CandidateRank::Fixed,
    })
}

/// Point rule: the full Imhof ring at each clearance tier, nearest tier
/// first, every ring in Imhof order.
fn point_candidates(element: &Element, config: &PlacementConfig) -> Vec<Candidate> {
    let Anchor::Point(anchor) = element.anchor else {
        return Vec::new();
    };
    let clearance = config.clearance_for(element.kind);

    let mut candidates = Vec::with_capacity(config.clearance_tiers.len() * IMHOF_ORDER.len());
    for (tier, multiplier) in config.clearance_tiers.iter().enumerate() {
        for dir in IMHOF_ORDER {
            let bbox = anchored_box(anchor, dir, clearance * multiplier, element.footprint);
            candidates.push(Candidate {
                center: bbox.center(),
                rotation_deg: 0.0,
                bbox,
                rank: CandidateRank::Compass { dir, tier },
            });
        }
    }
    candidates
}

/// Path rule: one candidate per polyline segment, longest segment first,
/// label centered on the segment midpoint (shifted by the element's
/// normal offset) and rotated to the segment bearing.
fn path_candidates(element: &Element) -> Vec<Candidate> {
    let Anchor::Path(ref path) = element.anchor else {
        return Vec::new();
    };

    crate::anchor::rank_segments(path)
        .into_iter()
        .filter_map(|i| {
            let (a, b) = (path[i], path[i + 1]);
            let direction = (b - a).normalized();
            if direction == Vec2::ZERO {
                return None;
            }
            let rotation = segment_rotation_deg(a, b);
            let center = (a + b) * 0.5 + direction.perp() * element.normal_offset;
            let bbox = BBox::from_center(center, element.footprint).rotated_extents(rotation);
            Some(Candidate {
                center,
                rotation_deg: rotation,
                bbox,
                rank: CandidateRank::Segment(i),
            })
        })
        .collect()
}

/// Arrow endpoints get a single ring, minus the direction their paired
/// label occupies.
fn endpoint_candidates(
    element: &Element,
    config: &PlacementConfig,
    excluded: Option<Compass>,
) -> Vec<Candidate> {
    let Anchor::Point(anchor) = element.anchor else {
        return Vec::new();
    };
    let clearance = config.clearance_for(element.kind);

    IMHOF_ORDER
        .into_iter()
        .filter(|dir| Some(*dir) != excluded)
        .map(|dir| {
            let bbox = anchored_box(anchor, dir, clearance, element.footprint);
            Candidate {
                center: bbox.center(),
                rotation_deg: 0.0,
                bbox,
                rank: CandidateRank::Compass { dir, tier: 0 },
            }
        })
        .collect()
}
