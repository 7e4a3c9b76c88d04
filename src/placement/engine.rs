use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::anchor::Compass;
use crate::config::{FallbackPolicy, PlacementConfig};
use crate::element::{Element, ElementKind};
use crate::geometry::BBox;
use crate::route::RouteVariant;

use super::candidates::{Candidate, CandidateRank, candidates_for};
use super::result::{LayoutResult, Outcome, RouteChoice, SuppressReason};

const GRID_CELL: f32 = 64.0;

/// A campaign route to resolve: geometry variants at growing endpoint
/// gaps, shortest first.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub priority: u16,
    pub group: Option<String>,
    pub variants: Vec<RouteVariant>,
}

#[derive(Debug, Clone)]
struct Occupied {
    /// Extents grown by the overlap padding; conflict tests run directly
    /// against these.
    bbox: BBox,
    id: String,
    group: Option<String>,
}

/// Uniform grid over occupied boxes. Keeps per-candidate conflict tests
/// sub-linear once a map accumulates hundreds of boxes.
#[derive(Debug, Default)]
struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    fn cell_range(bbox: &BBox) -> (i32, i32, i32, i32) {
        (
            (bbox.x / GRID_CELL).floor() as i32,
            (bbox.y / GRID_CELL).floor() as i32,
            (bbox.right() / GRID_CELL).floor() as i32,
            (bbox.bottom() / GRID_CELL).floor() as i32,
        )
    }

    fn insert(&mut self, idx: usize, bbox: &BBox) {
        let (x0, y0, x1, y1) = Self::cell_range(bbox);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(idx);
            }
        }
    }

    fn query(&self, bbox: &BBox) -> Vec<usize> {
        let (x0, y0, x1, y1) = Self::cell_range(bbox);
        let mut hits = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(indices) = self.cells.get(&(cx, cy)) {
                    hits.extend_from_slice(indices);
                }
            }
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}

/// The greedy placement engine.
///
/// Owns the occupied-space set for exactly one map; resolving several
/// maps concurrently means one engine each. A resolution pass is a
/// straight-line sequential walk with no backtracking: once a box is
/// accepted it stays for the rest of the pass.
pub struct PlacementEngine {
    config: PlacementConfig,
    occupied: Vec<Occupied>,
    grid: SpatialGrid,
    /// Compass direction each compass-ranked element settled on, consumed
    /// by arrow-endpoint candidate filtering.
    accepted_dirs: HashMap<String, Compass>,
}

impl PlacementEngine {
    pub fn new(config: PlacementConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            config,
            occupied: Vec::new(),
            grid: SpatialGrid::default(),
            accepted_dirs: HashMap::new(),
        })
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Seed an immovable box: a city dot, a centered icon, or a placed
    /// box carried over from a previous pass.
    pub fn add_obstacle(&mut self, id: impl Into<String>, bbox: BBox, group: Option<&str>) {
        self.push_occupied(id.into(), bbox, group.map(str::to_string));
    }

    /// Resolve every element in one deterministic pass.
    ///
    /// Elements are processed by ascending priority, ties broken by
    /// declaration order; the result reports outcomes in declaration
    /// order. The engine never fails: every element receives exactly one
    /// outcome.
    pub fn resolve(&mut self, elements: &[Element]) -> LayoutResult {
        let mut order: Vec<usize> = (0..elements.len()).collect();
        order.sort_by_key(|&i| (elements[i].priority, i));

        let mut outcomes: Vec<Option<Outcome>> = vec![None; elements.len()];
        for &i in &order {
            let element = &elements[i];
            let excluded = self.excluded_direction(element);
            let candidates = candidates_for(element, &self.config, excluded);
            outcomes[i] = Some(self.place_one(element, &candidates));
        }

        let mut result = LayoutResult::new();
        for (element, outcome) in elements.iter().zip(outcomes) {
            if let Some(outcome) = outcome {
                result.push(element.id.clone(), outcome);
            }
        }

        debug!(
            placed = result.placed_count(),
            forced = result.forced_count(),
            suppressed = result.suppressed_count(),
            "resolution pass complete"
        );
        result
    }

    /// Resolve route geometry variants, shortest endpoint gap first.
    ///
    /// An accepted route's sampled extents join the occupied set under
    /// the route's group, so later labels avoid the drawn arrow. Routes
    /// with no variants are skipped with a warning.
    pub fn resolve_routes(&mut self, routes: &[Route]) -> Vec<RouteChoice> {
        let mut order: Vec<usize> = (0..routes.len()).collect();
        order.sort_by_key(|&i| (routes[i].priority, i));

        let mut choices: Vec<Option<RouteChoice>> = vec![None; routes.len()];
        for &i in &order {
            let route = &routes[i];
            if route.variants.is_empty() {
                warn!(id = %route.id, "route has no geometry variants, skipping");
                continue;
            }
            choices[i] = Some(self.choose_variant(route));
        }
        choices.into_iter().flatten().collect()
    }

    /// Pairwise audit of everything accepted so far: pairs of distinct
    /// element ids whose padded boxes intersect (same-group pairs are
    /// exempt). Placed-only layouts audit clean; forced placements show
    /// up here.
    pub fn audit_overlaps(&self) -> Vec<(String, String)> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut pairs = Vec::new();
        for (i, a) in self.occupied.iter().enumerate() {
            for b in &self.occupied[i + 1..] {
                if a.id == b.id {
                    continue;
                }
                if a.group.is_some() && a.group == b.group {
                    continue;
                }
                if a.bbox.intersects(&b.bbox) {
                    let key = (a.id.clone(), b.id.clone());
                    if seen.insert(key.clone()) {
                        pairs.push(key);
                    }
                }
            }
        }
        pairs
    }

    fn excluded_direction(&self, element: &Element) -> Option<Compass> {
        if element.kind != ElementKind::ArrowEndpoint || !self.config.exclude_label_directions {
            return None;
        }
        element
            .paired_label
            .as_deref()
            .and_then(|id| self.accepted_dirs.get(id))
            .copied()
    }

    fn place_one(&mut self, element: &Element, candidates: &[Candidate]) -> Outcome {
        if candidates.is_empty() {
            warn!(id = %element.id, "no candidates generated, suppressing");
            return Outcome::Suppressed {
                reason: SuppressReason::NoCandidates,
            };
        }

        let group = element.group.as_deref();
        for candidate in candidates {
            if !self.has_conflict(&candidate.bbox, group) {
                self.accept(element, candidate);
                debug!(id = %element.id, rank = ?candidate.rank, "placed");
                return Outcome::Placed {
                    position: candidate.center,
                    rotation_deg: candidate.rotation_deg,
                    bbox: candidate.bbox,
                };
            }
        }

        match self.config.fallback_for(element.kind) {
            FallbackPolicy::Suppress => {
                warn!(id = %element.id, "no free candidate, suppressed");
                Outcome::Suppressed {
                    reason: SuppressReason::NoFreeCandidate,
                }
            }
            FallbackPolicy::ForceLeastOverlap => {
                let mut best = &candidates[0];
                let mut best_cost = f32::MAX;
                for candidate in candidates {
                    let cost = self.conflict_cost(&candidate.bbox, group);
                    if cost < best_cost {
                        best = candidate;
                        best_cost = cost;
                    }
                }
                self.accept(element, best);
                warn!(id = %element.id, overlap = best_cost, "forced placement");
                Outcome::Forced {
                    position: best.center,
                    rotation_deg: best.rotation_deg,
                    bbox: best.bbox,
                    overlap_area: best_cost,
                }
            }
        }
    }

    fn choose_variant(&mut self, route: &Route) -> RouteChoice {
        let group = route.group.as_deref();

        for (idx, variant) in route.variants.iter().enumerate() {
            let boxes = self.route_boxes(variant);
            if boxes.iter().all(|b| !self.has_conflict(b, group)) {
                self.accept_route(route, &boxes);
                debug!(id = %route.id, gap = variant.gap_multiplier, "route placed");
                return RouteChoice {
                    id: route.id.clone(),
                    variant_index: idx,
                    gap_multiplier: variant.gap_multiplier,
                    forced: false,
                    overlap_area: 0.0,
                };
            }
        }

        // Every gap conflicts: take the widest, which clears the anchor
        // symbols the furthest, and report the violation.
        let idx = route.variants.len() - 1;
        let variant = &route.variants[idx];
        let boxes = self.route_boxes(variant);
        let overlap_area: f32 = boxes.iter().map(|b| self.conflict_cost(b, group)).sum();
        self.accept_route(route, &boxes);
        warn!(id = %route.id, overlap = overlap_area, "route forced at widest gap");
        RouteChoice {
            id: route.id.clone(),
            variant_index: idx,
            gap_multiplier: variant.gap_multiplier,
            forced: true,
            overlap_area,
        }
    }

    /// Thin boxes along the sampled path, inflated to the stroke width.
    fn route_boxes(&self, variant: &RouteVariant) -> Vec<BBox> {
        let half = self.config.route_stroke_width / 2.0;
        variant
            .geometry
            .full_path
            .windows(2)
            .map(|w| BBox::from_segment(w[0], w[1]).with_padding(half))
            .collect()
    }

    fn accept(&mut self, element: &Element, candidate: &Candidate) {
        if let CandidateRank::Compass { dir, .. } = candidate.rank {
            self.accepted_dirs.insert(element.id.clone(), dir);
        }
        self.push_occupied(element.id.clone(), candidate.bbox, element.group.clone());
    }

    fn accept_route(&mut self, route: &Route, boxes: &[BBox]) {
        for bbox in boxes {
            self.push_occupied(route.id.clone(), *bbox, route.group.clone());
        }
    }

    fn push_occupied(&mut self, id: String, bbox: BBox, group: Option<String>) {
        let padded = bbox.with_padding(self.config.overlap_padding);
        let idx = self.occupied.len();
        self.grid.insert(idx, &padded);
        self.occupied.push(Occupied {
            bbox: padded,
            id,
            group,
        });
    }

    fn has_conflict(&self, bbox: &BBox, group: Option<&str>) -> bool {
        let padded = bbox.with_padding(self.config.overlap_padding);
        self.grid.query(&padded).into_iter().any(|idx| {
            let occupied = &self.occupied[idx];
            if group.is_some() && occupied.group.as_deref() == group {
                return false;
            }
            padded.intersects(&occupied.bbox)
        })
    }

    /// Summed overlap area of the padded box against the occupied set,
    /// used to rank forced placements.
    fn conflict_cost(&self, bbox: &BBox, group: Option<&str>) -> f32 {
        let padded = bbox.with_padding(self.config.overlap_padding);
        self.grid
            .query(&padded)
            .into_iter()
            .map(|idx| {
                let occupied = &self.occupied[idx];
                if group.is_some() && occupied.group.as_deref() == group {
                    0.0
                } else {
                    padded.intersection_area(&occupied.bbox)
                }
            })
            .sum()
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::PlacementEngine;
    use crate::config::PlacementConfig;
    use crate::element::{Anchor, Element, ElementKind, tier};
    use crate::geometry::{Size, Vec2};

    fn arb_elements() -> impl Strategy<Value = Vec<Element>> {
        proptest::collection::vec(
            (
                0.0f32..400.0,
                0.0f32..400.0,
                4.0f32..40.0,
                4.0f32..20.0,
                prop_oneof![
                    Just(tier::CITY_PRIMARY),
                    Just(tier::CITY_SECONDARY),
                    Just(tier::CITY_TERTIARY),
                    Just(tier::EVENT_LABEL),
                ],
            ),
            0..12,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(index, (x, y, w, h, priority))| {
                    Element::new(
                        format!("element_{}", index),
                        ElementKind::PointLabel,
                        Anchor::Point(Vec2::new(x, y)),
                        priority,
                        Size::new(w, h),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn every_element_gets_exactly_one_outcome(elements in arb_elements()) {
            let mut engine = PlacementEngine::new(PlacementConfig::default()).unwrap();
            let result = engine.resolve(&elements);
            prop_assert_eq!(result.len(), elements.len());
            prop_assert_eq!(
                result.placed_count() + result.forced_count() + result.suppressed_count(),
                elements.len()
            );
            for element in &elements {
                prop_assert!(result.get(&element.id).is_some());
            }
        }

        #[test]
        fn passes_are_deterministic(elements in arb_elements()) {
            let mut first = PlacementEngine::new(PlacementConfig::default()).unwrap();
            let mut second = PlacementEngine::new(PlacementConfig::default()).unwrap();
            let a = serde_json::to_string(&first.resolve(&elements)).unwrap();
            let b = serde_json::to_string(&second.resolve(&elements)).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn placed_boxes_stay_disjoint(elements in arb_elements()) {
            let mut engine = PlacementEngine::new(PlacementConfig::default()).unwrap();
            let result = engine.resolve(&elements);
            let padding = engine.config().overlap_padding;
            let placed: Vec<_> = result
                .iter()
                .filter(|e| e.outcome.is_placed())
                .filter_map(|e| e.outcome.bbox())
                .collect();
            for (i, a) in placed.iter().enumerate() {
                for b in &placed[i + 1..] {
                    prop_assert!(
                        !a.with_padding(padding).intersects(&b.with_padding(padding))
                    );
                }
            }
        }
    }
}
