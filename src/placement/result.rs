use std::collections::HashMap;

use serde::Serialize;

use crate::geometry::{BBox, Vec2};

/// Why an element was left out of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressReason {
    /// Every generated candidate conflicted and the kind's fallback
    /// policy is `Suppress`.
    NoFreeCandidate,
    /// The element produced no candidates at all (degenerate anchor or
    /// empty footprint).
    NoCandidates,
}

/// Final placement decision for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// Conflict-free placement. `position` is the accepted box center.
    Placed {
        position: Vec2,
        rotation_deg: f32,
        bbox: BBox,
    },
    /// Accepted despite overlap because no candidate was free; the
    /// violation is explicit, never silent.
    Forced {
        position: Vec2,
        rotation_deg: f32,
        bbox: BBox,
        overlap_area: f32,
    },
    Suppressed { reason: SuppressReason },
}

impl Outcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, Outcome::Placed { .. })
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, Outcome::Forced { .. })
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Outcome::Suppressed { .. })
    }

    /// Accepted box center, if the element made it onto the map.
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Outcome::Placed { position, .. } | Outcome::Forced { position, .. } => Some(*position),
            Outcome::Suppressed { .. } => None,
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Outcome::Placed { bbox, .. } | Outcome::Forced { bbox, .. } => Some(*bbox),
            Outcome::Suppressed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEntry {
    pub id: String,
    pub outcome: Outcome,
}

/// Result of one resolution pass: exactly one outcome per input element,
/// in input order. Read-only once the pass completes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutResult {
    entries: Vec<LayoutEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LayoutResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, id: String, outcome: Outcome) {
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(LayoutEntry { id, outcome });
    }

    pub fn get(&self, id: &str) -> Option<&Outcome> {
        self.index.get(id).map(|&i| &self.entries[i].outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn placed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_placed()).count()
    }

    pub fn forced_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_forced()).count()
    }

    pub fn suppressed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_suppressed())
            .count()
    }

    pub fn forced_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_forced())
            .map(|e| e.id.as_str())
            .collect()
    }

    pub fn suppressed_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_suppressed())
            .map(|e| e.id.as_str())
            .collect()
    }
}

/// Accepted geometry variant for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteChoice {
    pub id: String,
    /// Index into the route's variant list.
    pub variant_index: usize,
    pub gap_multiplier: f32,
    /// True when every variant conflicted and the widest one was taken.
    pub forced: bool,
    pub overlap_area: f32,
}

#[cfg(test)]
mod tests {
    use super::{LayoutResult, Outcome, SuppressReason};
    use crate::geometry::{BBox, Vec2};

    fn placed(x: f32, y: f32) -> Outcome {
        Outcome::Placed {
            position: Vec2::new(x, y),
            rotation_deg: 0.0,
            bbox: BBox::from_center(Vec2::new(x, y), crate::geometry::Size::new(8.0, 4.0)),
        }
    }

    #[test]
    fn lookup_by_id_and_input_order_iteration() {
        let mut result = LayoutResult::new();
        result.push("b".to_string(), placed(1.0, 1.0));
        result.push(
            "a".to_string(),
            Outcome::Suppressed {
                reason: SuppressReason::NoFreeCandidate,
            },
        );

        assert_eq!(result.len(), 2);
        assert!(result.get("b").unwrap().is_placed());
        assert!(result.get("a").unwrap().is_suppressed());
        let ids: Vec<&str> = result.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(result.suppressed_ids(), vec!["a"]);
    }

    #[test]
    fn counts_partition_the_entries() {
        let mut result = LayoutResult::new();
        result.push("p".to_string(), placed(0.0, 0.0));
        result.push(
            "f".to_string(),
            Outcome::Forced {
                position: Vec2::ZERO,
                rotation_deg: 0.0,
                bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
                overlap_area: 0.5,
            },
        );
        result.push(
            "s".to_string(),
            Outcome::Suppressed {
                reason: SuppressReason::NoCandidates,
            },
        );

        assert_eq!(
            result.placed_count() + result.forced_count() + result.suppressed_count(),
            result.len()
        );
        assert_eq!(result.forced_ids(), vec!["f"]);
    }

    #[test]
    fn outcomes_expose_positions_only_when_on_the_map() {
        assert!(placed(2.0, 3.0).position().is_some());
        let suppressed = Outcome::Suppressed {
            reason: SuppressReason::NoFreeCandidate,
        };
        assert_eq!(suppressed.position(), None);
        assert_eq!(suppressed.bbox(), None);
    }

    #[test]
    fn result_serializes_for_diagnostics() {
        let mut result = LayoutResult::new();
        result.push("city_susa".to_string(), placed(4.0, 5.0));
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains("city_susa"));
        assert!(json.contains("\"status\":\"placed\""));
    }
}
