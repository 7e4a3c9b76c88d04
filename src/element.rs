use serde::{Deserialize, Serialize};

use crate::footprint::{FootprintEstimator, TextStyle};
use crate::geometry::{Size, Vec2};

/// Placement priority tiers, lower value = placed first.
///
/// Spaced in decades so map styles can slot custom tiers between them.
/// Every city label tier precedes `ROUTE_ARROW`: a route endpoint must
/// only pick its direction after the label at the same anchor has
/// settled.
pub mod tier {
    pub const CITY_PRIMARY: u16 = 10;
    pub const EVENT_MARKER: u16 = 20;
    pub const CITY_SECONDARY: u16 = 30;
    pub const CITY_TERTIARY: u16 = 40;
    pub const EVENT_LABEL: u16 = 50;
    pub const ROUTE_ARROW: u16 = 60;
    pub const CITY_MODERN: u16 = 70;
    pub const ROUTE_LABEL: u16 = 80;
    pub const RIVER: u16 = 90;
    pub const REGION: u16 = 100;
}

/// What the element is, which decides how candidates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    PointLabel,
    PathLabel,
    EventMarker,
    ArrowEndpoint,
}

/// Geometric reference an element is positioned relative to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    Point(Vec2),
    Path(Vec<Vec2>),
}

impl Anchor {
    /// Representative point of the anchor, used for diagnostics.
    pub fn reference_point(&self) -> Option<Vec2> {
        match self {
            Anchor::Point(p) => Some(*p),
            Anchor::Path(points) => points.first().copied(),
        }
    }
}

/// Unit of placement. Immutable once constructed; the engine reads it and
/// records the outcome in the layout result, never mutating the element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub anchor: Anchor,
    /// Lower value = higher placement priority; ties break by declaration
    /// order.
    pub priority: u16,
    /// Pre-measured footprint in output pixels.
    pub footprint: Size,
    /// Manual override: a single fixed candidate at anchor + offset
    /// instead of the generated ring.
    pub offset: Option<Vec2>,
    /// Path labels: signed shift along the segment normal (above/below
    /// the line).
    pub normal_offset: f32,
    /// Elements sharing a group never count as colliding with each other
    /// (a city's own dot, icon and label family).
    pub group: Option<String>,
    /// Arrow endpoints: id of the label at the same anchor whose accepted
    /// direction must be avoided.
    pub paired_label: Option<String>,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        kind: ElementKind,
        anchor: Anchor,
        priority: u16,
        footprint: Size,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            anchor,
            priority,
            footprint,
            offset: None,
            normal_offset: 0.0,
            group: None,
            paired_label: None,
        }
    }

    /// Point label with its footprint measured through the injected
    /// estimator.
    pub fn point_label(
        id: impl Into<String>,
        anchor: Vec2,
        text: &str,
        style: &TextStyle,
        priority: u16,
        estimator: &mut dyn FootprintEstimator,
    ) -> Self {
        Self::new(
            id,
            ElementKind::PointLabel,
            Anchor::Point(anchor),
            priority,
            estimator.measure(text, style),
        )
    }

    /// Label following a polyline (river, campaign annotation).
    pub fn path_label(
        id: impl Into<String>,
        path: Vec<Vec2>,
        text: &str,
        style: &TextStyle,
        priority: u16,
        estimator: &mut dyn FootprintEstimator,
    ) -> Self {
        Self::new(
            id,
            ElementKind::PathLabel,
            Anchor::Path(path),
            priority,
            estimator.measure(text, style),
        )
    }

    /// Standalone event marker (battle, treaty, crossing).
    pub fn event_marker(id: impl Into<String>, anchor: Vec2, footprint: Size) -> Self {
        Self::new(
            id,
            ElementKind::EventMarker,
            Anchor::Point(anchor),
            tier::EVENT_MARKER,
            footprint,
        )
    }

    /// Arrowhead decoration terminating on a city's anchor ring.
    pub fn arrow_endpoint(
        id: impl Into<String>,
        anchor: Vec2,
        footprint: Size,
        paired_label: Option<String>,
    ) -> Self {
        let mut element = Self::new(
            id,
            ElementKind::ArrowEndpoint,
            Anchor::Point(anchor),
            tier::ROUTE_ARROW,
            footprint,
        );
        element.paired_label = paired_label;
        element
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_normal_offset(mut self, normal_offset: f32) -> Self {
        self.normal_offset = normal_offset;
        self
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }
}
