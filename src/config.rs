use serde::{Deserialize, Serialize};

use crate::element::ElementKind;
use crate::route::RouteStyle;

const POINT_LABEL_CLEARANCE: f32 = 6.0;
const EVENT_MARKER_CLEARANCE: f32 = 5.0;
const ARROW_ENDPOINT_CLEARANCE: f32 = 6.0;
const OVERLAP_PADDING: f32 = 1.5;
const ROUTE_STROKE_WIDTH: f32 = 3.0;
const ROUTE_SAMPLES_PER_LEG: usize = 50;
const ROUTE_CURVATURE: f32 = 0.0;

/// What to do when every candidate of an element conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Accept the candidate with the smallest summed overlap area and
    /// record the violation.
    ForceLeastOverlap,
    /// Leave the element out of the layout.
    Suppress,
}

/// Engine configuration. Defaults match the reference map styles; maps
/// can override individual options from a TOML or YAML fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Anchor-ring radius per element kind, in output pixels.
    #[serde(default = "default_point_label_clearance")]
    pub point_label_clearance: f32,
    #[serde(default = "default_event_marker_clearance")]
    pub event_marker_clearance: f32,
    #[serde(default = "default_arrow_endpoint_clearance")]
    pub arrow_endpoint_clearance: f32,

    /// Margin added to each box before conflict testing, so visually
    /// touching labels still count as colliding.
    #[serde(default = "default_overlap_padding")]
    pub overlap_padding: f32,

    /// Clearance-radius multipliers for point-anchor candidate rings,
    /// nearest ring first. Each ring repeats the full Imhof order.
    #[serde(default = "default_clearance_tiers")]
    pub clearance_tiers: Vec<f32>,

    /// Fallback policy per element kind.
    #[serde(default = "default_fallback")]
    pub point_label_fallback: FallbackPolicy,
    #[serde(default = "default_fallback")]
    pub path_label_fallback: FallbackPolicy,
    #[serde(default = "default_fallback")]
    pub event_marker_fallback: FallbackPolicy,
    #[serde(default = "default_fallback")]
    pub arrow_endpoint_fallback: FallbackPolicy,

    /// Whether arrow-endpoint candidates skip the compass direction the
    /// paired label settled on.
    #[serde(default = "default_true")]
    pub exclude_label_directions: bool,

    /// Endpoint gap multipliers for route variants, shortest first.
    #[serde(default = "default_route_gaps")]
    pub route_gap_multipliers: Vec<f32>,
    #[serde(default = "default_route_stroke_width")]
    pub route_stroke_width: f32,
    #[serde(default = "default_route_samples")]
    pub route_samples_per_leg: usize,
    #[serde(default = "default_route_curvature")]
    pub route_curvature: f32,
    #[serde(default = "default_route_style")]
    pub route_style: RouteStyle,
}

fn default_point_label_clearance() -> f32 {
    POINT_LABEL_CLEARANCE
}
fn default_event_marker_clearance() -> f32 {
    EVENT_MARKER_CLEARANCE
}
fn default_arrow_endpoint_clearance() -> f32 {
    ARROW_ENDPOINT_CLEARANCE
}
fn default_overlap_padding() -> f32 {
    OVERLAP_PADDING
}
fn default_clearance_tiers() -> Vec<f32> {
    vec![1.0, 1.5, 2.0]
}
fn default_fallback() -> FallbackPolicy {
    FallbackPolicy::ForceLeastOverlap
}
fn default_true() -> bool {
    true
}
fn default_route_gaps() -> Vec<f32> {
    vec![2.0, 3.0, 4.0]
}
fn default_route_stroke_width() -> f32 {
    ROUTE_STROKE_WIDTH
}
fn default_route_samples() -> usize {
    ROUTE_SAMPLES_PER_LEG
}
fn default_route_curvature() -> f32 {
    ROUTE_CURVATURE
}
fn default_route_style() -> RouteStyle {
    RouteStyle::Spline
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            point_label_clearance: POINT_LABEL_CLEARANCE,
            event_marker_clearance: EVENT_MARKER_CLEARANCE,
            arrow_endpoint_clearance: ARROW_ENDPOINT_CLEARANCE,
            overlap_padding: OVERLAP_PADDING,
            clearance_tiers: default_clearance_tiers(),
            point_label_fallback: FallbackPolicy::ForceLeastOverlap,
            path_label_fallback: FallbackPolicy::ForceLeastOverlap,
            event_marker_fallback: FallbackPolicy::ForceLeastOverlap,
            arrow_endpoint_fallback: FallbackPolicy::ForceLeastOverlap,
            exclude_label_directions: true,
            route_gap_multipliers: default_route_gaps(),
            route_stroke_width: ROUTE_STROKE_WIDTH,
            route_samples_per_leg: ROUTE_SAMPLES_PER_LEG,
            route_curvature: ROUTE_CURVATURE,
            route_style: RouteStyle::Spline,
        }
    }
}

impl PlacementConfig {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: PlacementConfig = toml::from_str(content)
            .map_err(|e| format!("Failed to parse placement TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let config: PlacementConfig = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse placement YAML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.point_label_clearance < 0.0
            || self.event_marker_clearance < 0.0
            || self.arrow_endpoint_clearance < 0.0
        {
            return Err("Clearance radii must be non-negative".to_string());
        }
        if self.overlap_padding < 0.0 {
            return Err("Overlap padding must be non-negative".to_string());
        }
        if self.clearance_tiers.is_empty() {
            return Err("At least one clearance tier is required".to_string());
        }
        if self.clearance_tiers.iter().any(|m| *m <= 0.0) {
            return Err("Clearance tier multipliers must be positive".to_string());
        }
        if self.route_gap_multipliers.is_empty() {
            return Err("At least one route gap multiplier is required".to_string());
        }
        if self.route_stroke_width <= 0.0 {
            return Err("Route stroke width must be positive".to_string());
        }
        if self.route_samples_per_leg < 2 {
            return Err("Route sampling needs at least 2 points per leg".to_string());
        }
        Ok(())
    }

    pub fn clearance_for(&self, kind: ElementKind) -> f32 {
        match kind {
            ElementKind::PointLabel | ElementKind::PathLabel => self.point_label_clearance,
            ElementKind::EventMarker => self.event_marker_clearance,
            ElementKind::ArrowEndpoint => self.arrow_endpoint_clearance,
        }
    }

    pub fn fallback_for(&self, kind: ElementKind) -> FallbackPolicy {
        match kind {
            ElementKind::PointLabel => self.point_label_fallback,
            ElementKind::PathLabel => self.path_label_fallback,
            ElementKind::EventMarker => self.event_marker_fallback,
            ElementKind::ArrowEndpoint => self.arrow_endpoint_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FallbackPolicy, PlacementConfig};

    #[test]
    fn defaults_validate() {
        assert!(PlacementConfig::default().validate().is_ok());
    }

    #[test]
    fn from_toml_overrides_only_named_options() {
        let config = PlacementConfig::from_toml(
            r#"
point_label_clearance = 8.0
event_marker_fallback = "suppress"
clearance_tiers = [1.0, 1.3, 1.6]
"#,
        )
        .expect("toml fragment");

        assert_eq!(config.point_label_clearance, 8.0);
        assert_eq!(config.event_marker_fallback, FallbackPolicy::Suppress);
        assert_eq!(config.clearance_tiers, vec![1.0, 1.3, 1.6]);
        // Unnamed options keep their defaults.
        assert_eq!(config.overlap_padding, PlacementConfig::default().overlap_padding);
        assert!(config.exclude_label_directions);
    }

    #[test]
    fn from_yaml_parses_the_same_surface() {
        let config = PlacementConfig::from_yaml(
            "arrow_endpoint_fallback: suppress\nexclude_label_directions: false\n",
        )
        .expect("yaml fragment");
        assert_eq!(config.arrow_endpoint_fallback, FallbackPolicy::Suppress);
        assert!(!config.exclude_label_directions);
    }

    #[test]
    fn invalid_fragments_are_rejected() {
        assert!(PlacementConfig::from_toml("clearance_tiers = []").is_err());
        assert!(PlacementConfig::from_toml("overlap_padding = -1.0").is_err());
        assert!(PlacementConfig::from_toml("route_samples_per_leg = 1").is_err());
        assert!(PlacementConfig::from_yaml("route_stroke_width: 0.0").is_err());
    }
}
