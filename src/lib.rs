//! Deterministic decluttering for static historical maps.
//!
//! Given labels, event markers, arrow endpoints and campaign routes with
//! pre-measured footprints, the engine assigns each a position that does
//! not collide with anything already on the map, honoring a fixed
//! priority order and the Imhof compass-position convention. When no
//! clean position exists the outcome is an explicit `Forced` or
//! `Suppressed` state, never a silent overlap.
//!
//! ```
//! use placard::{
//!     Element, HeuristicEstimator, PlacementConfig, PlacementEngine, TextStyle, Vec2, tier,
//! };
//!
//! let mut estimator = HeuristicEstimator::new();
//! let style = TextStyle::plain(10.0);
//! let cities = vec![
//!     Element::point_label(
//!         "city_babylon",
//!         Vec2::new(220.0, 140.0),
//!         "Babylon",
//!         &style,
//!         tier::CITY_PRIMARY,
//!         &mut estimator,
//!     ),
//!     Element::point_label(
//!         "city_susa",
//!         Vec2::new(244.0, 146.0),
//!         "Susa",
//!         &style,
//!         tier::CITY_SECONDARY,
//!         &mut estimator,
//!     ),
//! ];
//!
//! let mut engine = PlacementEngine::new(PlacementConfig::default()).unwrap();
//! let layout = engine.resolve(&cities);
//! assert_eq!(layout.len(), 2);
//! assert!(layout.get("city_babylon").unwrap().is_placed());
//! ```

pub mod anchor;
pub mod config;
pub mod element;
pub mod footprint;
pub mod geometry;
pub mod placement;
pub mod route;

pub use anchor::{Compass, IMHOF_ORDER};
pub use config::{FallbackPolicy, PlacementConfig};
pub use element::{Anchor, Element, ElementKind, tier};
pub use footprint::{FootprintEstimator, HeuristicEstimator, TextStyle};
pub use geometry::{BBox, Size, Vec2};
pub use placement::{LayoutResult, Outcome, PlacementEngine, Route, RouteChoice, SuppressReason};
pub use route::{RouteGeometry, RouteStyle, RouteVariant, route_variants};
