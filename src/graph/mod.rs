//! Family-network graph: data model, layouts, curves, styling, rendering and
//! the interaction and animation state around them.

pub mod animation;
pub mod curve;
pub mod interact;
pub mod layout;
pub mod registry;
pub mod render;
pub mod sample;
pub mod style;
pub mod types;
pub mod view;

pub use animation::{
    ConnectionReveal, IntervalHandle, PhaseMode, PhaseTicker, RevealSection, Scheduler,
    VisibilityGate,
};
pub use curve::{CurveProfile, QuadCurve, curve};
pub use interact::{GraphEvents, Hit, PointerEvent, PointerRouter, hit_test};
pub use layout::{
    AuthoredLayout, BBox, ClusterKey, ClusterLayout, CoordinateMap, GlobeLayout, LayoutProvider,
};
pub use registry::{EntityRegistry, RelationshipRegistry};
pub use render::{GraphRenderer, NodeState, RenderOptions, Rendered, Scene};
pub use style::{ConnectionStyle, DecorationThresholds, NodeVariant, StrokeMapping, TrustTier};
pub use types::{
    Category, Entity, EntityId, GeoCoord, Location, Point, Point3, Relationship, RelationshipId,
};
pub use view::{CategoryFilter, FilteredView, NetworkStats, ViewState, filter_view};
