use std::collections::HashMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::registry::EntityRegistry;
use super::types::{Entity, EntityId, GeoCoord, Point, Point3};

/// Bounding box in canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn with_padding(&self, padding: f64) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    /// Smallest box holding every point, `None` for no points. Non-finite
    /// points are ignored.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut bounds: Option<(Point, Point)> = None;
        for p in points.into_iter().filter(|p| p.is_finite()) {
            bounds = Some(match bounds {
                None => (p, p),
                Some((lo, hi)) => (
                    Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Point::new(hi.x.max(p.x), hi.y.max(p.y)),
                ),
            });
        }
        bounds.map(|(lo, hi)| Self::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y))
    }

    pub fn union(&self, other: &BBox) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Area of the overlap with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &BBox) -> f64 {
        let w = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        w * h
    }
}

/// Entity id → canvas point. A missing id is a normal outcome: consumers skip
/// the entity and every relationship touching it.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMap {
    points: HashMap<EntityId, Point>,
}

impl CoordinateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: EntityId, point: Point) {
        self.points.insert(id, point);
    }

    pub fn get(&self, id: &EntityId) -> Option<Point> {
        self.points.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(EntityId, Point)> for CoordinateMap {
    fn from_iter<I: IntoIterator<Item = (EntityId, Point)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Maps a registry onto the drawing surface. Implementations are
/// deterministic: the same registry always yields the same map.
pub trait LayoutProvider {
    fn layout(&self, entities: &EntityRegistry) -> CoordinateMap;
}

/// A literal id → point table.
#[derive(Debug, Clone, Default)]
pub struct AuthoredLayout {
    table: HashMap<EntityId, Point>,
}

impl AuthoredLayout {
    pub fn new(table: impl IntoIterator<Item = (EntityId, Point)>) -> Self {
        Self {
            table: table.into_iter().collect(),
        }
    }

    pub fn position(&self, id: &EntityId) -> Option<Point> {
        self.table.get(id).copied()
    }
}

impl LayoutProvider for AuthoredLayout {
    fn layout(&self, entities: &EntityRegistry) -> CoordinateMap {
        entities
            .iter()
            .filter_map(|e| self.position(&e.id).map(|p| (e.id.clone(), p)))
            .collect()
    }
}

/// How entities are grouped by the cluster layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKey {
    /// The entity's declared `cluster`, falling back to its city.
    #[default]
    Declared,
    City,
    Country,
}

impl ClusterKey {
    fn key_for(self, entity: &Entity) -> String {
        match self {
            ClusterKey::Declared => entity
                .cluster
                .clone()
                .unwrap_or_else(|| entity.location.city.clone()),
            ClusterKey::City => entity.location.city.clone(),
            ClusterKey::Country => entity.location.country.clone(),
        }
        .to_lowercase()
    }
}

/// First four members of a cluster sit on this diamond around the center.
const CLUSTER_DIAMOND: [(f64, f64); 4] = [(0.0, -80.0), (-40.0, 0.0), (40.0, 0.0), (0.0, 80.0)];
const RING_SLOTS: usize = 8;
const RING_RADIUS: f64 = 120.0;
const RING_STEP: f64 = 40.0;

/// Offset of the `index`th member from its cluster center.
pub fn cluster_offset(index: usize) -> Point {
    if let Some(&(dx, dy)) = CLUSTER_DIAMOND.get(index) {
        return Point::new(dx, dy);
    }
    let ring_index = index - CLUSTER_DIAMOND.len();
    let ring = ring_index / RING_SLOTS;
    let slot = ring_index % RING_SLOTS;
    let radius = RING_RADIUS + ring as f64 * RING_STEP;
    let angle = slot as f64 * (2.0 * PI / RING_SLOTS as f64);
    Point::new(radius * angle.cos(), radius * angle.sin())
}

/// Center-of-cluster plus fixed per-member offset. No collision resolution.
#[derive(Debug, Clone)]
pub struct ClusterLayout {
    pub key: ClusterKey,
    pub origin: Point,
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
}

impl Default for ClusterLayout {
    fn default() -> Self {
        Self {
            key: ClusterKey::Declared,
            origin: Point::new(160.0, 160.0),
            columns: 3,
            spacing_x: 260.0,
            spacing_y: 260.0,
        }
    }
}

impl ClusterLayout {
    /// Cluster names in order of first appearance, each with its members.
    pub fn clusters<'a>(&self, entities: &'a EntityRegistry) -> Vec<(String, Vec<&'a Entity>)> {
        let mut clusters: Vec<(String, Vec<&Entity>)> = Vec::new();
        for entity in entities.iter() {
            let key = self.key.key_for(entity);
            match clusters.iter_mut().find(|(name, _)| *name == key) {
                Some((_, members)) => members.push(entity),
                None => clusters.push((key, vec![entity])),
            }
        }
        clusters
    }

    pub fn cluster_center(&self, cluster_index: usize) -> Point {
        let columns = self.columns.max(1);
        let col = cluster_index % columns;
        let row = cluster_index / columns;
        Point::new(
            self.origin.x + col as f64 * self.spacing_x,
            self.origin.y + row as f64 * self.spacing_y,
        )
    }
}

impl LayoutProvider for ClusterLayout {
    fn layout(&self, entities: &EntityRegistry) -> CoordinateMap {
        let mut map = CoordinateMap::new();
        for (cluster_index, (_, members)) in self.clusters(entities).into_iter().enumerate() {
            let center = self.cluster_center(cluster_index);
            for (member_index, entity) in members.into_iter().enumerate() {
                let offset = cluster_offset(member_index);
                map.insert(
                    entity.id.clone(),
                    Point::new(center.x + offset.x, center.y + offset.y),
                );
            }
        }
        map
    }
}

/// Lat/lng on a sphere of `radius`, y up.
pub fn lat_lng_to_vec3(coord: GeoCoord, radius: f64) -> Point3 {
    let phi = (90.0 - coord.lat).to_radians();
    let theta = (coord.lng + 180.0).to_radians();
    Point3 {
        x: -(radius * phi.sin() * theta.cos()),
        y: radius * phi.cos(),
        z: radius * phi.sin() * theta.sin(),
    }
}

/// Orthographic globe seen from a point of view. Entities on the far
/// hemisphere get no coordinate.
#[derive(Debug, Clone)]
pub struct GlobeLayout {
    pub center: Point,
    pub radius: f64,
    pub view: GeoCoord,
}

impl Default for GlobeLayout {
    fn default() -> Self {
        Self {
            center: Point::new(400.0, 300.0),
            radius: 240.0,
            view: GeoCoord { lat: 15.0, lng: 45.0 },
        }
    }
}

impl GlobeLayout {
    /// Canvas point for `coord`, or `None` when it faces away from the viewer.
    pub fn project(&self, coord: GeoCoord) -> Option<Point> {
        if lat_lng_to_vec3(coord, 1.0).dot(lat_lng_to_vec3(self.view, 1.0)) < 0.0 {
            return None;
        }

        let phi = coord.lat.to_radians();
        let phi0 = self.view.lat.to_radians();
        let d_lambda = (coord.lng - self.view.lng).to_radians();
        let x = self.radius * phi.cos() * d_lambda.sin();
        let y = self.radius * (phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * d_lambda.cos());
        Some(Point::new(self.center.x + x, self.center.y - y))
    }
}

impl LayoutProvider for GlobeLayout {
    fn layout(&self, entities: &EntityRegistry) -> CoordinateMap {
        entities
            .iter()
            .filter_map(|e| {
                self.project(e.location.coordinates)
                    .map(|p| (e.id.clone(), p))
            })
            .collect()
    }
}
