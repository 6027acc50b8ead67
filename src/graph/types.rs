use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque entity identifier, unique within one registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

/// Opaque relationship identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RelationshipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoord {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    #[serde(default, alias = "state")]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, with = "coord_pair")]
    pub coordinates: GeoCoord,
}

/// A family node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub location: Location,
    /// Documented 0–10, cosmetic only.
    pub trust_score: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub member_count: u32,
    /// Declared group for the cluster layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

/// Relationship categories. The set is closed; colors key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blood,
    Marriage,
    Friendship,
    Community,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Blood,
        Category::Marriage,
        Category::Friendship,
        Category::Community,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Blood => "blood",
            Category::Marriage => "marriage",
            Category::Friendship => "friendship",
            Category::Community => "community",
        }
    }

    /// Single-letter tag drawn inside the midpoint marker.
    pub fn initial(self) -> char {
        match self {
            Category::Blood => 'B',
            Category::Marriage => 'M',
            Category::Friendship => 'F',
            Category::Community => 'C',
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection between two families. Stored directionally, drawn
/// symmetrically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    #[serde(alias = "fromFamilyId", alias = "fromEntityId")]
    pub from: EntityId,
    #[serde(alias = "toFamilyId", alias = "toEntityId")]
    pub to: EntityId,
    #[serde(alias = "relationshipType")]
    pub category: Category,
    #[serde(default, alias = "specificRelation")]
    pub subtype: String,
    /// In [0, 1].
    pub strength: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, alias = "establishedDate")]
    pub established: String,
}

impl Relationship {
    pub fn touches(&self, id: &EntityId) -> bool {
        &self.from == id || &self.to == id
    }

    /// The endpoint opposite `id`, if `id` is one of the endpoints.
    pub fn other_end(&self, id: &EntityId) -> Option<&EntityId> {
        if &self.from == id {
            Some(&self.to)
        } else if &self.to == id {
            Some(&self.from)
        } else {
            None
        }
    }
}

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new(
            self.x + (other.x - self.x) / 2.0,
            self.y + (other.y - self.y) / 2.0,
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point on or around the globe, before projection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn dot(self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

/// Some datasets store coordinates as a `[lat, lng]` pair.
mod coord_pair {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::GeoCoord;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Pair([f64; 2]),
        Named { lat: f64, lng: f64 },
    }

    pub fn serialize<S: Serializer>(coord: &GeoCoord, serializer: S) -> Result<S::Ok, S::Error> {
        [coord.lat, coord.lng].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GeoCoord, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Pair([lat, lng]) => GeoCoord { lat, lng },
            Repr::Named { lat, lng } => GeoCoord { lat, lng },
        })
    }
}
