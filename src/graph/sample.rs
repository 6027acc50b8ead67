//! Built-in demo network: fifteen families across five city clusters and
//! sixteen relationships, with a hand-authored layout for an 800×520 canvas.

use super::layout::AuthoredLayout;
use super::types::{
    Category, Entity, EntityId, GeoCoord, Location, Point, Relationship, RelationshipId,
};

struct FamilyRow {
    id: &'static str,
    name: &'static str,
    surname: &'static str,
    city: &'static str,
    region: &'static str,
    country: &'static str,
    lat: f64,
    lng: f64,
    trust: f64,
    verified: bool,
    members: u32,
}

#[rustfmt::skip]
const FAMILIES: &[FamilyRow] = &[
    FamilyRow { id: "fam_01", name: "Sharma", surname: "Sharma", city: "Mumbai", region: "Maharashtra", country: "India", lat: 19.0760, lng: 72.8777, trust: 9.2, verified: true, members: 8 },
    FamilyRow { id: "fam_02", name: "Patel", surname: "Patel", city: "Mumbai", region: "Maharashtra", country: "India", lat: 19.0760, lng: 72.8777, trust: 8.8, verified: true, members: 12 },
    FamilyRow { id: "fam_03", name: "Singh", surname: "Singh", city: "Mumbai", region: "Maharashtra", country: "India", lat: 19.0760, lng: 72.8777, trust: 9.1, verified: true, members: 6 },
    FamilyRow { id: "fam_04", name: "Gupta", surname: "Gupta", city: "Delhi", region: "Delhi", country: "India", lat: 28.6139, lng: 77.2090, trust: 8.6, verified: true, members: 7 },
    FamilyRow { id: "fam_05", name: "Agarwal", surname: "Agarwal", city: "Delhi", region: "Delhi", country: "India", lat: 28.6139, lng: 77.2090, trust: 8.4, verified: true, members: 5 },
    FamilyRow { id: "fam_06", name: "Kumar", surname: "Kumar", city: "Bangalore", region: "Karnataka", country: "India", lat: 12.9716, lng: 77.5946, trust: 8.9, verified: true, members: 6 },
    FamilyRow { id: "fam_07", name: "Reddy", surname: "Reddy", city: "Bangalore", region: "Karnataka", country: "India", lat: 12.9716, lng: 77.5946, trust: 8.7, verified: true, members: 9 },
    FamilyRow { id: "fam_08", name: "Patel-USA", surname: "Patel", city: "San Francisco", region: "California", country: "USA", lat: 37.7749, lng: -122.4194, trust: 9.0, verified: true, members: 4 },
    FamilyRow { id: "fam_09", name: "Singh-Canada", surname: "Singh", city: "Toronto", region: "Ontario", country: "Canada", lat: 43.6532, lng: -79.3832, trust: 8.8, verified: true, members: 5 },
    FamilyRow { id: "fam_10", name: "Sharma-UK", surname: "Sharma", city: "London", region: "England", country: "UK", lat: 51.5074, lng: -0.1278, trust: 8.5, verified: true, members: 6 },
    FamilyRow { id: "fam_11", name: "Joshi", surname: "Joshi", city: "Pune", region: "Maharashtra", country: "India", lat: 18.5204, lng: 73.8567, trust: 8.3, verified: true, members: 7 },
    FamilyRow { id: "fam_12", name: "Mehta", surname: "Mehta", city: "Ahmedabad", region: "Gujarat", country: "India", lat: 23.0225, lng: 72.5714, trust: 8.7, verified: true, members: 10 },
    FamilyRow { id: "fam_13", name: "Verma", surname: "Verma", city: "Noida", region: "Uttar Pradesh", country: "India", lat: 28.5355, lng: 77.3910, trust: 8.1, verified: false, members: 6 },
    FamilyRow { id: "fam_14", name: "Chopra", surname: "Chopra", city: "Chandigarh", region: "Punjab", country: "India", lat: 30.7333, lng: 76.7794, trust: 8.9, verified: true, members: 8 },
    FamilyRow { id: "fam_15", name: "Nair", surname: "Nair", city: "Kochi", region: "Kerala", country: "India", lat: 9.9312, lng: 76.2673, trust: 9.3, verified: true, members: 5 },
];

/// Cluster membership used by the authored layout below.
const CLUSTERS: &[(&str, &str)] = &[
    ("fam_01", "mumbai"),
    ("fam_02", "mumbai"),
    ("fam_03", "mumbai"),
    ("fam_11", "mumbai"),
    ("fam_04", "delhi"),
    ("fam_05", "delhi"),
    ("fam_13", "delhi"),
    ("fam_06", "bangalore"),
    ("fam_07", "bangalore"),
    ("fam_15", "bangalore"),
    ("fam_08", "international"),
    ("fam_09", "international"),
    ("fam_10", "international"),
    ("fam_12", "others"),
    ("fam_14", "others"),
];

struct ConnectionRow {
    id: &'static str,
    from: &'static str,
    to: &'static str,
    category: Category,
    subtype: &'static str,
    strength: f64,
    verified: bool,
    established: &'static str,
}

#[rustfmt::skip]
const CONNECTIONS: &[ConnectionRow] = &[
    ConnectionRow { id: "conn_01", from: "fam_01", to: "fam_02", category: Category::Blood, subtype: "cousins", strength: 0.9, verified: true, established: "2015-06-20" },
    ConnectionRow { id: "conn_02", from: "fam_02", to: "fam_03", category: Category::Marriage, subtype: "in-laws", strength: 0.85, verified: true, established: "2018-02-14" },
    ConnectionRow { id: "conn_03", from: "fam_01", to: "fam_11", category: Category::Blood, subtype: "uncle", strength: 0.8, verified: true, established: "2010-01-01" },
    ConnectionRow { id: "conn_04", from: "fam_04", to: "fam_05", category: Category::Friendship, subtype: "family_friends", strength: 0.7, verified: true, established: "2019-09-15" },
    ConnectionRow { id: "conn_05", from: "fam_04", to: "fam_13", category: Category::Community, subtype: "neighbors", strength: 0.6, verified: false, established: "2021-03-10" },
    ConnectionRow { id: "conn_06", from: "fam_06", to: "fam_07", category: Category::Friendship, subtype: "colleagues", strength: 0.75, verified: true, established: "2020-07-22" },
    ConnectionRow { id: "conn_07", from: "fam_02", to: "fam_08", category: Category::Blood, subtype: "brother", strength: 0.95, verified: true, established: "2016-11-30" },
    ConnectionRow { id: "conn_08", from: "fam_03", to: "fam_09", category: Category::Blood, subtype: "cousin", strength: 0.8, verified: true, established: "2017-05-18" },
    ConnectionRow { id: "conn_09", from: "fam_01", to: "fam_10", category: Category::Marriage, subtype: "daughter_married", strength: 0.9, verified: true, established: "2019-12-01" },
    ConnectionRow { id: "conn_10", from: "fam_04", to: "fam_01", category: Category::Friendship, subtype: "college_friends", strength: 0.65, verified: true, established: "2012-08-15" },
    ConnectionRow { id: "conn_11", from: "fam_06", to: "fam_12", category: Category::Community, subtype: "business_partners", strength: 0.7, verified: true, established: "2021-01-20" },
    ConnectionRow { id: "conn_12", from: "fam_14", to: "fam_03", category: Category::Blood, subtype: "maternal_uncle", strength: 0.85, verified: true, established: "2008-01-01" },
    ConnectionRow { id: "conn_13", from: "fam_15", to: "fam_07", category: Category::Marriage, subtype: "inter_state_marriage", strength: 0.8, verified: true, established: "2020-11-25" },
    ConnectionRow { id: "conn_14", from: "fam_15", to: "fam_06", category: Category::Friendship, subtype: "childhood_friends", strength: 0.75, verified: true, established: "2018-04-12" },
    ConnectionRow { id: "conn_15", from: "fam_12", to: "fam_02", category: Category::Community, subtype: "gujarati_association", strength: 0.6, verified: true, established: "2019-03-25" },
    ConnectionRow { id: "conn_16", from: "fam_13", to: "fam_14", category: Category::Friendship, subtype: "university_friends", strength: 0.65, verified: false, established: "2022-01-10" },
];

const POSITIONS: &[(&str, f64, f64)] = &[
    // Mumbai
    ("fam_01", 200.0, 120.0),
    ("fam_02", 160.0, 200.0),
    ("fam_03", 240.0, 200.0),
    ("fam_11", 200.0, 280.0),
    // Delhi
    ("fam_04", 600.0, 120.0),
    ("fam_05", 560.0, 200.0),
    ("fam_13", 640.0, 200.0),
    // Bangalore
    ("fam_06", 400.0, 370.0),
    ("fam_07", 360.0, 450.0),
    ("fam_15", 440.0, 450.0),
    // International
    ("fam_08", 100.0, 320.0),
    ("fam_09", 60.0, 400.0),
    ("fam_10", 140.0, 400.0),
    // Others
    ("fam_12", 700.0, 320.0),
    ("fam_14", 660.0, 400.0),
];

pub fn families() -> Vec<Entity> {
    FAMILIES
        .iter()
        .map(|row| Entity {
            id: EntityId::new(row.id),
            name: row.name.to_string(),
            surname: row.surname.to_string(),
            location: Location {
                city: row.city.to_string(),
                region: row.region.to_string(),
                country: row.country.to_string(),
                coordinates: GeoCoord {
                    lat: row.lat,
                    lng: row.lng,
                },
            },
            trust_score: row.trust,
            verified: row.verified,
            member_count: row.members,
            cluster: CLUSTERS
                .iter()
                .find(|(id, _)| *id == row.id)
                .map(|(_, cluster)| cluster.to_string()),
        })
        .collect()
}

pub fn connections() -> Vec<Relationship> {
    CONNECTIONS
        .iter()
        .map(|row| Relationship {
            id: RelationshipId::new(row.id),
            from: EntityId::new(row.from),
            to: EntityId::new(row.to),
            category: row.category,
            subtype: row.subtype.to_string(),
            strength: row.strength,
            verified: row.verified,
            established: row.established.to_string(),
        })
        .collect()
}

/// The hand-authored position table.
pub fn positions() -> Vec<(EntityId, Point)> {
    POSITIONS
        .iter()
        .map(|&(id, x, y)| (EntityId::new(id), Point::new(x, y)))
        .collect()
}

pub fn authored_layout() -> AuthoredLayout {
    AuthoredLayout::new(positions())
}
