use serde::{Deserialize, Serialize};

/// Search radius in meters used when the caller does not pass one.
pub const DEFAULT_COLLISION_DISTANCE: f64 = 2.0;

/// A stored building footprint.
///
/// `geom` is the WKT text of a MULTIPOLYGON in SRID 4326.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub building_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_height: Option<f64>,
}

/// One parsed line of an ingestion file, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBuilding {
    pub id: i64,
    pub geometry: String,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionQuery {
    pub longitude: f64,
    pub latitude: f64,
    /// Buildings strictly taller than this collide.
    pub height: f64,
    /// Meters, measured on the WGS84 spheroid.
    pub collision_distance: f64,
}
