#![allow(dead_code)]

use async_trait::async_trait;
use collision_backend::db::{BuildingStore, StoreError};
use collision_backend::domain::{Building, CollisionQuery, NewBuilding};
use geo::{HaversineDistance, Point};
use std::sync::Mutex;

pub const SQUARE_WKT: &str =
    "MULTIPOLYGON(((116.39 39.9,116.39001 39.9,116.39001 39.90001,116.39 39.9)))";

// テスト用のインメモリストア
// 距離は頂点までの大圏距離で近似する
#[derive(Default)]
pub struct MemoryStore {
    buildings: Mutex<Vec<Building>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_building(self, wkt: &str, height: f64) -> Self {
        self.buildings.lock().unwrap().push(Building {
            building_id: collision_backend::domain::generate_building_id(wkt),
            building_name: None,
            geom: Some(wkt.to_string()),
            building_height: Some(height),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.buildings.lock().unwrap().len()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.buildings
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.building_id)
            .collect()
    }
}

fn vertices(wkt: &str) -> Vec<Point<f64>> {
    let start = wkt.find('(').map(|i| i + 1).unwrap_or(0);
    wkt[start..]
        .split(',')
        .filter_map(|pair| {
            let cleaned: String = pair
                .chars()
                .filter(|c| *c != '(' && *c != ')')
                .collect();
            let mut nums = cleaned.split_whitespace().map(|n| n.parse::<f64>());
            match (nums.next(), nums.next()) {
                (Some(Ok(x)), Some(Ok(y))) => Some(Point::new(x, y)),
                _ => None,
            }
        })
        .collect()
}

#[async_trait]
impl BuildingStore for MemoryStore {
    async fn insert_building(&self, building: &NewBuilding) -> Result<(), StoreError> {
        let mut buildings = self.buildings.lock().unwrap();
        if buildings.iter().any(|b| b.building_id == building.id) {
            return Err(StoreError::DuplicateId { id: building.id });
        }
        buildings.push(Building {
            building_id: building.id,
            building_name: None,
            geom: Some(building.geometry.clone()),
            building_height: Some(building.height),
        });
        Ok(())
    }

    async fn find_collisions(&self, query: &CollisionQuery) -> Result<Vec<Building>, StoreError> {
        let origin = Point::new(query.longitude, query.latitude);
        let buildings = self.buildings.lock().unwrap();

        Ok(buildings
            .iter()
            .filter(|b| b.building_height.map_or(false, |h| h > query.height))
            .filter(|b| {
                b.geom.as_deref().map_or(false, |wkt| {
                    vertices(wkt)
                        .iter()
                        .any(|v| origin.haversine_distance(v) <= query.collision_distance)
                })
            })
            .cloned()
            .collect())
    }
}

/// Every call fails as if the pool were exhausted.
pub struct FailingStore;

#[async_trait]
impl BuildingStore for FailingStore {
    async fn insert_building(&self, _building: &NewBuilding) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_collisions(&self, _query: &CollisionQuery) -> Result<Vec<Building>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

pub fn write_input(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}
