use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::domain::{Building, CollisionQuery, NewBuilding};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another geometry already hashed to this id.
    #[error("building id {id} already exists")]
    DuplicateId { id: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for building footprints.
///
/// Handlers and the importer only talk to this trait, so they can run
/// against PostGIS or against an in-memory double in tests.
#[async_trait]
pub trait BuildingStore: Send + Sync {
    async fn insert_building(&self, building: &NewBuilding) -> Result<(), StoreError>;

    /// Buildings within `collision_distance` meters of the point that are
    /// strictly taller than `height`. Ordering is unspecified.
    async fn find_collisions(&self, query: &CollisionQuery) -> Result<Vec<Building>, StoreError>;
}

#[derive(Debug, FromRow)]
struct BuildingRow {
    building_id: i64,
    building_name: Option<String>,
    geom: Option<String>,
    building_height: Option<f64>,
}

impl From<BuildingRow> for Building {
    fn from(row: BuildingRow) -> Self {
        Building {
            building_id: row.building_id,
            building_name: row.building_name,
            geom: row.geom,
            building_height: row.building_height,
        }
    }
}

#[derive(Clone)]
pub struct PgBuildingStore {
    pool: PgPool,
}

impl PgBuildingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildingStore for PgBuildingStore {
    async fn insert_building(&self, building: &NewBuilding) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO hzdk_buildings (geom, building_height, building_id) \
             VALUES (ST_GeomFromText($1, 4326), $2, $3)",
        )
        .bind(&building.geometry)
        .bind(building.height)
        .bind(building.id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateId { id: building.id })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_collisions(&self, query: &CollisionQuery) -> Result<Vec<Building>, StoreError> {
        tracing::debug!(
            "Collision query: lon={}, lat={}, dist={}, height={}",
            query.longitude,
            query.latitude,
            query.collision_distance,
            query.height
        );

        let rows: Vec<BuildingRow> = sqlx::query_as(
            "SELECT building_id, building_name, ST_AsText(geom) AS geom, \
             building_height::float8 AS building_height \
             FROM hzdk_buildings \
             WHERE ST_DWithin( \
                 geom::geography, \
                 ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, \
                 $3) \
             AND building_height > $4",
        )
        .bind(query.longitude) // lon first for ST_MakePoint
        .bind(query.latitude)
        .bind(query.collision_distance)
        .bind(query.height)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Building::from).collect())
    }
}
