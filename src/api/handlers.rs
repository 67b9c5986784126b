use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::{BuildingStore, StoreError};
use crate::domain::{Building, CollisionQuery, DEFAULT_COLLISION_DISTANCE};
use crate::importer::{self, IngestionReport, IngestionSummary};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BuildingStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BuildingStore>) -> Self {
        Self { store }
    }
}

// エラー型 (collision_info)
#[derive(Debug)]
pub enum CollisionError {
    BadRequest(&'static str),
    Store(StoreError),
}

impl From<StoreError> for CollisionError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Collision query failed: {:?}", err);
        CollisionError::Store(err)
    }
}

#[derive(Serialize)]
struct StatusErrorResponse {
    status: &'static str,
    message: String,
}

impl From<QueryRejection> for CollisionError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!("Rejected collision_info query: {}", rejection.body_text());
        CollisionError::BadRequest("Invalid query string")
    }
}

impl IntoResponse for CollisionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            CollisionError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            CollisionError::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Collision check failed: {}", err),
            ),
        };

        let body = Json(StatusErrorResponse {
            status: "error",
            message,
        });

        (status, body).into_response()
    }
}

// GET /api/v1/collision_info のクエリパラメータ
// 数値は文字列で受けて自前でパースする（エラーメッセージをパラメータ毎に返すため）
#[derive(Debug, Default, Deserialize)]
pub struct CollisionParams {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
    pub height: Option<String>,
    pub collision_distance: Option<String>,
}

fn parse_float(raw: Option<&str>, err: &'static str) -> Result<f64, CollisionError> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or(CollisionError::BadRequest(err))
}

impl CollisionParams {
    pub fn to_query(&self) -> Result<CollisionQuery, CollisionError> {
        let longitude = parse_float(self.longitude.as_deref(), "Invalid longitude")?;
        let latitude = parse_float(self.latitude.as_deref(), "Invalid latitude")?;
        let height = parse_float(self.height.as_deref(), "Invalid height")?;
        let collision_distance = match self.collision_distance.as_deref() {
            None => DEFAULT_COLLISION_DISTANCE,
            Some(raw) => parse_float(Some(raw), "Invalid collision_distance")?,
        };

        // バリデーション
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CollisionError::BadRequest("longitude out of valid range"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CollisionError::BadRequest("latitude out of valid range"));
        }
        if collision_distance < 0.0 {
            return Err(CollisionError::BadRequest(
                "collision_distance must not be negative",
            ));
        }

        Ok(CollisionQuery {
            longitude,
            latitude,
            height,
            collision_distance,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CollisionResponse {
    pub status: &'static str,
    pub is_collision: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_infos: Option<Vec<Building>>,
}

impl CollisionResponse {
    pub fn from_buildings(buildings: Vec<Building>) -> Self {
        let is_collision = !buildings.is_empty();
        Self {
            status: "success",
            is_collision,
            building_infos: is_collision.then_some(buildings),
        }
    }
}

// ハンドラー: GET /api/v1/collision_info
pub async fn collision_info(
    State(state): State<AppState>,
    params: Result<Query<CollisionParams>, QueryRejection>,
) -> Result<Json<CollisionResponse>, CollisionError> {
    let Query(params) = params?;
    let query = params.to_query()?;

    tracing::info!(
        "Checking collision: lon={}, lat={}, height={}, distance={}",
        query.longitude,
        query.latitude,
        query.height,
        query.collision_distance
    );

    let buildings = state.store.find_collisions(&query).await?;

    Ok(Json(CollisionResponse::from_buildings(buildings)))
}

// POST /api/v1/insert_buildings_info のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct InsertParams {
    pub file_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub success: bool,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<IngestionSummary>,
    #[serde(rename = "errorMsg", skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl InsertResponse {
    fn failure(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.as_u16(),
            data: None,
            error_msg: Some(message.into()),
        }
    }
}

impl From<IngestionReport> for InsertResponse {
    fn from(report: IngestionReport) -> Self {
        match report {
            IngestionReport::Completed(summary) => Self {
                success: true,
                code: StatusCode::OK.as_u16(),
                data: Some(summary),
                error_msg: None,
            },
            IngestionReport::Failed { message } => {
                Self::failure(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

// ハンドラー: POST /api/v1/insert_buildings_info
// ファイルが読めない場合も 200 で success=false を返す
pub async fn insert_buildings_info(
    State(state): State<AppState>,
    params: Result<Query<InsertParams>, QueryRejection>,
) -> (StatusCode, Json<InsertResponse>) {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            tracing::warn!("Rejected insert_buildings_info query: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(InsertResponse::failure(
                    StatusCode::BAD_REQUEST,
                    "Invalid query string",
                )),
            );
        }
    };

    let file_path = match params.file_path.filter(|p| !p.trim().is_empty()) {
        Some(p) => p,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(InsertResponse::failure(
                    StatusCode::BAD_REQUEST,
                    "file_path must not be empty",
                )),
            );
        }
    };

    tracing::info!("Received request to insert buildings from {}", file_path);

    let report = importer::ingest_file(state.store.as_ref(), &file_path).await;

    (StatusCode::OK, Json(InsertResponse::from(report)))
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub code: u16,
    pub message: &'static str,
}

// ハンドラー: POST /api/v1/update_buildings_info
// 更新の仕様が未定のため何もしない
pub async fn update_buildings_info() -> Json<UpdateResponse> {
    tracing::info!("Received request to update all buildings info (not implemented)");

    Json(UpdateResponse {
        success: true,
        code: StatusCode::OK.as_u16(),
        message: "All buildings info updated (placeholder)",
    })
}
