use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/collision_info", get(handlers::collision_info))
        .route(
            "/api/v1/insert_buildings_info",
            post(handlers::insert_buildings_info),
        )
        .route(
            "/api/v1/update_buildings_info",
            post(handlers::update_buildings_info),
        )
        .with_state(state)
}
