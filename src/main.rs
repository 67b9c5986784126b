use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use collision_backend::api::{self, AppState};
use collision_backend::config::Config;
use collision_backend::db::{self, PgBuildingStore};

#[tokio::main]
async fn main() -> Result<()> {
    // ログ初期化
    tracing_subscriber::fmt::init();

    // .env / .env.{ENV} / OS環境変数
    let config = Config::load();
    tracing::info!("Database config loaded: {}", config.db);
    tracing::info!(
        "Connection pool config: min={}, max={}",
        config.pool.min_connections,
        config.pool.max_connections
    );

    // データベース接続プール作成
    let pool = db::create_pool(&config.db, &config.pool)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // CORS設定
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ルーター作成
    let state = AppState::new(Arc::new(PgBuildingStore::new(pool.clone())));
    let api_router = api::routes::create_router(state);

    let app = Router::new()
        .route("/", get(|| async { "Building Collision API" }))
        .route("/health", get(|| async { "OK" }))
        .merge(api_router)
        .layer(cors);

    // サーバー起動
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server exiting");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down server...");
}
