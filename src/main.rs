// 允许未使用的代码（预留功能）
#![allow(dead_code)]
#![allow(unused_imports)]

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber;

mod api;
mod database;
mod external;
mod models;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize database
    let database = database::Database::new().await?;
    let repository: Arc<dyn database::FilmRepository> = Arc::new(database.repository().clone());

    // Initialize catalog client and connectivity monitor
    let catalog = external::HttpCatalogClient::from_env()
        .map_err(|e| anyhow::anyhow!("Invalid catalog base url: {}", e))?;
    let probe_url = std::env::var("CATALOG_BASE_URL")
        .unwrap_or_else(|_| external::DEFAULT_BASE_URL.to_string());
    let monitor = external::ConnectivityMonitor::from_env(probe_url);
    let connectivity = monitor.handle();
    tokio::spawn(monitor.start());

    // Compose services - 依赖全部在此显式注入
    let data_service = services::DataService::new(repository.clone());
    let film_service = Arc::new(services::FilmService::new(
        Arc::new(catalog),
        data_service,
        connectivity,
    ));
    let auth_service = Arc::new(services::AuthService::new(repository.clone()));
    auth_service.load_saved_user().await;

    // Start cache purge task - 启动即清理一次，之后每小时一次
    let retention = Duration::days(api::health::retention_days());
    let purge_service = film_service.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60 * 60));
        loop {
            ticker.tick().await;
            purge_service.purge_stale(Utc::now(), retention).await;
        }
    });

    // Build our application with routes
    let app = Router::new()
        .route("/", get(|| async { "Analog Films API v1.0" }))
        // Health and stats
        .route("/api/health", get(api::health::health_check))
        .route("/api/stats", get(api::health::get_stats))
        .route("/api/cache/purge", post(api::health::purge_cache))
        // Films
        .route("/api/films", get(api::films::get_film_list))
        .route("/api/films/brands", get(api::films::get_brands))
        .route("/api/films/favorites", get(api::films::get_favorites))
        .route("/api/films/:id", get(api::films::get_film_detail))
        .route("/api/films/:id/favorite", post(api::films::toggle_favorite))
        // Auth
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/guest", post(api::auth::login_as_guest))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/session", get(api::auth::get_session))
        .layer(CorsLayer::permissive())
        .with_state(api::AppState {
            database: database.clone(),
            films: film_service.clone(),
            auth: auth_service.clone(),
        });

    // Run the server - 从环境变量读取配置
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!(
        "🗑️ Cache purge task started (retention: {} days)",
        retention.num_days()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
