use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;

pub mod repository;
pub mod schema;

pub use repository::{FilmRepository, SqliteFilmRepository};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    repository: SqliteFilmRepository,
}

impl Database {
    pub async fn new() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./analog_films.db?mode=rwc".to_string());

        Self::connect(&database_url).await
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::info!("Connecting to database: {}", database_url);

        // 配置 SQLite 连接选项
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .busy_timeout(std::time::Duration::from_secs(30)); // 设置忙等待超时

        // SQLite 单写入者，限制为1个连接以避免锁定问题
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        // 初始化并校验表结构
        schema::init_schema(&pool).await?;
        schema::verify_schema(&pool).await?;

        // Log database statistics
        let stats = schema::get_database_stats(&pool).await?;
        tracing::info!(
            "Database initialized - Favorites: {}, Cached films: {}, Brands: {}, Size: {:.2} MB",
            stats.favorite_count,
            stats.cached_film_count,
            stats.brand_count,
            stats.database_size_mb()
        );

        let repository = SqliteFilmRepository::new(pool.clone());

        Ok(Self { pool, repository })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn repository(&self) -> &SqliteFilmRepository {
        &self.repository
    }

    /// 获取数据库统计信息
    pub async fn get_stats(&self) -> Result<schema::DatabaseStats> {
        schema::get_database_stats(&self.pool).await
    }

    /// 验证数据库完整性
    pub async fn verify_integrity(&self) -> Result<()> {
        schema::verify_schema(&self.pool).await
    }
}
