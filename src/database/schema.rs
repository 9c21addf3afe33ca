use anyhow::Result;
use sqlx::{Pool, Sqlite};

/// 初始化数据库表结构
///
/// 建表语句全部幂等，启动时直接执行，不依赖外部迁移目录
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cached_films (
            id              TEXT PRIMARY KEY,
            brand           TEXT NOT NULL,
            model           TEXT NOT NULL,
            slug            TEXT NOT NULL,
            film_type       TEXT NOT NULL DEFAULT '[]',
            color           TEXT NOT NULL DEFAULT '',
            iso             TEXT NOT NULL DEFAULT '',
            image           TEXT,
            year_start      INTEGER,
            year_end        TEXT,
            country         TEXT NOT NULL DEFAULT '',
            description     TEXT NOT NULL DEFAULT '',
            purchase_links  TEXT NOT NULL DEFAULT '[]',
            is_favorite     BOOLEAN NOT NULL DEFAULT 0,
            is_popular      BOOLEAN NOT NULL DEFAULT 0,
            is_dead         BOOLEAN NOT NULL DEFAULT 0,
            cached_at       DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cached_brands (
            name       TEXT PRIMARY KEY,
            cached_at  DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 单行会话表，记录最近一次登录的账户
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_session (
            id        INTEGER PRIMARY KEY CHECK (id = 1),
            payload   TEXT NOT NULL,
            saved_at  DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_cached_films_favorite ON cached_films (is_favorite)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cached_films_brand ON cached_films (brand)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cached_films_cached_at ON cached_films (cached_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// 验证数据库schema完整性
pub async fn verify_schema(pool: &Pool<Sqlite>) -> Result<()> {
    // 检查所有必需的表是否存在
    let required_tables = vec!["cached_films", "cached_brands", "user_session"];

    for table in required_tables {
        let exists = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
            .bind(table)
            .fetch_optional(pool)
            .await?;

        if exists.is_none() {
            return Err(anyhow::anyhow!("Required table '{}' does not exist", table));
        }
    }

    // 检查关键索引是否存在
    let required_indexes = vec![
        "idx_cached_films_favorite",
        "idx_cached_films_brand",
        "idx_cached_films_cached_at",
    ];

    for index in required_indexes {
        let exists = sqlx::query("SELECT name FROM sqlite_master WHERE type='index' AND name=?")
            .bind(index)
            .fetch_optional(pool)
            .await?;

        if exists.is_none() {
            return Err(anyhow::anyhow!("Required index '{}' does not exist", index));
        }
    }

    tracing::info!("Database schema verification completed successfully");
    Ok(())
}

/// 获取数据库统计信息
pub async fn get_database_stats(pool: &Pool<Sqlite>) -> Result<DatabaseStats> {
    let favorite_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM cached_films WHERE is_favorite = 1")
            .fetch_one(pool)
            .await?;

    let cached_film_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cached_films")
        .fetch_one(pool)
        .await?;

    let brand_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cached_brands")
        .fetch_one(pool)
        .await?;

    // 获取数据库文件大小
    let db_size: i64 = sqlx::query_scalar(
        "SELECT page_count * page_size as size FROM pragma_page_count(), pragma_page_size()",
    )
    .fetch_one(pool)
    .await?;

    Ok(DatabaseStats {
        favorite_count,
        cached_film_count,
        brand_count,
        database_size_bytes: db_size,
    })
}

/// 数据库统计信息
#[derive(Debug)]
pub struct DatabaseStats {
    pub favorite_count: i64,
    pub cached_film_count: i64,
    pub brand_count: i64,
    pub database_size_bytes: i64,
}

impl DatabaseStats {
    pub fn database_size_mb(&self) -> f64 {
        self.database_size_bytes as f64 / (1024.0 * 1024.0)
    }
}
