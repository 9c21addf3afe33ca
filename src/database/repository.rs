use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::models::{CachedBrand, CachedFilm, Film, User};

/// 本地收藏存储接口
///
/// 按胶片 id 为主键的持久化记录存储，只保存被收藏的胶片和品牌缓存。
/// 注入接口而非具体实现，组装发生在启动处
#[async_trait]
pub trait FilmRepository: Send + Sync {
    // 收藏读取
    async fn get_favorite_films(&self) -> Result<Vec<Film>>;
    async fn get_favorite_films_by_brand(&self, brand: &str) -> Result<Vec<Film>>;
    async fn get_film_by_id(&self, id: &str) -> Result<Option<Film>>;
    async fn is_favorite(&self, id: &str) -> Result<bool>;
    async fn get_favorite_count(&self) -> Result<i64>;

    // 收藏写入
    async fn upsert_favorite(&self, film: &Film) -> Result<()>;
    async fn delete_film(&self, id: &str) -> Result<()>;

    // 品牌缓存
    async fn get_brands(&self) -> Result<Vec<String>>;
    async fn replace_brands(&self, brands: &[String]) -> Result<()>;

    // 过期清理
    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    // 会话记录
    async fn save_user(&self, user: &User) -> Result<()>;
    async fn load_user(&self) -> Result<Option<User>>;
    async fn clear_user(&self) -> Result<()>;
}

/// SQLite 收藏存储实现
#[derive(Clone)]
pub struct SqliteFilmRepository {
    pool: Pool<Sqlite>,
}

impl SqliteFilmRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FilmRepository for SqliteFilmRepository {
    async fn get_favorite_films(&self) -> Result<Vec<Film>> {
        let rows = sqlx::query_as::<_, CachedFilm>(
            "SELECT * FROM cached_films WHERE is_favorite = 1",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(CachedFilm::to_film).collect())
    }

    async fn get_favorite_films_by_brand(&self, brand: &str) -> Result<Vec<Film>> {
        let rows = sqlx::query_as::<_, CachedFilm>(
            "SELECT * FROM cached_films WHERE is_favorite = 1 AND brand = ?",
        )
        .bind(brand)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(CachedFilm::to_film).collect())
    }

    async fn get_film_by_id(&self, id: &str) -> Result<Option<Film>> {
        let row = sqlx::query_as::<_, CachedFilm>("SELECT * FROM cached_films WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|cached| cached.to_film()))
    }

    async fn is_favorite(&self, id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cached_films WHERE id = ? AND is_favorite = 1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn get_favorite_count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cached_films WHERE is_favorite = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn upsert_favorite(&self, film: &Film) -> Result<()> {
        let cached = CachedFilm::from_film(film, Utc::now());

        // 重复收藏刷新整行并重置 cached_at，is_favorite 一律强制为 1
        sqlx::query(
            r#"
            INSERT INTO cached_films (
                id, brand, model, slug, film_type, color, iso, image,
                year_start, year_end, country, description, purchase_links,
                is_favorite, is_popular, is_dead, cached_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                brand = excluded.brand,
                model = excluded.model,
                slug = excluded.slug,
                film_type = excluded.film_type,
                color = excluded.color,
                iso = excluded.iso,
                image = excluded.image,
                year_start = excluded.year_start,
                year_end = excluded.year_end,
                country = excluded.country,
                description = excluded.description,
                purchase_links = excluded.purchase_links,
                is_favorite = 1,
                is_popular = excluded.is_popular,
                is_dead = excluded.is_dead,
                cached_at = excluded.cached_at
            "#,
        )
        .bind(&cached.id)
        .bind(&cached.brand)
        .bind(&cached.model)
        .bind(&cached.slug)
        .bind(&cached.film_type)
        .bind(&cached.color)
        .bind(&cached.iso)
        .bind(&cached.image)
        .bind(cached.year_start)
        .bind(&cached.year_end)
        .bind(&cached.country)
        .bind(&cached.description)
        .bind(&cached.purchase_links)
        .bind(cached.is_popular)
        .bind(cached.is_dead)
        .bind(cached.cached_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_film(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM cached_films WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_brands(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_as::<_, CachedBrand>("SELECT * FROM cached_brands")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|brand| brand.name).collect())
    }

    async fn replace_brands(&self, brands: &[String]) -> Result<()> {
        // 整表替换在单个事务中完成，失败时保持原有数据不变
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cached_brands")
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();
        for brand in brands {
            sqlx::query("INSERT OR REPLACE INTO cached_brands (name, cached_at) VALUES (?, ?)")
                .bind(brand)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn purge_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        // 收藏永不按时效清理，品牌缓存到期即删
        let films = sqlx::query(
            "DELETE FROM cached_films WHERE cached_at < ? AND is_favorite = 0",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        let brands = sqlx::query("DELETE FROM cached_brands WHERE cached_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(films.rows_affected() + brands.rows_affected())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let payload = serde_json::to_string(user)?;

        sqlx::query(
            r#"
            INSERT INTO user_session (id, payload, saved_at)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_user(&self) -> Result<Option<User>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM user_session WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn clear_user(&self) -> Result<()> {
        sqlx::query("DELETE FROM user_session WHERE id = 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_repository() -> SqliteFilmRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::init_schema(&pool).await.unwrap();
        SqliteFilmRepository::new(pool)
    }

    fn film(id: &str, brand: &str) -> Film {
        Film {
            id: id.to_string(),
            brand: brand.to_string(),
            model: format!("Model {}", id),
            slug: id.to_string(),
            film_type: vec!["35mm".to_string()],
            color: "B&W".to_string(),
            iso: "400".to_string(),
            image: None,
            year_start: None,
            year_end: None,
            country: String::new(),
            description: String::new(),
            purchase_links: vec![],
            is_favorite: true,
            is_popular: false,
            is_dead: false,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_read_back_favorite() {
        let repo = test_repository().await;
        repo.upsert_favorite(&film("f1", "Kodak")).await.unwrap();

        assert!(repo.is_favorite("f1").await.unwrap());
        assert_eq!(repo.get_favorite_count().await.unwrap(), 1);

        let favorites = repo.get_favorite_films().await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, "f1");
        assert!(favorites[0].is_favorite);
    }

    #[tokio::test]
    async fn test_upsert_forces_favorite_flag() {
        let repo = test_repository().await;
        let mut unfavorited = film("f1", "Kodak");
        unfavorited.is_favorite = false;

        repo.upsert_favorite(&unfavorited).await.unwrap();
        assert!(repo.is_favorite("f1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = test_repository().await;
        repo.upsert_favorite(&film("f1", "Kodak")).await.unwrap();
        repo.delete_film("f1").await.unwrap();

        assert!(!repo.is_favorite("f1").await.unwrap());
        assert!(repo.get_film_by_id("f1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_brand_filtered_read() {
        let repo = test_repository().await;
        repo.upsert_favorite(&film("f1", "Kodak")).await.unwrap();
        repo.upsert_favorite(&film("f2", "Ilford")).await.unwrap();

        let kodak = repo.get_favorite_films_by_brand("Kodak").await.unwrap();
        assert_eq!(kodak.len(), 1);
        assert_eq!(kodak[0].id, "f1");
    }

    #[tokio::test]
    async fn test_replace_brands_is_full_swap() {
        let repo = test_repository().await;
        repo.replace_brands(&["Kodak".to_string(), "Fuji".to_string()])
            .await
            .unwrap();
        repo.replace_brands(&["Ilford".to_string()]).await.unwrap();

        let brands = repo.get_brands().await.unwrap();
        assert_eq!(brands, vec!["Ilford".to_string()]);
    }

    #[tokio::test]
    async fn test_purge_keeps_favorites_regardless_of_age() {
        let repo = test_repository().await;
        repo.upsert_favorite(&film("f1", "Kodak")).await.unwrap();

        // 把 cutoff 放到未来，收藏行依然不能被清理
        let cutoff = Utc::now() + chrono::Duration::days(30);
        repo.purge_stale(cutoff).await.unwrap();

        assert!(repo.is_favorite("f1").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_removes_stale_brands() {
        let repo = test_repository().await;
        repo.replace_brands(&["Kodak".to_string()]).await.unwrap();

        let cutoff = Utc::now() + chrono::Duration::days(30);
        let removed = repo.purge_stale(cutoff).await.unwrap();

        assert_eq!(removed, 1);
        assert!(repo.get_brands().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_session_round_trip() {
        let repo = test_repository().await;
        assert!(repo.load_user().await.unwrap().is_none());

        let user = User::guest();
        repo.save_user(&user).await.unwrap();
        assert_eq!(repo.load_user().await.unwrap(), Some(user));

        repo.clear_user().await.unwrap();
        assert!(repo.load_user().await.unwrap().is_none());
    }
}
