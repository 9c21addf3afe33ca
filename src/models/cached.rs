use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::Film;

/// 收藏胶片的持久化投影
///
/// 仅为被收藏的胶片创建，额外携带 cached_at 时间戳。
/// 数组字段以 JSON 文本列存储。
/// is_favorite 为 false 的行视为过期数据，等待清理
#[derive(Debug, Clone, FromRow)]
pub struct CachedFilm {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub slug: String,

    pub film_type: String, // JSON array as string
    pub color: String,
    pub iso: String,

    pub image: Option<String>,

    pub year_start: Option<i32>,
    pub year_end: Option<String>,
    pub country: String,

    pub description: String,
    pub purchase_links: String, // JSON array as string

    pub is_favorite: bool,
    pub is_popular: bool,
    pub is_dead: bool,

    pub cached_at: DateTime<Utc>,
}

impl CachedFilm {
    /// 从值记录构造持久化行
    pub fn from_film(film: &Film, cached_at: DateTime<Utc>) -> Self {
        Self {
            id: film.id.clone(),
            brand: film.brand.clone(),
            model: film.model.clone(),
            slug: film.slug.clone(),
            film_type: serde_json::to_string(&film.film_type).unwrap_or_default(),
            color: film.color.clone(),
            iso: film.iso.clone(),
            image: film.image.clone(),
            year_start: film.year_start,
            year_end: film.year_end.clone(),
            country: film.country.clone(),
            description: film.description.clone(),
            purchase_links: serde_json::to_string(&film.purchase_links).unwrap_or_default(),
            is_favorite: film.is_favorite,
            is_popular: film.is_popular,
            is_dead: film.is_dead,
            cached_at,
        }
    }

    /// 还原为值记录，损坏的 JSON 列按空数组处理
    pub fn to_film(&self) -> Film {
        let film_type: Vec<String> = serde_json::from_str(&self.film_type).unwrap_or_default();
        let purchase_links: Vec<String> =
            serde_json::from_str(&self.purchase_links).unwrap_or_default();

        Film {
            id: self.id.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            slug: self.slug.clone(),
            film_type,
            color: self.color.clone(),
            iso: self.iso.clone(),
            image: self.image.clone(),
            year_start: self.year_start,
            year_end: self.year_end.clone(),
            country: self.country.clone(),
            description: self.description.clone(),
            purchase_links,
            is_favorite: self.is_favorite,
            is_popular: self.is_popular,
            is_dead: self.is_dead,
        }
    }
}

/// 品牌缓存行
#[derive(Debug, Clone, FromRow)]
pub struct CachedBrand {
    pub name: String,
    pub cached_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_round_trip_through_cached_row() {
        let film = Film {
            id: "ilford-hp5".to_string(),
            brand: "Ilford".to_string(),
            model: "HP5 Plus".to_string(),
            slug: "ilford-hp5-plus".to_string(),
            film_type: vec!["35mm".to_string(), "120".to_string()],
            color: "Black and white".to_string(),
            iso: "400".to_string(),
            image: Some("https://example.com/hp5.jpg".to_string()),
            year_start: Some(1976),
            year_end: None,
            country: "United Kingdom".to_string(),
            description: "Classic push-friendly emulsion".to_string(),
            purchase_links: vec!["https://shop.example.com/hp5".to_string()],
            is_favorite: true,
            is_popular: true,
            is_dead: false,
        };

        let row = CachedFilm::from_film(&film, Utc::now());
        let restored = row.to_film();

        assert_eq!(restored.id, film.id);
        assert_eq!(restored.film_type, film.film_type);
        assert_eq!(restored.purchase_links, film.purchase_links);
        assert!(restored.is_favorite);
    }

    #[test]
    fn test_corrupt_json_columns_degrade_to_empty() {
        let film = Film {
            id: "x".to_string(),
            brand: String::new(),
            model: String::new(),
            slug: String::new(),
            film_type: vec![],
            color: String::new(),
            iso: "0".to_string(),
            image: None,
            year_start: None,
            year_end: None,
            country: String::new(),
            description: String::new(),
            purchase_links: vec![],
            is_favorite: true,
            is_popular: false,
            is_dead: false,
        };

        let mut row = CachedFilm::from_film(&film, Utc::now());
        row.film_type = "not json".to_string();
        row.purchase_links = "{broken".to_string();

        let restored = row.to_film();
        assert!(restored.film_type.is_empty());
        assert!(restored.purchase_links.is_empty());
    }
}
