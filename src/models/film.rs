use serde::{Deserialize, Serialize};

/// 胶片显色类型
///
/// 不入库的派生分类：根据原始 color 字符串按不区分大小写的子串匹配
/// 归入黑白 / 彩色负片 / 其他三类之一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilmColorType {
    BlackAndWhite,
    Color,
    Other,
}

impl FilmColorType {
    /// 从原始 color 字符串归类
    ///
    /// 判定顺序：
    /// 1. 同时包含 "black" 和 "white"，或包含 "b&w" / "monochrome"，或整串为 "bw" → 黑白
    /// 2. 包含 "color" 或 "colour" 且包含 "negative" → 彩色负片
    /// 3. 其余 → 其他
    pub fn classify(color: &str) -> Self {
        let lowercased = color.to_lowercase();

        if (lowercased.contains("black") && lowercased.contains("white"))
            || lowercased.contains("b&w")
            || lowercased.contains("monochrome")
            || lowercased == "bw"
        {
            FilmColorType::BlackAndWhite
        } else if (lowercased.contains("color") || lowercased.contains("colour"))
            && lowercased.contains("negative")
        {
            FilmColorType::Color
        } else {
            FilmColorType::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilmColorType::BlackAndWhite => "Black and white",
            FilmColorType::Color => "Color negative",
            FilmColorType::Other => "Other",
        }
    }
}

/// 胶片条目
///
/// 不可变的值记录，身份与相等性均以 `id` 为准。
/// 网络响应中每次 fetch/merge 都会重新构造，收藏记录另见 `CachedFilm`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: String,

    pub brand: String,
    pub model: String,
    pub slug: String,

    /// 画幅规格列表（35mm、120 等）
    #[serde(rename = "type", default)]
    pub film_type: Vec<String>,
    pub color: String,
    /// ISO 感光度，接口字段为 isoMin，保持字符串原样
    #[serde(rename = "isoMin")]
    pub iso: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<String>,

    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub purchase_links: Vec<String>,

    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub is_dead: bool,
}

impl PartialEq for Film {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Film {}

impl std::hash::Hash for Film {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Film {
    /// 派生显色类型
    pub fn color_type(&self) -> FilmColorType {
        FilmColorType::classify(&self.color)
    }

    /// 生产年份展示文本
    ///
    /// 有起始年份时返回 "1954 - 2005" 或 "1954 - Present"，否则返回空串
    pub fn formatted_years(&self) -> String {
        let Some(year_start) = self.year_start.filter(|y| *y > 0) else {
            return String::new();
        };

        match self.year_end.as_deref() {
            Some(end) if !end.is_empty() => format!("{} - {}", year_start, end),
            _ => format!("{} - Present", year_start),
        }
    }

    pub fn has_valid_years(&self) -> bool {
        self.year_start.map_or(false, |y| y > 0)
    }

    /// 画幅规格展示文本，逗号连接
    pub fn film_types(&self) -> String {
        self.film_type.join(", ")
    }

    /// 返回仅改变收藏标记的副本
    pub fn with_favorite(&self, is_favorite: bool) -> Film {
        Film {
            is_favorite,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film_with_color(color: &str) -> Film {
        Film {
            id: "test-1".to_string(),
            brand: "Ilford".to_string(),
            model: "HP5 Plus".to_string(),
            slug: "ilford-hp5-plus".to_string(),
            film_type: vec!["35mm".to_string(), "120".to_string()],
            color: color.to_string(),
            iso: "400".to_string(),
            image: None,
            year_start: Some(1976),
            year_end: None,
            country: "United Kingdom".to_string(),
            description: String::new(),
            purchase_links: vec![],
            is_favorite: false,
            is_popular: true,
            is_dead: false,
        }
    }

    #[test]
    fn test_color_type_black_and_white_variants() {
        assert_eq!(
            FilmColorType::classify("Black and White 35mm"),
            FilmColorType::BlackAndWhite
        );
        assert_eq!(FilmColorType::classify("B&W"), FilmColorType::BlackAndWhite);
        assert_eq!(
            FilmColorType::classify("monochrome stock"),
            FilmColorType::BlackAndWhite
        );
        assert_eq!(FilmColorType::classify("BW"), FilmColorType::BlackAndWhite);
    }

    #[test]
    fn test_color_type_color_negative_variants() {
        assert_eq!(
            FilmColorType::classify("Color Negative"),
            FilmColorType::Color
        );
        assert_eq!(
            FilmColorType::classify("Colour Negative"),
            FilmColorType::Color
        );
    }

    #[test]
    fn test_color_type_other() {
        // 反转片既不含 negative 也不属于黑白
        assert_eq!(
            FilmColorType::classify("Color reversal"),
            FilmColorType::Other
        );
        assert_eq!(FilmColorType::classify("slide"), FilmColorType::Other);
        assert_eq!(FilmColorType::classify(""), FilmColorType::Other);
    }

    #[test]
    fn test_film_equality_is_by_id() {
        let a = film_with_color("B&W");
        let mut b = film_with_color("Color Negative");
        b.model = "Different".to_string();
        assert_eq!(a, b);

        let mut c = film_with_color("B&W");
        c.id = "test-2".to_string();
        assert_ne!(a, c);
    }

    #[test]
    fn test_formatted_years() {
        let mut film = film_with_color("B&W");
        assert_eq!(film.formatted_years(), "1976 - Present");

        film.year_end = Some("2005".to_string());
        assert_eq!(film.formatted_years(), "1976 - 2005");

        film.year_start = None;
        assert_eq!(film.formatted_years(), "");

        film.year_start = Some(0);
        assert_eq!(film.formatted_years(), "");
    }

    #[test]
    fn test_wire_format_decoding() {
        // 接口字段使用 isoMin / type，布尔字段缺省为 false
        let json = r#"{
            "id": "kodak-portra-400",
            "brand": "Kodak",
            "model": "Portra 400",
            "slug": "kodak-portra-400",
            "type": ["35mm", "120"],
            "color": "Color negative",
            "isoMin": "400",
            "country": "United States",
            "description": "Professional color negative film",
            "purchaseLinks": ["https://example.com/portra"],
            "isPopular": true
        }"#;

        let film: Film = serde_json::from_str(json).unwrap();
        assert_eq!(film.iso, "400");
        assert_eq!(film.film_type, vec!["35mm", "120"]);
        assert!(film.is_popular);
        assert!(!film.is_favorite);
        assert!(!film.is_dead);
        assert_eq!(film.color_type(), FilmColorType::Color);
    }
}
