use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Film;

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilmSortField {
    Name,
    Popularity,
    Iso,
    Freshness,
}

impl FilmSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilmSortField::Name => "name",
            FilmSortField::Popularity => "popularity",
            FilmSortField::Iso => "iso",
            FilmSortField::Freshness => "freshness",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FilmSortField::Name => "Name",
            FilmSortField::Popularity => "Popularity",
            FilmSortField::Iso => "ISO",
            FilmSortField::Freshness => "Freshness",
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// 排序选项：字段 + 方向
///
/// 序列化为远端查询参数：升序为字段名本身，降序为 "{field}-desc"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilmSortOption {
    pub field: FilmSortField,
    pub direction: SortDirection,
}

impl FilmSortOption {
    pub const NAME_ASC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Name,
        direction: SortDirection::Ascending,
    };
    pub const NAME_DESC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Name,
        direction: SortDirection::Descending,
    };
    pub const POPULARITY_ASC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Popularity,
        direction: SortDirection::Ascending,
    };
    pub const POPULARITY_DESC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Popularity,
        direction: SortDirection::Descending,
    };
    pub const ISO_ASC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Iso,
        direction: SortDirection::Ascending,
    };
    pub const FRESHNESS_ASC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Freshness,
        direction: SortDirection::Ascending,
    };
    pub const FRESHNESS_DESC: FilmSortOption = FilmSortOption {
        field: FilmSortField::Freshness,
        direction: SortDirection::Descending,
    };

    /// 可供筛选面板展示的全部预设
    pub const ALL_OPTIONS: [FilmSortOption; 7] = [
        Self::NAME_ASC,
        Self::NAME_DESC,
        Self::POPULARITY_ASC,
        Self::POPULARITY_DESC,
        Self::FRESHNESS_ASC,
        Self::FRESHNESS_DESC,
        Self::ISO_ASC,
    ];

    /// 远端查询参数值
    pub fn api_value(&self) -> String {
        match self.direction {
            SortDirection::Ascending => self.field.as_str().to_string(),
            SortDirection::Descending => format!("{}-desc", self.field.as_str()),
        }
    }

    /// 从查询参数值解析，如 "name" 或 "iso-desc"
    pub fn from_api_value(value: &str) -> Option<FilmSortOption> {
        let (field_str, direction) = match value.strip_suffix("-desc") {
            Some(field) => (field, SortDirection::Descending),
            None => (value, SortDirection::Ascending),
        };

        let field = match field_str {
            "name" => FilmSortField::Name,
            "popularity" => FilmSortField::Popularity,
            "iso" => FilmSortField::Iso,
            "freshness" => FilmSortField::Freshness,
            _ => return None,
        };

        Some(FilmSortOption { field, direction })
    }

    pub fn display_name(&self) -> String {
        let symbol = match self.direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        };
        format!("{} {}", self.field.display_name(), symbol)
    }
}

impl Default for FilmSortOption {
    fn default() -> Self {
        Self::POPULARITY_DESC
    }
}

/// ISO 字段按整数解析，非数字视为 0
fn parse_iso(iso: &str) -> i64 {
    iso.parse::<i64>().unwrap_or(0)
}

/// 共享排序原语
///
/// name 按型号字典序，popularity 按是否热门的二值比较，
/// iso 按整数值，freshness 按 id 字典序（仅为新旧程度的启发式近似）。
/// 降序时整体反转，不要求稳定排序
pub fn sort_films(films: &mut [Film], option: FilmSortOption) {
    let compare = |a: &Film, b: &Film| -> Ordering {
        match option.field {
            FilmSortField::Name => a.model.cmp(&b.model),
            FilmSortField::Popularity => a.is_popular.cmp(&b.is_popular),
            FilmSortField::Iso => parse_iso(&a.iso).cmp(&parse_iso(&b.iso)),
            FilmSortField::Freshness => a.id.cmp(&b.id),
        }
    };

    match option.direction {
        SortDirection::Ascending => films.sort_by(compare),
        SortDirection::Descending => films.sort_by(|a, b| compare(a, b).reverse()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn film(id: &str, model: &str, iso: &str, is_popular: bool) -> Film {
        Film {
            id: id.to_string(),
            brand: "Test".to_string(),
            model: model.to_string(),
            slug: id.to_string(),
            film_type: vec![],
            color: "B&W".to_string(),
            iso: iso.to_string(),
            image: None,
            year_start: None,
            year_end: None,
            country: String::new(),
            description: String::new(),
            purchase_links: vec![],
            is_favorite: false,
            is_popular,
            is_dead: false,
        }
    }

    #[test]
    fn test_api_value_serialization() {
        assert_eq!(FilmSortOption::NAME_ASC.api_value(), "name");
        assert_eq!(FilmSortOption::NAME_DESC.api_value(), "name-desc");
        assert_eq!(FilmSortOption::POPULARITY_DESC.api_value(), "popularity-desc");
        assert_eq!(FilmSortOption::ISO_ASC.api_value(), "iso");
    }

    #[test]
    fn test_api_value_round_trip() {
        for option in FilmSortOption::ALL_OPTIONS {
            assert_eq!(
                FilmSortOption::from_api_value(&option.api_value()),
                Some(option)
            );
        }
        assert_eq!(FilmSortOption::from_api_value("rating"), None);
        assert_eq!(FilmSortOption::from_api_value(""), None);
    }

    #[test]
    fn test_iso_sort_treats_non_numeric_as_zero() {
        let mut films = vec![
            film("a", "A", "abc", false),
            film("b", "B", "100", false),
            film("c", "C", "50", false),
        ];
        sort_films(&mut films, FilmSortOption::ISO_ASC);

        let isos: Vec<&str> = films.iter().map(|f| f.iso.as_str()).collect();
        assert_eq!(isos, vec!["abc", "50", "100"]);
    }

    #[test]
    fn test_name_sort_both_directions() {
        let mut films = vec![
            film("1", "Tri-X", "400", false),
            film("2", "Acros", "100", false),
            film("3", "Portra", "400", false),
        ];
        sort_films(&mut films, FilmSortOption::NAME_ASC);
        let models: Vec<&str> = films.iter().map(|f| f.model.as_str()).collect();
        assert_eq!(models, vec!["Acros", "Portra", "Tri-X"]);

        sort_films(&mut films, FilmSortOption::NAME_DESC);
        let models: Vec<&str> = films.iter().map(|f| f.model.as_str()).collect();
        assert_eq!(models, vec!["Tri-X", "Portra", "Acros"]);
    }

    #[test]
    fn test_popularity_descending_puts_popular_first() {
        let mut films = vec![
            film("1", "A", "100", false),
            film("2", "B", "100", true),
            film("3", "C", "100", false),
        ];
        sort_films(&mut films, FilmSortOption::POPULARITY_DESC);
        assert!(films[0].is_popular);
        assert!(!films[2].is_popular);

        sort_films(&mut films, FilmSortOption::POPULARITY_ASC);
        assert!(!films[0].is_popular);
        assert!(films[2].is_popular);
    }

    #[test]
    fn test_freshness_sorts_by_id() {
        let mut films = vec![
            film("c-3", "C", "100", false),
            film("a-1", "A", "100", false),
            film("b-2", "B", "100", false),
        ];
        sort_films(&mut films, FilmSortOption::FRESHNESS_DESC);
        let ids: Vec<&str> = films.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["c-3", "b-2", "a-1"]);
    }

    proptest! {
        // 升序与降序互为反转：任意输入下两个方向的结果逆序相等
        #[test]
        fn prop_descending_reverses_ascending(isos in proptest::collection::vec("[0-9]{1,4}|[a-z]{1,4}", 0..20)) {
            let films: Vec<Film> = isos
                .iter()
                .enumerate()
                .map(|(i, iso)| film(&format!("id-{i:02}"), &format!("M{i:02}"), iso, false))
                .collect();

            let mut asc = films.clone();
            sort_films(&mut asc, FilmSortOption::ISO_ASC);
            let mut desc = films;
            sort_films(&mut desc, FilmSortOption { field: FilmSortField::Iso, direction: SortDirection::Descending });

            let asc_keys: Vec<i64> = asc.iter().map(|f| parse_iso(&f.iso)).collect();
            let mut desc_keys: Vec<i64> = desc.iter().map(|f| parse_iso(&f.iso)).collect();
            desc_keys.reverse();
            prop_assert_eq!(asc_keys, desc_keys);
        }

        // 排序不增删元素
        #[test]
        fn prop_sort_preserves_elements(ids in proptest::collection::hash_set("[a-z0-9]{4,8}", 0..20)) {
            let films: Vec<Film> = ids.iter().map(|id| film(id, id, "100", false)).collect();
            let mut sorted = films.clone();
            sort_films(&mut sorted, FilmSortOption::FRESHNESS_ASC);

            let mut before: Vec<String> = films.into_iter().map(|f| f.id).collect();
            let mut after: Vec<String> = sorted.into_iter().map(|f| f.id).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
