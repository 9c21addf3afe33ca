use serde::{Deserialize, Serialize};

use super::FilmSortOption;

/// 列表查询状态
///
/// 搜索词、可选品牌与当前排序选项的组合，属于瞬态查询条件，不入库
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmFilter {
    pub search_text: String,
    pub selected_brand: Option<String>,
    pub sort_option: FilmSortOption,
}

impl FilmFilter {
    /// 搜索词非空或选中了品牌即视为有筛选生效
    pub fn has_active_filters(&self) -> bool {
        !self.search_text.is_empty() || self.selected_brand.is_some()
    }

    /// 恢复默认：清空搜索与品牌，排序回到热门降序
    pub fn reset(&mut self) {
        *self = FilmFilter::default();
    }

    /// 搜索词规整：空串视为未搜索
    pub fn search_term(&self) -> Option<&str> {
        if self.search_text.is_empty() {
            None
        } else {
            Some(self.search_text.as_str())
        }
    }

    /// 品牌规整：空串视为未选择
    pub fn brand(&self) -> Option<&str> {
        self.selected_brand
            .as_deref()
            .filter(|brand| !brand.is_empty())
    }
}

impl Default for FilmFilter {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            selected_brand: None,
            sort_option: FilmSortOption::POPULARITY_DESC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_inactive() {
        let filter = FilmFilter::default();
        assert!(!filter.has_active_filters());
        assert_eq!(filter.sort_option, FilmSortOption::POPULARITY_DESC);
        assert_eq!(filter.search_term(), None);
        assert_eq!(filter.brand(), None);
    }

    #[test]
    fn test_search_or_brand_activates_filter() {
        let mut filter = FilmFilter::default();
        filter.search_text = "portra".to_string();
        assert!(filter.has_active_filters());

        filter.reset();
        assert!(!filter.has_active_filters());

        filter.selected_brand = Some("Kodak".to_string());
        assert!(filter.has_active_filters());
    }

    #[test]
    fn test_empty_brand_is_treated_as_none() {
        let mut filter = FilmFilter::default();
        filter.selected_brand = Some(String::new());
        assert_eq!(filter.brand(), None);
    }
}
