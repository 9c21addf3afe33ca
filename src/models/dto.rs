use serde::{Deserialize, Serialize};

use super::Film;

/// 胶片分页数据传输对象
///
/// 既是同步引擎每页的返回值，也是远端 /films 接口的线上格式。
/// 部分线上版本将数组字段命名为 data，解码时两者都接受
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmsDTO {
    #[serde(alias = "data")]
    pub films: Vec<Film>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_films_key() {
        let json = r#"{"films": [], "total": 42}"#;
        let dto: FilmsDTO = serde_json::from_str(json).unwrap();
        assert!(dto.films.is_empty());
        assert_eq!(dto.total, 42);
    }

    #[test]
    fn test_decodes_data_alias() {
        let json = r#"{
            "data": [{
                "id": "f1",
                "brand": "Fuji",
                "model": "Acros II",
                "slug": "fuji-acros-ii",
                "type": ["120"],
                "color": "B&W",
                "isoMin": "100"
            }],
            "total": 1
        }"#;
        let dto: FilmsDTO = serde_json::from_str(json).unwrap();
        assert_eq!(dto.films.len(), 1);
        assert_eq!(dto.films[0].id, "f1");
        assert_eq!(dto.total, 1);
    }
}
