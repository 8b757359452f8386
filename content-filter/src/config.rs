use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FilterError;
use crate::taxonomy::{TaxonomyTables, DEFAULT_TABLES};

/// 排序字段
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Title,
    Popularity,
}

/// 排序方向
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// 排序方式
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub const NEWEST: SortSpec = SortSpec { key: SortKey::Date, order: SortOrder::Desc };
    pub const POPULAR: SortSpec = SortSpec { key: SortKey::Popularity, order: SortOrder::Desc };
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::NEWEST
    }
}

impl FromStr for SortSpec {
    type Err = FilterError;

    /// 接受 "newest", "oldest", "title_asc", "title_desc", "popular", "least_popular"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, order) = match s.trim().to_lowercase().as_str() {
            "newest" | "date_desc" => (SortKey::Date, SortOrder::Desc),
            "oldest" | "date_asc" => (SortKey::Date, SortOrder::Asc),
            "title_asc" | "name_asc" => (SortKey::Title, SortOrder::Asc),
            "title_desc" | "name_desc" => (SortKey::Title, SortOrder::Desc),
            "popular" | "popularity_desc" => (SortKey::Popularity, SortOrder::Desc),
            "least_popular" | "popularity_asc" => (SortKey::Popularity, SortOrder::Asc),
            _ => return Err(FilterError::InvalidSort(s.to_string())),
        };
        Ok(SortSpec { key, order })
    }
}

fn default_page_size() -> usize {
    10
}

fn default_tables() -> TaxonomyTables {
    DEFAULT_TABLES.clone()
}

/// 内容集合配置 - 每个列表页（博客、项目）各一份
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CollectionConfig {
    /// 集合名称，仅用于日志
    #[serde(default)]
    pub name: String,
    /// 每页条数
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// 默认排序
    #[serde(default)]
    pub sort: SortSpec,
    /// 标签分类关键字表
    #[serde(default = "default_tables")]
    pub taxonomy: TaxonomyTables,
}

impl CollectionConfig {
    /// 博客列表：每页10篇，最新在前
    pub fn blog() -> Self {
        Self {
            name: "blog".to_string(),
            page_size: 10,
            sort: SortSpec::NEWEST,
            taxonomy: default_tables(),
        }
    }

    /// 项目列表：每页12个，最热门在前
    pub fn projects() -> Self {
        Self {
            name: "projects".to_string(),
            page_size: 12,
            sort: SortSpec::POPULAR,
            taxonomy: default_tables(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let config: CollectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.page_size == 0 {
            return Err(FilterError::InvalidConfig("每页条数必须大于0".to_string()));
        }
        Ok(())
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self::blog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_config_fills_defaults() {
        let config = CollectionConfig::from_json(r#"{"name":"notes"}"#).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.sort, SortSpec::NEWEST);
        assert!(config.taxonomy.languages.iter().any(|l| l == "rust"));
    }

    #[test]
    fn custom_tables_replace_builtin_ones() {
        let json = r#"{
            "page_size": 6,
            "sort": {"key": "title", "order": "asc"},
            "taxonomy": {"languages": ["kotlin"]}
        }"#;
        let config = CollectionConfig::from_json(json).unwrap();
        assert_eq!(config.page_size, 6);
        assert_eq!(config.sort, SortSpec { key: SortKey::Title, order: SortOrder::Asc });
        assert_eq!(config.taxonomy.languages, vec!["kotlin".to_string()]);
        assert!(config.taxonomy.frameworks.is_empty());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = CollectionConfig::from_json(r#"{"page_size":0}"#).unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig(_)));
    }

    #[test]
    fn sort_names_parse() {
        assert_eq!("oldest".parse::<SortSpec>().unwrap().order, SortOrder::Asc);
        assert_eq!("popular".parse::<SortSpec>().unwrap(), SortSpec::POPULAR);
        assert!("random".parse::<SortSpec>().is_err());
    }
}
