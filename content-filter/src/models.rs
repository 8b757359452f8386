use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utils_common::{ContentItem, Difficulty};

use crate::config::CollectionConfig;
use crate::date::parse_item_date;
use crate::error::FilterError;
use crate::taxonomy::TagPartition;

/// 索引格式主版本
pub const INDEX_FORMAT_VERSION: [u8; 2] = [1, 0];

/// 预处理后的条目 - 每个条目列表只计算一次，筛选时不再重复转换
#[derive(Clone, Debug)]
pub struct IndexedItem {
    /// 原始条目
    pub item: ContentItem,
    /// 小写标题
    pub title: String,
    /// 小写摘要
    pub summary: String,
    /// 去重后的小写标签
    pub tags: BTreeSet<String>,
    /// 小写分类
    pub category: String,
    /// 解析后的日期，缺失或无法解析为 None
    pub date: Option<DateTime<Utc>>,
}

impl IndexedItem {
    pub fn new(item: ContentItem) -> Self {
        let tags = item
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        let date = item.date.as_deref().and_then(parse_item_date);

        Self {
            title: item.title.to_lowercase(),
            summary: item.summary.to_lowercase(),
            category: item.category(),
            tags,
            date,
            item,
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.item.difficulty
    }

    pub fn popularity(&self) -> Option<f64> {
        self.item.popularity
    }
}

/// 预构建的内容索引 - 以压缩二进制形式随页面分发
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContentIndex {
    /// 集合配置
    pub config: CollectionConfig,
    /// 所有条目
    pub items: Vec<ContentItem>,
    /// 全部标签的分区
    pub tags: TagPartition,
    /// 条目中出现过的年份，倒序
    pub years: Vec<i32>,
}

impl ContentIndex {
    /// 从压缩的二进制数据恢复索引
    pub fn from_compressed(data: &[u8]) -> Result<Self, FilterError> {
        let index: ContentIndex =
            utils_common::from_compressed(data, INDEX_FORMAT_VERSION[0])?;
        index.config.validate()?;
        Ok(index)
    }

    /// 序列化为压缩的二进制数据
    pub fn to_compressed(&self) -> Result<Vec<u8>, FilterError> {
        Ok(utils_common::to_compressed(self, INDEX_FORMAT_VERSION)?)
    }
}
