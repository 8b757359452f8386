use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use utils_common::Difficulty;

use crate::date::DateFilter;
use crate::error::FilterError;

/// 可多选的筛选维度
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facet {
    Tag,
    Category,
    Difficulty,
}

impl FromStr for Facet {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tag" | "tags" => Ok(Facet::Tag),
            "category" | "categories" => Ok(Facet::Category),
            "difficulty" | "difficulties" => Ok(Facet::Difficulty),
            _ => Err(FilterError::UnknownFacet(s.to_string())),
        }
    }
}

/// 一次页面浏览期间的筛选状态
///
/// 集合类维度一律存小写值。除直接翻页外，任何修改都会把页码重置为1。
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    search_query: String,
    tag_filters: BTreeSet<String>,
    category_filters: BTreeSet<String>,
    difficulty_filters: BTreeSet<Difficulty>,
    date_filter: Option<DateFilter>,
    current_page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            tag_filters: BTreeSet::new(),
            category_filters: BTreeSet::new(),
            difficulty_filters: BTreeSet::new(),
            date_filter: None,
            current_page: 1,
        }
    }
}

/// 有则删、无则加；返回切换后是否处于选中状态
fn toggle_in<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换某个维度上的一个取值
    ///
    /// 空白取值被忽略，返回 `Ok(false)` 且不重置页码。
    pub fn toggle(&mut self, facet: Facet, value: &str) -> Result<bool, FilterError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(false);
        }

        let selected = match facet {
            Facet::Tag => toggle_in(&mut self.tag_filters, value.to_lowercase()),
            Facet::Category => toggle_in(&mut self.category_filters, value.to_lowercase()),
            Facet::Difficulty => toggle_in(&mut self.difficulty_filters, value.parse()?),
        };
        self.current_page = 1;
        Ok(selected)
    }

    /// 提交（已防抖的）搜索词，去掉首尾空白并转小写
    pub fn set_search(&mut self, query: &str) {
        self.search_query = query.trim().to_lowercase();
        self.current_page = 1;
    }

    /// 替换日期筛选（单选）
    pub fn set_date(&mut self, filter: Option<DateFilter>) {
        self.date_filter = filter;
        self.current_page = 1;
    }

    /// 清空所有筛选
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// 排序等外部设置变化时使用
    pub fn reset_page(&mut self) {
        self.current_page = 1;
    }

    /// 直接翻页，不做范围检查；越界在分页时被截断
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// 已激活的筛选数量，用于界面角标
    pub fn active_facet_count(&self) -> usize {
        self.tag_filters.len()
            + self.category_filters.len()
            + self.difficulty_filters.len()
            + usize::from(self.date_filter.is_some())
    }

    /// 是否有任何筛选（包括搜索词）处于激活状态
    pub fn is_filtering(&self) -> bool {
        !self.search_query.is_empty() || self.active_facet_count() > 0
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn tag_filters(&self) -> &BTreeSet<String> {
        &self.tag_filters
    }

    pub fn category_filters(&self) -> &BTreeSet<String> {
        &self.category_filters
    }

    pub fn difficulty_filters(&self) -> &BTreeSet<Difficulty> {
        &self.difficulty_filters
    }

    pub fn date_filter(&self) -> Option<&DateFilter> {
        self.date_filter.as_ref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }
}
