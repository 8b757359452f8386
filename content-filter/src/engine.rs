//! 筛选引擎：持有条目与筛选状态，缓存派生结果并积累变更通知
//!
//! 每次状态变化都会使缓存失效；下一次读取结果时对全部条目重新筛选、排序。

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use utils_common::{ContentItem, Difficulty};

use crate::aggregate::{compute_filtered, sort_indices};
use crate::config::{CollectionConfig, SortSpec};
use crate::date::{DateFilter, RelativeWindow};
use crate::error::FilterError;
use crate::models::{ContentIndex, IndexedItem};
use crate::observer::{ListenerId, Listeners};
use crate::pagination::{PageBounds, PaginationResult};
use crate::state::{Facet, FilterState};
use crate::taxonomy::{TagGroup, TagPartition, TagTaxonomy};
use crate::timer::{Debouncer, Timer, SEARCH_DEBOUNCE};

/// 当前时间来源
pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// 引擎发出的变更通知
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// 筛选或排序变化，结果需要重新渲染
    ResultsChanged,
    /// 翻页
    PageChanged { page: usize, scroll_into_view: bool },
}

/// 某个维度上可供选择的一个取值
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FacetOption {
    /// 小写取值，用于切换
    pub value: String,
    /// 展示文本
    pub label: String,
    /// 含该取值的条目数（不受当前筛选影响）
    pub count: usize,
    /// 是否已选中
    pub selected: bool,
}

/// 界面可展示的全部筛选选项
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FacetOptions {
    pub tags: BTreeMap<TagGroup, Vec<FacetOption>>,
    pub categories: Vec<FacetOption>,
    pub difficulties: Vec<FacetOption>,
    /// 条目中出现过的年份，倒序
    pub years: Vec<i32>,
    /// 相对时间窗口取值
    pub date_windows: Vec<&'static str>,
    /// 当前日期筛选
    pub date: Option<String>,
}

pub struct FilterEngine {
    config: CollectionConfig,
    taxonomy: TagTaxonomy,
    items: Vec<IndexedItem>,
    tags: TagPartition,
    years: Vec<i32>,
    state: FilterState,
    sort: SortSpec,
    clock: Clock,
    filtered: RefCell<Option<Rc<[usize]>>>,
    /// 尚未送出的变更通知
    events: Vec<EngineEvent>,
}

impl FilterEngine {
    /// 用内容加载方给出的条目列表创建引擎
    pub fn new(items: Vec<ContentItem>, config: CollectionConfig) -> Result<Self, FilterError> {
        config.validate()?;
        let taxonomy = TagTaxonomy::new(&config.taxonomy);
        let tags = taxonomy.partition(items.iter().flat_map(|i| i.tags.iter().map(String::as_str)));
        let items: Vec<IndexedItem> = items.into_iter().map(IndexedItem::new).collect();
        let years: BTreeSet<i32> = items.iter().filter_map(|i| i.date.map(|d| d.year())).collect();

        Ok(Self::assemble(config, taxonomy, items, tags, years.into_iter().rev().collect()))
    }

    /// 用预构建的压缩索引创建引擎
    pub fn from_index(index: ContentIndex) -> Result<Self, FilterError> {
        index.config.validate()?;
        let taxonomy = TagTaxonomy::new(&index.config.taxonomy);
        let items = index.items.into_iter().map(IndexedItem::new).collect();
        Ok(Self::assemble(index.config, taxonomy, items, index.tags, index.years))
    }

    fn assemble(
        config: CollectionConfig,
        taxonomy: TagTaxonomy,
        items: Vec<IndexedItem>,
        tags: TagPartition,
        years: Vec<i32>,
    ) -> Self {
        crate::console_log!(
            "筛选引擎就绪: 集合 {}, 条目 {}, 每页 {}",
            config.name,
            items.len(),
            config.page_size
        );
        Self {
            sort: config.sort,
            config,
            taxonomy,
            items,
            tags,
            years,
            state: FilterState::new(),
            clock: Box::new(Utc::now),
            filtered: RefCell::new(None),
            events: Vec::new(),
        }
    }

    /// 替换时间来源
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    //===== 通知 =====

    fn notify(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// 取出累积的变更通知，由持有者在释放可变借用后分发
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn invalidate(&mut self) {
        self.filtered.replace(None);
        self.notify(EngineEvent::ResultsChanged);
    }

    //===== 筛选 =====

    pub fn toggle(&mut self, facet: Facet, value: &str) -> Result<bool, FilterError> {
        let before = self.state.clone();
        let selected = self.state.toggle(facet, value)?;
        if self.state != before {
            self.invalidate();
        }
        Ok(selected)
    }

    pub fn set_search(&mut self, query: &str) {
        self.state.set_search(query);
        self.invalidate();
    }

    pub fn set_date(&mut self, filter: Option<DateFilter>) {
        self.state.set_date(filter);
        self.invalidate();
    }

    /// 以界面取值设置日期筛选（"all"、"last-month"、"2024" 等）
    pub fn set_date_value(&mut self, value: &str) -> Result<(), FilterError> {
        let filter = DateFilter::parse_optional(value)?;
        self.set_date(filter);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.state.clear_all();
        self.invalidate();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.state.reset_page();
        self.invalidate();
    }

    /// 时间推移后重新计算相对时间窗口
    pub fn refresh(&mut self) {
        self.invalidate();
    }

    //===== 翻页 =====

    fn bounds(&self) -> PageBounds {
        PageBounds::new(self.filtered_count(), self.config.page_size, self.state.current_page())
    }

    fn move_to(&mut self, page: usize) -> bool {
        if page == self.bounds().page {
            return false;
        }
        self.state.set_page(page);
        self.notify(EngineEvent::PageChanged { page, scroll_into_view: true });
        true
    }

    /// 跳到指定页；越界输入被忽略
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.bounds().total_pages {
            return false;
        }
        self.move_to(page)
    }

    /// 下一页；已在末页时不动
    pub fn next(&mut self) -> bool {
        let bounds = self.bounds();
        bounds.has_next() && self.move_to(bounds.page + 1)
    }

    /// 上一页；已在首页时不动
    pub fn previous(&mut self) -> bool {
        let bounds = self.bounds();
        bounds.has_previous() && self.move_to(bounds.page - 1)
    }

    //===== 结果 =====

    fn filtered(&self) -> Rc<[usize]> {
        if let Some(cached) = self.filtered.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let now = (self.clock)();
        let mut indices = compute_filtered(&self.items, &self.state, &self.taxonomy, now);
        sort_indices(&self.items, &mut indices, self.sort);
        let indices: Rc<[usize]> = indices.into();
        self.filtered.replace(Some(Rc::clone(&indices)));
        indices
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    /// 筛选并排序后的全部条目
    pub fn filtered_items(&self) -> Vec<&ContentItem> {
        self.filtered().iter().map(|&i| &self.items[i].item).collect()
    }

    /// 当前页的结果
    pub fn result(&self) -> PaginationResult<ContentItem> {
        let filtered = self.filtered();
        let bounds = self.bounds();
        PaginationResult::from_bounds(bounds, filtered.len(), self.config.page_size, |range| {
            filtered[range]
                .iter()
                .map(|&i| self.items[i].item.clone())
                .collect()
        })
    }

    pub fn active_facet_count(&self) -> usize {
        self.state.active_facet_count()
    }

    /// 可供选择的筛选选项及其条目数
    pub fn facet_options(&self) -> FacetOptions {
        let mut tag_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut category_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut difficulty_counts: BTreeMap<Difficulty, usize> = BTreeMap::new();
        for item in &self.items {
            for tag in &item.tags {
                *tag_counts.entry(tag.as_str()).or_default() += 1;
            }
            if !item.category.is_empty() {
                *category_counts.entry(item.category.as_str()).or_default() += 1;
            }
            if let Some(difficulty) = item.difficulty() {
                *difficulty_counts.entry(difficulty).or_default() += 1;
            }
        }

        let state = &self.state;
        let tags = self
            .tags
            .groups
            .iter()
            .map(|(group, tags)| {
                let options = tags
                    .iter()
                    .map(|(value, label)| FacetOption {
                        value: value.clone(),
                        label: label.clone(),
                        count: tag_counts.get(value.as_str()).copied().unwrap_or(0),
                        selected: state.tag_filters().contains(value),
                    })
                    .collect();
                (*group, options)
            })
            .collect();

        let categories = category_counts
            .into_iter()
            .map(|(value, count)| FacetOption {
                value: value.to_string(),
                label: value.to_string(),
                count,
                selected: state.category_filters().contains(value),
            })
            .collect();

        let difficulties = difficulty_counts
            .into_iter()
            .map(|(difficulty, count)| FacetOption {
                value: difficulty.as_str().to_string(),
                label: difficulty.as_str().to_string(),
                count,
                selected: state.difficulty_filters().contains(&difficulty),
            })
            .collect();

        FacetOptions {
            tags,
            categories,
            difficulties,
            years: self.years.clone(),
            date_windows: RelativeWindow::ALL.iter().map(|w| w.as_str()).collect(),
            date: state.date_filter().map(ToString::to_string),
        }
    }
}

/// 在可变借用内修改引擎，借用释放后再分发期间产生的通知
fn apply<R>(
    engine: &RefCell<FilterEngine>,
    listeners: &Listeners,
    change: impl FnOnce(&mut FilterEngine) -> R,
) -> R {
    let (result, events) = {
        let mut engine = engine.borrow_mut();
        let result = change(&mut engine);
        (result, engine.drain_events())
    };
    listeners.dispatch(events);
    result
}

/// 一次页面浏览的会话：共享的引擎、订阅者和搜索防抖
///
/// 订阅者被调用时引擎没有被借用，可以通过会话回读结果或继续修改筛选。
/// 定时任务只持有弱引用，会话销毁后待执行的搜索被取消。
pub struct FilterSession<T: Timer> {
    engine: Rc<RefCell<FilterEngine>>,
    listeners: Rc<Listeners>,
    debouncer: Debouncer<T>,
}

impl<T: Timer> FilterSession<T> {
    pub fn new(engine: FilterEngine, timer: T) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            listeners: Rc::new(Listeners::new()),
            debouncer: Debouncer::new(timer, SEARCH_DEBOUNCE),
        }
    }

    /// 只读访问引擎；不要跨越修改操作持有
    pub fn engine(&self) -> Ref<'_, FilterEngine> {
        self.engine.borrow()
    }

    /// 修改引擎并通知订阅者
    pub fn update<R>(&self, change: impl FnOnce(&mut FilterEngine) -> R) -> R {
        apply(&self.engine, &self.listeners, change)
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// 处理一次按键输入；静默一个防抖间隔后才提交搜索词
    pub fn search_input(&self, raw: &str) {
        let engine = Rc::downgrade(&self.engine);
        let listeners = Rc::downgrade(&self.listeners);
        let raw = raw.to_string();
        self.debouncer.call(move || {
            if let (Some(engine), Some(listeners)) = (engine.upgrade(), listeners.upgrade()) {
                apply(&engine, &listeners, |engine| engine.set_search(&raw));
            }
        });
    }

    /// 立即提交搜索词，并取消待执行的防抖任务
    pub fn set_search_now(&self, query: &str) {
        self.debouncer.cancel();
        self.update(|engine| engine.set_search(query));
    }

    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// 清空筛选时一并丢弃未提交的搜索输入
    pub fn clear_all(&self) {
        self.debouncer.cancel();
        self.update(FilterEngine::clear_all);
    }
}
