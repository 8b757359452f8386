//! JavaScript 接口 - 页面通过它驱动筛选引擎

use serde::Serialize;
use wasm_bindgen::prelude::*;
use utils_common::ContentItem;

use crate::config::{CollectionConfig, SortSpec};
use crate::engine::{FilterEngine, FilterSession};
use crate::error::FilterError;
use crate::models::ContentIndex;
use crate::observer::ListenerId;
use crate::state::Facet;

#[cfg(target_arch = "wasm32")]
type SessionTimer = crate::timer::BrowserTimer;
#[cfg(not(target_arch = "wasm32"))]
type SessionTimer = crate::timer::ManualTimer;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(err: FilterError) -> JsValue {
    crate::console_warn!("{}", err);
    JsValue::from_str(&err.to_string())
}

/// 结果统一序列化为普通 JS 对象（而不是 Map）
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

/// 内容筛选器 JS 对象 - 每个列表页挂载时创建一个，离开页面时释放
#[wasm_bindgen]
pub struct ContentFilterJS {
    session: FilterSession<SessionTimer>,
}

impl ContentFilterJS {
    fn with_engine(engine: FilterEngine) -> Self {
        Self {
            session: FilterSession::new(engine, SessionTimer::new()),
        }
    }
}

#[wasm_bindgen]
impl ContentFilterJS {
    /// 由条目 JSON 数组和可选的集合配置 JSON 创建
    #[wasm_bindgen(constructor)]
    pub fn new(items_json: &str, config_json: Option<String>) -> Result<ContentFilterJS, JsValue> {
        console_error_panic_hook::set_once();

        let items: Vec<ContentItem> = serde_json::from_str(items_json)
            .map_err(|e| to_js_error(e.into()))?;
        let config = match config_json.as_deref() {
            Some(json) => CollectionConfig::from_json(json).map_err(to_js_error)?,
            None => CollectionConfig::default(),
        };
        let engine = FilterEngine::new(items, config).map_err(to_js_error)?;
        Ok(Self::with_engine(engine))
    }

    /// 由预构建的压缩索引创建
    #[wasm_bindgen(js_name = fromIndex)]
    pub fn from_index(index_data: &[u8]) -> Result<ContentFilterJS, JsValue> {
        console_error_panic_hook::set_once();

        let index = ContentIndex::from_compressed(index_data).map_err(to_js_error)?;
        let engine = FilterEngine::from_index(index).map_err(to_js_error)?;
        Ok(Self::with_engine(engine))
    }

    /// 切换 tag / category / difficulty 维度上的取值，返回切换后是否选中
    pub fn toggle(&self, facet: &str, value: &str) -> Result<bool, JsValue> {
        let facet: Facet = facet.parse().map_err(to_js_error)?;
        self.session
            .update(|engine| engine.toggle(facet, value))
            .map_err(to_js_error)
    }

    /// 设置日期筛选："all"、"last-week" ... "last-year" 或四位年份
    #[wasm_bindgen(js_name = setDate)]
    pub fn set_date(&self, value: &str) -> Result<(), JsValue> {
        self.session
            .update(|engine| engine.set_date_value(value))
            .map_err(to_js_error)
    }

    /// 立即提交搜索词
    #[wasm_bindgen(js_name = setSearchNow)]
    pub fn set_search_now(&self, query: &str) {
        self.session.set_search_now(query);
    }

    /// 排序方式："newest", "oldest", "title_asc", "title_desc", "popular"
    #[wasm_bindgen(js_name = setSort)]
    pub fn set_sort(&self, value: &str) -> Result<(), JsValue> {
        let sort: SortSpec = value.parse().map_err(to_js_error)?;
        self.session.update(|engine| engine.set_sort(sort));
        Ok(())
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) {
        self.session.clear_all();
    }

    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&self, page: usize) -> bool {
        self.session.update(|engine| engine.go_to(page))
    }

    pub fn next(&self) -> bool {
        self.session.update(FilterEngine::next)
    }

    pub fn previous(&self) -> bool {
        self.session.update(FilterEngine::previous)
    }

    /// 当前页结果
    pub fn result(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.session.engine().result())
    }

    /// 筛选选项
    #[wasm_bindgen(js_name = facetOptions)]
    pub fn facet_options(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.session.engine().facet_options())
    }

    /// 当前筛选状态快照
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js_value(self.session.engine().state())
    }

    #[wasm_bindgen(js_name = activeFacetCount)]
    pub fn active_facet_count(&self) -> usize {
        self.session.engine().active_facet_count()
    }

    #[wasm_bindgen(js_name = isFiltering)]
    pub fn is_filtering(&self) -> bool {
        self.session.engine().state().is_filtering()
    }

    /// 订阅变更通知，回调参数为事件对象；返回订阅编号
    ///
    /// 回调执行时引擎未被借用，可以直接调用 `result()` 等方法回读。
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) -> u32 {
        let id = self.session.subscribe(move |event| {
            let payload = match to_js_value(event) {
                Ok(payload) => payload,
                Err(_) => return,
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                crate::console_warn!("变更回调执行失败: {:?}", e);
            }
        });
        id.0 as u32
    }

    /// 取消订阅
    #[wasm_bindgen(js_name = offChange)]
    pub fn off_change(&self, id: u32) -> bool {
        self.session.unsubscribe(ListenerId(u64::from(id)))
    }
}

/// 防抖搜索依赖浏览器定时器；其他目标上只有 `setSearchNow` 会提交搜索词
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl ContentFilterJS {
    /// 搜索框按键输入（防抖）
    #[wasm_bindgen(js_name = searchInput)]
    pub fn search_input(&self, raw: &str) {
        self.session.search_input(raw);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    const ITEMS: &str = r#"[
        {"id": "rust/a", "title": "Rust ownership", "tags": ["rust"]},
        {"id": "go/b", "title": "Go channels", "tags": ["go"]}
    ]"#;

    #[test]
    fn set_search_now_commits_without_a_timer() {
        let filter = ContentFilterJS::new(ITEMS, None).unwrap();
        assert!(!filter.is_filtering());

        filter.set_search_now("ownership");
        assert!(filter.is_filtering());
        assert_eq!(filter.session.engine().filtered_count(), 1);
        assert!(!filter.session.search_pending());
    }

    #[test]
    fn navigation_and_toggles_go_through_the_session() {
        let filter = ContentFilterJS::new(ITEMS, None).unwrap();
        assert!(filter.toggle("tag", "go").unwrap());
        assert_eq!(filter.active_facet_count(), 1);
        assert!(!filter.next());
        filter.clear_all();
        assert_eq!(filter.active_facet_count(), 0);
    }
}
