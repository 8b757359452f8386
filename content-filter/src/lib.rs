//! 内容列表的多维筛选、搜索与分页
//!
//! 数据单向流动：条目列表 + 筛选状态 → 标签分类 → 逐条筛选 → 排序 → 分页 → 渲染层。

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

pub mod log;
pub mod aggregate;
pub mod builder;
pub mod config;
pub mod date;
pub mod engine;
pub mod error;
pub mod models;
pub mod observer;
pub mod pagination;
pub mod search;
pub mod state;
pub mod taxonomy;
pub mod timer;
pub mod wasm;

pub use config::{CollectionConfig, SortKey, SortOrder, SortSpec};
pub use date::{DateFilter, RelativeWindow};
pub use engine::{EngineEvent, FacetOption, FacetOptions, FilterEngine, FilterSession};
pub use observer::{ListenerId, Listeners};
pub use error::FilterError;
pub use models::{ContentIndex, IndexedItem};
pub use pagination::{page_window, PageMarker, PaginationResult};
pub use state::{Facet, FilterState};
pub use taxonomy::{TagGroup, TagTaxonomy};
pub use timer::{Debouncer, ManualTimer, Timer, TimerHandle};
pub use utils_common::{ContentItem, Difficulty};
