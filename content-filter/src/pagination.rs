use serde::{Serialize, Serializer};

/// 超过这个页数才折叠页码
const FULL_WINDOW_MAX: usize = 7;

/// 页码条中的一个位置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Ellipsis,
}

impl Serialize for PageMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageMarker::Page(page) => serializer.serialize_u64(*page as u64),
            PageMarker::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// 分页位置
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageBounds {
    /// 截断后的当前页码
    pub page: usize,
    /// 总页数，至少为1
    pub total_pages: usize,
    /// 当前页切片在结果中的下标范围 [start, end)
    pub start: usize,
    pub end: usize,
}

impl PageBounds {
    /// 计算分页位置；越界页码被截断到 [1, total_pages]
    pub fn new(count: usize, page_size: usize, requested: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = count.div_ceil(page_size).max(1);
        let page = requested.clamp(1, total_pages);
        let start = ((page - 1) * page_size).min(count);
        let end = (start + page_size).min(count);
        Self { page, total_pages, start, end }
    }

    /// 当前页第一条的序号（从1开始），空结果为0
    pub fn first_item(&self) -> usize {
        if self.start < self.end { self.start + 1 } else { 0 }
    }

    /// 当前页最后一条的序号（从1开始），空结果为0
    pub fn last_item(&self) -> usize {
        self.end
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// 紧凑页码条
///
/// 不超过7页时全部列出；否则保留首尾页，当前页附近用省略号隔开。
pub fn page_window(total_pages: usize, current: usize) -> Vec<PageMarker> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);

    if total <= FULL_WINDOW_MAX {
        return (1..=total).map(PageMarker::Page).collect();
    }

    let mut window = Vec::with_capacity(FULL_WINDOW_MAX);
    if current <= 4 {
        window.extend((1..=5).map(PageMarker::Page));
        window.push(PageMarker::Ellipsis);
        window.push(PageMarker::Page(total));
    } else if current >= total - 3 {
        window.push(PageMarker::Page(1));
        window.push(PageMarker::Ellipsis);
        window.extend((total - 4..=total).map(PageMarker::Page));
    } else {
        window.push(PageMarker::Page(1));
        window.push(PageMarker::Ellipsis);
        window.extend((current - 1..=current + 1).map(PageMarker::Page));
        window.push(PageMarker::Ellipsis);
        window.push(PageMarker::Page(total));
    }
    window
}

/// 某一页的结果 - 交给渲染层
#[derive(Serialize, Clone, Debug)]
pub struct PaginationResult<T> {
    /// 当前页的条目
    pub items: Vec<T>,
    /// 筛选结果总数
    pub total: usize,
    /// 当前页码
    pub page: usize,
    /// 每页条数
    pub page_size: usize,
    /// 总页数
    pub total_pages: usize,
    /// 当前页首条序号（从1开始）
    pub start_index: usize,
    /// 当前页末条序号（从1开始）
    pub end_index: usize,
    /// 页码条
    pub window: Vec<PageMarker>,
}

impl<T: Clone> PaginationResult<T> {
    /// 从已筛选、已排序的结果中切出一页
    pub fn paginate(items: &[T], page_size: usize, requested: usize) -> Self {
        let bounds = PageBounds::new(items.len(), page_size, requested);
        Self::from_bounds(bounds, items.len(), page_size, |range| items[range].to_vec())
    }
}

impl<T> PaginationResult<T> {
    pub(crate) fn from_bounds<F>(bounds: PageBounds, total: usize, page_size: usize, slice: F) -> Self
    where
        F: FnOnce(std::ops::Range<usize>) -> Vec<T>,
    {
        Self {
            items: slice(bounds.start..bounds.end),
            total,
            page: bounds.page,
            page_size: page_size.max(1),
            total_pages: bounds.total_pages,
            start_index: bounds.first_item(),
            end_index: bounds.last_item(),
            window: page_window(bounds.total_pages, bounds.page),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
