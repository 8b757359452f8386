use thiserror::Error;
use utils_common::{CodecError, UnknownDifficulty};

/// 筛选模块的错误类型
///
/// 筛选、分页本身是全函数，不会失败；这些错误只出现在配置、
/// 索引解码和 JS 参数解析的边界上。
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("解析参数失败: {0}")]
    InvalidParams(#[from] serde_json::Error),

    #[error("未知的筛选维度: {0}")]
    UnknownFacet(String),

    #[error(transparent)]
    UnknownDifficulty(#[from] UnknownDifficulty),

    #[error("无效的日期筛选值: {0}")]
    InvalidDateFilter(String),

    #[error("无效的排序方式: {0}")]
    InvalidSort(String),

    #[error("无效的集合配置: {0}")]
    InvalidConfig(String),

    #[error("无法构建索引: 没有内容数据")]
    EmptyIndex,

    #[error("索引编解码失败: {0}")]
    Codec(#[from] CodecError),
}
