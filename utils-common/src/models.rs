use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 难度等级 - 内容条目可选的固定枚举
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// 所有难度等级，按从易到难排列
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的难度字符串
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的难度等级: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    /// 大小写不敏感，同时接受 easy/medium/hard 等常见别名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" => Ok(Difficulty::Beginner),
            "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" | "expert" => Ok(Difficulty::Advanced),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// 内容条目 - 由内容加载方（markdown/frontmatter 解析）产出，筛选引擎只读
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContentItem {
    /// 唯一标识符（slug 或路径，如 "flutter/state-management"）
    pub id: String,
    /// 标题
    pub title: String,
    /// 摘要
    #[serde(default)]
    pub summary: String,
    /// 标签列表，保留原始大小写用于展示
    #[serde(default)]
    pub tags: Vec<String>,
    /// 发布日期原文，可能缺失或无法解析
    #[serde(default)]
    pub date: Option<String>,
    /// 显式分类；缺失时取 id 的第一段路径
    #[serde(default)]
    pub category: Option<String>,
    /// 难度等级
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// 热度（如 star 数、阅读量）
    #[serde(default)]
    pub popularity: Option<f64>,
    /// 页面URL
    #[serde(default)]
    pub url: String,
}

impl ContentItem {
    /// 条目所属分类（小写）
    ///
    /// 优先使用显式分类，否则取 id 的第一段路径；`"kotlin/coroutines"` 得到 `"kotlin"`。
    /// 没有任何路径段时返回空字符串。
    pub fn category(&self) -> String {
        if let Some(category) = self.category.as_deref() {
            let category = category.trim();
            if !category.is_empty() {
                return category.to_lowercase();
            }
        }
        category_from_slug(&self.id)
    }
}

/// 从 slug 中取第一段非空路径作为分类
pub fn category_from_slug(slug: &str) -> String {
    slug.split('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, category: Option<&str>) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            title: "t".to_string(),
            summary: String::new(),
            tags: Vec::new(),
            date: None,
            category: category.map(str::to_string),
            difficulty: None,
            popularity: None,
            url: String::new(),
        }
    }

    #[test]
    fn category_comes_from_first_slug_segment() {
        assert_eq!(item("flutter/state-management", None).category(), "flutter");
        assert_eq!(item("/Kotlin/coroutines/", None).category(), "kotlin");
        assert_eq!(item("", None).category(), "");
    }

    #[test]
    fn explicit_category_wins_over_slug() {
        assert_eq!(item("flutter/intro", Some("Mobile")).category(), "mobile");
        assert_eq!(item("flutter/intro", Some("  ")).category(), "flutter");
    }

    #[test]
    fn difficulty_parses_aliases_case_insensitively() {
        assert_eq!("Beginner".parse::<Difficulty>(), Ok(Difficulty::Beginner));
        assert_eq!("MEDIUM".parse::<Difficulty>(), Ok(Difficulty::Intermediate));
        assert_eq!(" hard ".parse::<Difficulty>(), Ok(Difficulty::Advanced));
        assert!("legendary".parse::<Difficulty>().is_err());
    }

    #[test]
    fn unknown_difficulty_reports_the_original_text() {
        let err = "Legendary".parse::<Difficulty>().unwrap_err();
        assert_eq!(err, UnknownDifficulty("Legendary".to_string()));
        assert_eq!(err.to_string(), "未知的难度等级: Legendary");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
