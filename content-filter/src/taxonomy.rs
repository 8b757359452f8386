//! 标签分类：把原始标签字符串划分到互斥的分组中
//!
//! 分类只看静态关键字表，大小写不敏感；不在任何表中的标签一律归入 `Other`。
//! 同一关键字出现在多张表里时，按 语言 > 框架 > 难度 > 分类 的顺序取第一个。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 标签分组
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TagGroup {
    Language,
    Framework,
    Difficulty,
    Category,
    Other,
}

/// 分类关键字表 - 每个内容集合可以自行声明
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TaxonomyTables {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub difficulties: Vec<String>,
    pub categories: Vec<String>,
}

const LANGUAGES: &[&str] = &[
    "rust", "python", "javascript", "typescript", "go", "golang", "java", "kotlin",
    "swift", "dart", "c", "c++", "cpp", "c#", "csharp", "ruby", "php", "scala",
    "haskell", "elixir", "lua", "sql", "html", "css", "bash", "shell", "zig",
];

const FRAMEWORKS: &[&str] = &[
    "react", "vue", "svelte", "angular", "solid", "astro", "next.js", "nextjs",
    "nuxt", "django", "flask", "fastapi", "spring", "express", "rails", "laravel",
    "flutter", "jetpack compose", "swiftui", "tokio", "actix", "axum", "tailwind",
    "node.js", "nodejs", "deno", "pytorch", "tensorflow",
];

const DIFFICULTIES: &[&str] = &[
    "beginner", "intermediate", "advanced", "easy", "medium", "hard", "expert",
];

const CATEGORIES: &[&str] = &[
    "tutorial", "guide", "project", "opinion", "review", "news", "career",
    "devops", "web", "mobile", "backend", "frontend", "tooling",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// 内置关键字表
pub static DEFAULT_TABLES: Lazy<TaxonomyTables> = Lazy::new(|| TaxonomyTables {
    languages: owned(LANGUAGES),
    frameworks: owned(FRAMEWORKS),
    difficulties: owned(DIFFICULTIES),
    categories: owned(CATEGORIES),
});

/// 小写标签 -> 分组 的查找表，构建后只读
#[derive(Clone, Debug)]
pub struct TagTaxonomy {
    lookup: HashMap<String, TagGroup>,
}

impl TagTaxonomy {
    pub fn new(tables: &TaxonomyTables) -> Self {
        let mut lookup = HashMap::new();
        // 优先级低的先写入，由高优先级覆盖
        let ordered = [
            (&tables.categories, TagGroup::Category),
            (&tables.difficulties, TagGroup::Difficulty),
            (&tables.frameworks, TagGroup::Framework),
            (&tables.languages, TagGroup::Language),
        ];
        for (words, group) in ordered {
            for word in words {
                lookup.insert(word.trim().to_lowercase(), group);
            }
        }
        Self { lookup }
    }

    /// 单个标签的分组
    pub fn classify(&self, tag: &str) -> TagGroup {
        self.lookup
            .get(tag.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(TagGroup::Other)
    }

    /// 对一组标签分区
    ///
    /// 大小写不同的同名标签合并，保留第一次出现的写法用于展示。
    pub fn partition<'a, I>(&self, tags: I) -> TagPartition
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut partition = TagPartition::default();
        for tag in tags {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = trimmed.to_lowercase();
            let group = self.classify(&key);
            partition
                .groups
                .entry(group)
                .or_default()
                .entry(key)
                .or_insert_with(|| trimmed.to_string());
        }
        partition
    }
}

impl Default for TagTaxonomy {
    fn default() -> Self {
        Self::new(&DEFAULT_TABLES)
    }
}

/// 标签分区结果：分组 -> (小写标签 -> 展示用标签)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TagPartition {
    pub groups: BTreeMap<TagGroup, BTreeMap<String, String>>,
}

impl TagPartition {
    /// 某个分组下的展示用标签，按小写字母序
    pub fn display_tags(&self, group: TagGroup) -> Vec<&str> {
        self.groups
            .get(&group)
            .map(|tags| tags.values().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
