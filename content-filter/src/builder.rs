use chrono::Datelike;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use utils_common::ContentItem;

use crate::config::CollectionConfig;
use crate::date::parse_item_date;
use crate::error::FilterError;
use crate::models::ContentIndex;
use crate::taxonomy::TagTaxonomy;

/// 内容索引构建器 - 在站点构建阶段把条目列表打包成压缩索引
pub struct IndexBuilder {
    config: CollectionConfig,
    items: Vec<ContentItem>,
}

impl IndexBuilder {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: ContentItem) {
        self.items.push(item);
    }

    pub fn extend<I: IntoIterator<Item = ContentItem>>(&mut self, items: I) {
        self.items.extend(items);
    }

    /// 构建索引：标签分区和出现过的年份
    pub fn build(&self) -> Result<ContentIndex, FilterError> {
        if self.items.is_empty() {
            crate::console_warn!("无法构建索引，没有内容数据");
            return Err(FilterError::EmptyIndex);
        }
        self.config.validate()?;

        let taxonomy = TagTaxonomy::new(&self.config.taxonomy);
        let tags = taxonomy.partition(
            self.items.iter().flat_map(|item| item.tags.iter().map(String::as_str)),
        );

        let years: BTreeSet<i32> = self
            .items
            .iter()
            .filter_map(|item| item.date.as_deref().and_then(parse_item_date))
            .map(|date| date.year())
            .collect();
        let years: Vec<i32> = years.into_iter().rev().collect();

        crate::console_log!(
            "索引构建完成，条目: {}, 标签分组: {}, 年份: {}",
            self.items.len(),
            tags.groups.len(),
            years.len()
        );

        Ok(ContentIndex {
            config: self.config.clone(),
            items: self.items.clone(),
            tags,
            years,
        })
    }

    /// 构建并保存压缩索引，返回写入的字节数
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize, FilterError> {
        let data = self.build()?.to_compressed()?;
        let mut file = File::create(path.as_ref()).map_err(utils_common::CodecError::from)?;
        file.write_all(&data).map_err(utils_common::CodecError::from)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FilterEngine;
    use crate::state::Facet;
    use crate::taxonomy::TagGroup;

    fn item(id: &str, tags: &[&str], date: Option<&str>) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            title: id.to_string(),
            summary: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            date: date.map(str::to_string),
            category: None,
            difficulty: None,
            popularity: Some(1.0),
            url: format!("/{id}/"),
        }
    }

    #[test]
    fn empty_builder_fails() {
        let builder = IndexBuilder::new(CollectionConfig::projects());
        assert!(matches!(builder.build(), Err(FilterError::EmptyIndex)));
    }

    #[test]
    fn index_groups_tags_and_years() {
        let mut builder = IndexBuilder::new(CollectionConfig::blog());
        builder.extend([
            item("rust/a", &["Rust", "axum"], Some("2023-04-01")),
            item("rust/b", &["rust"], Some("2024-04-01")),
            item("misc/c", &["homelab"], None),
        ]);
        let index = builder.build().unwrap();
        assert_eq!(index.tags.display_tags(TagGroup::Language), vec!["Rust"]);
        assert_eq!(index.years, vec![2024, 2023]);
    }

    #[test]
    fn compressed_index_drives_an_engine() {
        let mut builder = IndexBuilder::new(CollectionConfig::projects());
        builder.add_item(item("kotlin/a", &["kotlin"], Some("2022-01-01")));
        builder.add_item(item("flutter/b", &["dart"], Some("2023-01-01")));
        let bytes = builder.build().unwrap().to_compressed().unwrap();

        let index = ContentIndex::from_compressed(&bytes).unwrap();
        let mut engine = FilterEngine::from_index(index).unwrap();
        assert_eq!(engine.config().page_size, 12);
        assert_eq!(engine.facet_options().years, vec![2023, 2022]);
        engine.toggle(Facet::Category, "flutter").unwrap();
        assert_eq!(engine.result().items[0].id, "flutter/b");
    }

    #[test]
    fn save_writes_the_compressed_file() {
        let path = std::env::temp_dir().join(format!("content-index-{}.bin", std::process::id()));
        let mut builder = IndexBuilder::new(CollectionConfig::blog());
        builder.add_item(item("rust/a", &[], None));
        let written = builder.save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(bytes.len(), written);
        assert_eq!(ContentIndex::from_compressed(&bytes).unwrap().items.len(), 1);
    }
}
