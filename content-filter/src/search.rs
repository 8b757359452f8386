use crate::models::IndexedItem;

/// 自由文本匹配：小写子串包含，不分词、不做模糊匹配
///
/// `query` 须已转小写；空查询匹配所有条目。命中标题、摘要、任一标签或分类即可。
pub fn search_matches(item: &IndexedItem, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    item.title.contains(query)
        || item.summary.contains(query)
        || item.tags.iter().any(|tag| tag.contains(query))
        || item.category.contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils_common::ContentItem;

    fn item(id: &str, title: &str, summary: &str, tags: &[&str]) -> IndexedItem {
        IndexedItem::new(ContentItem {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            date: None,
            category: None,
            difficulty: None,
            popularity: None,
            url: String::new(),
        })
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(search_matches(&item("a/b", "", "", &[]), ""));
    }

    #[test]
    fn matches_each_field_case_insensitively() {
        let entry = item("flutter/layouts", "Responsive Layouts", "Using LayoutBuilder", &["Dart"]);
        assert!(search_matches(&entry, "responsive"));
        assert!(search_matches(&entry, "layoutbuilder"));
        assert!(search_matches(&entry, "dar"));
        assert!(search_matches(&entry, "flutt"));
        assert!(!search_matches(&entry, "kotlin"));
    }

    #[test]
    fn query_is_one_substring_not_a_token_list() {
        let entry = item("rust/async", "Async Rust", "", &[]);
        assert!(search_matches(&entry, "async rust"));
        assert!(!search_matches(&entry, "rust async"));
    }
}
