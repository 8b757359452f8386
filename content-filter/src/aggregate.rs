//! 各筛选维度的合取：条目必须同时满足所有已激活的维度
//!
//! 未激活的维度（空集合、空搜索词、无日期筛选）不排除任何条目。

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{SortKey, SortOrder, SortSpec};
use crate::date::date_matches;
use crate::models::IndexedItem;
use crate::search::search_matches;
use crate::state::FilterState;
use crate::taxonomy::{TagGroup, TagTaxonomy};

/// 按分组拆分后的标签选择：组内为“或”，组间为“与”
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSelection {
    groups: BTreeMap<TagGroup, BTreeSet<String>>,
}

impl TagSelection {
    pub fn new(selected: &BTreeSet<String>, taxonomy: &TagTaxonomy) -> Self {
        let mut groups: BTreeMap<TagGroup, BTreeSet<String>> = BTreeMap::new();
        for tag in selected {
            groups
                .entry(taxonomy.classify(tag))
                .or_default()
                .insert(tag.clone());
        }
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 每个有选中值的分组，条目至少命中其中一个标签
    pub fn matches(&self, item: &IndexedItem) -> bool {
        self.groups
            .values()
            .all(|wanted| wanted.iter().any(|tag| item.tags.contains(tag)))
    }
}

pub fn category_matches(item: &IndexedItem, state: &FilterState) -> bool {
    let selected = state.category_filters();
    selected.is_empty() || selected.contains(&item.category)
}

pub fn difficulty_matches(item: &IndexedItem, state: &FilterState) -> bool {
    let selected = state.difficulty_filters();
    selected.is_empty()
        || item
            .difficulty()
            .is_some_and(|difficulty| selected.contains(&difficulty))
}

/// 单个条目的筛选判定
pub fn includes(
    item: &IndexedItem,
    state: &FilterState,
    tags: &TagSelection,
    now: DateTime<Utc>,
) -> bool {
    category_matches(item, state)
        && tags.matches(item)
        && difficulty_matches(item, state)
        && search_matches(item, state.search_query())
        && date_matches(state.date_filter(), item.date, now)
}

/// 对全部条目重新筛选，返回命中条目的下标（保持原顺序）
pub fn compute_filtered(
    items: &[IndexedItem],
    state: &FilterState,
    taxonomy: &TagTaxonomy,
    now: DateTime<Utc>,
) -> Vec<usize> {
    let tags = TagSelection::new(state.tag_filters(), taxonomy);
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| includes(item, state, &tags, now))
        .map(|(i, _)| i)
        .collect()
}

/// 缺失值无论升序降序都排在最后
fn compare_present<T, F>(a: Option<T>, b: Option<T>, order: SortOrder, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => cmp(&a, &b),
            SortOrder::Desc => cmp(&b, &a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// 稳定排序筛选结果
pub fn sort_indices(items: &[IndexedItem], indices: &mut [usize], sort: SortSpec) {
    indices.sort_by(|&a, &b| {
        let (a, b) = (&items[a], &items[b]);
        match sort.key {
            SortKey::Date => compare_present(a.date, b.date, sort.order, Ord::cmp),
            SortKey::Title => compare_present(
                Some(a.title.as_str()),
                Some(b.title.as_str()),
                sort.order,
                Ord::cmp,
            ),
            SortKey::Popularity => compare_present(
                a.popularity(),
                b.popularity(),
                sort.order,
                |x: &f64, y: &f64| x.total_cmp(y),
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateFilter;
    use crate::state::Facet;
    use chrono::TimeZone;
    use utils_common::{ContentItem, Difficulty};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn item(id: &str, title: &str, tags: &[&str]) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            title: title.to_string(),
            summary: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            date: None,
            category: None,
            difficulty: None,
            popularity: None,
            url: String::new(),
        }
    }

    fn indexed(items: Vec<ContentItem>) -> Vec<IndexedItem> {
        items.into_iter().map(IndexedItem::new).collect()
    }

    fn run(items: &[IndexedItem], state: &FilterState) -> Vec<usize> {
        compute_filtered(items, state, &TagTaxonomy::default(), now())
    }

    #[test]
    fn tags_or_within_a_group_and_across_groups() {
        let items = indexed(vec![
            item("a/1", "py+django", &["python", "django"]),
            item("a/2", "py", &["python"]),
            item("a/3", "rust+axum", &["rust", "axum"]),
            item("a/4", "py+flask", &["python", "flask"]),
        ]);
        let mut state = FilterState::new();
        state.toggle(Facet::Tag, "python").unwrap();
        state.toggle(Facet::Tag, "rust").unwrap();
        assert_eq!(run(&items, &state), vec![0, 1, 2, 3]);

        state.toggle(Facet::Tag, "django").unwrap();
        state.toggle(Facet::Tag, "axum").unwrap();
        assert_eq!(run(&items, &state), vec![0, 2]);
    }

    #[test]
    fn tag_and_search_must_both_hold() {
        let items = indexed(vec![
            item("blog/django-intro", "Django intro", &["python", "django"]),
            item("blog/python-basics", "Python basics", &["python"]),
        ]);
        let mut state = FilterState::new();
        state.toggle(Facet::Tag, "python").unwrap();
        state.set_search("django");
        assert_eq!(run(&items, &state), vec![0]);
    }

    #[test]
    fn category_comes_from_slug_regardless_of_tags() {
        let items = indexed(vec![
            item("flutter/state", "State", &["kotlin", "dart"]),
            item("kotlin/flows", "Flows", &["kotlin", "flutter"]),
            item("flutter/anim", "Animations", &[]),
        ]);
        let mut state = FilterState::new();
        state.toggle(Facet::Category, "Flutter").unwrap();
        assert_eq!(run(&items, &state), vec![0, 2]);
    }

    #[test]
    fn difficulty_excludes_items_without_a_level() {
        let mut easy = item("a/1", "easy", &[]);
        easy.difficulty = Some(Difficulty::Beginner);
        let mut hard = item("a/2", "hard", &[]);
        hard.difficulty = Some(Difficulty::Advanced);
        let items = indexed(vec![easy, hard, item("a/3", "unrated", &[])]);

        let mut state = FilterState::new();
        assert_eq!(run(&items, &state).len(), 3);
        state.toggle(Facet::Difficulty, "advanced").unwrap();
        assert_eq!(run(&items, &state), vec![1]);
    }

    #[test]
    fn date_filter_is_part_of_the_conjunction() {
        let mut dated = item("a/1", "dated", &["rust"]);
        dated.date = Some("2023-05-01".to_string());
        let mut broken = item("a/2", "broken", &["rust"]);
        broken.date = Some("someday".to_string());
        let items = indexed(vec![dated, broken]);

        let mut state = FilterState::new();
        state.toggle(Facet::Tag, "rust").unwrap();
        assert_eq!(run(&items, &state), vec![0, 1]);
        state.set_date(Some(DateFilter::Year(2023)));
        assert_eq!(run(&items, &state), vec![0]);
    }

    #[test]
    fn sort_is_stable_and_puts_missing_values_last() {
        let mut a = item("x/a", "Beta", &[]);
        a.popularity = Some(5.0);
        a.date = Some("2024-01-01".into());
        let mut b = item("x/b", "alpha", &[]);
        b.popularity = Some(5.0);
        let mut c = item("x/c", "Gamma", &[]);
        c.popularity = Some(9.0);
        c.date = Some("2022-01-01".into());
        let items = indexed(vec![a, b, c]);

        let mut order = vec![0, 1, 2];
        sort_indices(&items, &mut order, SortSpec::POPULAR);
        assert_eq!(order, vec![2, 0, 1]);

        let mut order = vec![0, 1, 2];
        sort_indices(&items, &mut order, SortSpec { key: SortKey::Date, order: SortOrder::Asc });
        assert_eq!(order, vec![2, 0, 1]);

        let mut order = vec![0, 1, 2];
        sort_indices(&items, &mut order, SortSpec::NEWEST);
        assert_eq!(order, vec![0, 2, 1]);

        let mut order = vec![0, 1, 2];
        sort_indices(&items, &mut order, SortSpec { key: SortKey::Title, order: SortOrder::Asc });
        assert_eq!(order, vec![1, 0, 2]);
    }
}
