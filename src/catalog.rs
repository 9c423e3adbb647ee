//! 商品视图状态 (过滤 / 排序 / 分页)
//!
//! 所有修改状态的操作都会置位 `changed`，由渲染循环通过 `take_changed` 消费

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::models::Product;

/// 可排序的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Title,
    Price,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Id, SortField::Title, SortField::Price];

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Id => "ID",
            SortField::Title => "Title",
            SortField::Price => "Price",
        }
    }

    /// 三路比较：a < b 为 Less，a > b 为 Greater，其余视为相等
    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Price => {
                if a.price < b.price {
                    Ordering::Less
                } else if a.price > b.price {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// 视图状态
#[derive(Debug, Clone)]
pub struct ViewState {
    all_products: Vec<Product>,
    filtered_products: Vec<Product>,
    current_page: usize,
    rows_per_page: usize,
    sort_direction: HashMap<SortField, SortDirection>,
    last_sorted: Option<SortField>,
    last_loaded: Option<DateTime<Local>>,
    changed: bool,
}

impl ViewState {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            all_products: Vec::new(),
            filtered_products: Vec::new(),
            current_page: 1,
            rows_per_page: rows_per_page.max(1),
            sort_direction: SortField::ALL
                .iter()
                .map(|field| (*field, SortDirection::Ascending))
                .collect(),
            last_sorted: None,
            last_loaded: None,
            changed: true,
        }
    }

    // ============ 数据替换 ============

    /// 用一次成功拉取的结果整体替换数据集。
    ///
    /// 排序方向保留，搜索词不重新应用：最后到达的响应无条件覆盖。
    /// 页码仍有效时保留，新数据不足以填满当前页时回到第一页。
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.filtered_products = products.clone();
        self.all_products = products;
        if self.current_page > self.page_count() {
            self.current_page = 1;
        }
        self.last_loaded = Some(Local::now());
        self.changed = true;
    }

    // ============ 过滤 / 排序 / 分页 ============

    /// 按标题做大小写不敏感的子串匹配，并回到第一页
    pub fn apply_search(&mut self, term: &str) {
        let term = term.to_lowercase();
        self.filtered_products = self
            .all_products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&term))
            .cloned()
            .collect();
        self.current_page = 1;
        self.changed = true;
    }

    /// 切换该列的排序方向，然后稳定排序；不重置页码
    pub fn apply_sort(&mut self, field: SortField) {
        let direction = self
            .sort_direction
            .get(&field)
            .copied()
            .unwrap_or_default()
            .toggled();
        self.sort_direction.insert(field, direction);
        self.last_sorted = Some(field);

        self.filtered_products.sort_by(|a, b| {
            let ordering = field.compare(a, b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        self.changed = true;
    }

    pub fn set_page_size(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.current_page = 1;
        self.changed = true;
    }

    /// 直接设置页码，不做越界检查
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
        self.changed = true;
    }

    // ============ 只读查询 ============

    /// 当前页的切片，越界时为空
    pub fn visible_page(&self) -> &[Product] {
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.rows_per_page);
        if start >= self.filtered_products.len() {
            return &[];
        }
        let end = (start + self.rows_per_page).min(self.filtered_products.len());
        &self.filtered_products[start..end]
    }

    /// ceil(filtered / rows_per_page)，空集为 0
    pub fn page_count(&self) -> usize {
        self.filtered_products.len().div_ceil(self.rows_per_page)
    }

    pub fn find(&self, id: i64) -> Option<&Product> {
        self.all_products.iter().find(|p| p.id == id)
    }

    pub fn all_products(&self) -> &[Product] {
        &self.all_products
    }

    pub fn filtered_products(&self) -> &[Product] {
        &self.filtered_products
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn sort_direction(&self, field: SortField) -> SortDirection {
        self.sort_direction.get(&field).copied().unwrap_or_default()
    }

    pub fn last_sorted(&self) -> Option<SortField> {
        self.last_sorted
    }

    pub fn last_loaded(&self) -> Option<DateTime<Local>> {
        self.last_loaded
    }

    // ============ 变更信号 ============

    /// 消费变更信号，返回自上次调用以来是否有修改
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// 非数据变更（弹窗、提示）也需要重绘时使用
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{product, products};

    fn ids(items: &[Product]) -> Vec<i64> {
        items.iter().map(|p| p.id).collect()
    }

    fn loaded(n: i64, rows_per_page: usize) -> ViewState {
        let mut state = ViewState::new(rows_per_page);
        state.replace_products(products(n));
        state
    }

    #[test]
    fn test_page_count() {
        for (n, r, expected) in [(0, 10, 0), (1, 10, 1), (10, 10, 1), (11, 10, 2), (25, 10, 3), (7, 1, 7)] {
            assert_eq!(loaded(n, r).page_count(), expected, "n={} r={}", n, r);
        }
    }

    #[test]
    fn test_twenty_five_products_ten_per_page() {
        let mut state = loaded(25, 10);
        assert_eq!(ids(state.visible_page()), (1..=10).collect::<Vec<_>>());
        assert_eq!(state.page_count(), 3);

        state.set_page(3);
        assert_eq!(ids(state.visible_page()), (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_visible_count_and_past_end() {
        let mut state = loaded(15, 4);
        for page in 1..=6 {
            state.set_page(page);
            let start = (page - 1) * 4;
            let expected = 4.min(15usize.saturating_sub(start));
            assert_eq!(state.visible_page().len(), expected, "page {}", page);
        }
    }

    #[test]
    fn test_search_filters_titles_case_insensitively() {
        let mut state = ViewState::new(10);
        let mut items = products(3);
        items[0].title = "Classic Red Shirt".to_string();
        items[1].title = "Blue Jeans".to_string();
        items[2].title = "RED Cap".to_string();
        state.replace_products(items);
        state.set_page(2);

        state.apply_search("red");
        assert_eq!(ids(state.filtered_products()), vec![1, 3]);
        assert_eq!(state.current_page(), 1);
        assert!(
            state
                .filtered_products()
                .iter()
                .all(|p| state.all_products().contains(p))
        );

        state.apply_search("");
        assert_eq!(state.filtered_products().len(), 3);
    }

    #[test]
    fn test_search_without_matches() {
        let mut state = loaded(12, 5);
        state.apply_search("zzz-nothing");
        assert!(state.filtered_products().is_empty());
        assert!(state.visible_page().is_empty());
        assert_eq!(state.page_count(), 0);
    }

    #[test]
    fn test_first_sort_is_descending_then_toggles() {
        let mut state = loaded(5, 10);
        assert_eq!(state.sort_direction(SortField::Price), SortDirection::Ascending);

        state.apply_sort(SortField::Price);
        assert_eq!(state.sort_direction(SortField::Price), SortDirection::Descending);
        assert_eq!(ids(state.filtered_products()), vec![5, 4, 3, 2, 1]);

        state.apply_sort(SortField::Price);
        assert_eq!(state.sort_direction(SortField::Price), SortDirection::Ascending);
        assert_eq!(ids(state.filtered_products()), vec![1, 2, 3, 4, 5]);

        // 其他列方向独立
        assert_eq!(state.sort_direction(SortField::Title), SortDirection::Ascending);
    }

    #[test]
    fn test_sort_is_stable_and_keeps_page() {
        let mut state = ViewState::new(2);
        state.replace_products(vec![
            product(1, 5.0),
            product(2, 1.0),
            product(3, 5.0),
            product(4, 1.0),
        ]);
        state.set_page(2);

        state.apply_sort(SortField::Price); // 降序
        assert_eq!(ids(state.filtered_products()), vec![1, 3, 2, 4]);
        assert_eq!(state.current_page(), 2);

        state.apply_sort(SortField::Price); // 升序
        assert_eq!(ids(state.filtered_products()), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_by_title() {
        let mut state = ViewState::new(10);
        let mut items = products(3);
        items[0].title = "b".to_string();
        items[1].title = "c".to_string();
        items[2].title = "a".to_string();
        state.replace_products(items);

        state.apply_sort(SortField::Title);
        assert_eq!(ids(state.filtered_products()), vec![2, 1, 3]);
        state.apply_sort(SortField::Title);
        assert_eq!(ids(state.filtered_products()), vec![3, 1, 2]);
    }

    #[test]
    fn test_page_size_resets_page() {
        let mut state = loaded(30, 10);
        state.set_page(3);
        state.set_page_size(20);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.page_count(), 2);

        state.set_page_size(0);
        assert_eq!(state.rows_per_page(), 1);
    }

    #[test]
    fn test_replace_overwrites_filter_and_sort() {
        let mut state = loaded(10, 5);
        state.apply_search("Product 1");
        state.apply_sort(SortField::Id);
        state.set_page(2);

        state.replace_products(products(8));
        assert_eq!(ids(state.filtered_products()), (1..=8).collect::<Vec<_>>());
        assert_eq!(state.current_page(), 2);
        assert_eq!(ids(state.visible_page()), vec![6, 7, 8]);
        assert_eq!(state.sort_direction(SortField::Id), SortDirection::Descending);
        assert!(state.last_loaded().is_some());
    }

    #[test]
    fn test_replace_with_fewer_pages_returns_to_first_page() {
        let mut state = loaded(25, 10);
        state.set_page(3);

        state.replace_products(products(5));
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.page_count(), 1);
        assert_eq!(state.visible_page().len(), 5);

        // 空集时页码同样回到 1
        state.set_page(2);
        state.replace_products(Vec::new());
        assert_eq!(state.current_page(), 1);
        assert!(state.visible_page().is_empty());
    }

    #[test]
    fn test_change_signal() {
        let mut state = ViewState::new(10);
        assert!(state.take_changed());
        assert!(!state.take_changed());

        state.set_page(1);
        assert!(state.take_changed());
        assert!(!state.take_changed());

        state.apply_search("x");
        assert!(state.take_changed());
    }

    #[test]
    fn test_find_uses_all_products() {
        let mut state = loaded(5, 10);
        state.apply_search("Product 2");
        assert_eq!(state.find(4).map(|p| p.id), Some(4));
        assert!(state.find(99).is_none());
    }
}
