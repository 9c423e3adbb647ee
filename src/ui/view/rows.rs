//! 行与分页控件描述
//!
//! 只读地把 ViewState 投影成结构化描述；绘制和交互都以这些描述为准

use url::Url;

use crate::catalog::ViewState;
use crate::models::Product;

/// 缩略图无法加载时的占位图
pub const THUMBNAIL_FALLBACK: &str = "https://via.placeholder.com/50";

/// 表格中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: i64,
    pub title: String,
    pub tooltip: String,
    pub price: String,
    pub category: String,
    pub thumbnail: String,
}

impl RowView {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            tooltip: product.description.clone(),
            price: format_price(product.price),
            category: product.category.name.clone(),
            thumbnail: thumbnail_url(product),
        }
    }
}

/// 分页控件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageControl {
    pub page: usize,
    pub active: bool,
}

pub fn format_price(price: f64) -> String {
    format!("${}", price)
}

/// 第一张图片；缺失或不是 http(s) 地址时退回占位图
pub fn thumbnail_url(product: &Product) -> String {
    product
        .thumbnail()
        .and_then(|raw| Url::parse(raw.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
        .unwrap_or_else(|| THUMBNAIL_FALLBACK.to_string())
}

/// 当前页的行描述
pub fn row_views(state: &ViewState) -> Vec<RowView> {
    state.visible_page().iter().map(RowView::from_product).collect()
}

/// 每页一个控件，当前页标记为 active
pub fn page_controls(state: &ViewState) -> Vec<PageControl> {
    (1..=state.page_count())
        .map(|page| PageControl {
            page,
            active: page == state.current_page(),
        })
        .collect()
}
