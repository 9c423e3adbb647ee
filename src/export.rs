//! CSV 导出
//!
//! 只导出当前可见页，每次导出时重新计算切片

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::ViewState;
use crate::error::ExportError;
use crate::models::Product;

pub const EXPORT_FILE_NAME: &str = "products.csv";
pub const CSV_HEADER: &str = "ID,Title,Price,Category";

/// 带引号的字段，内部双引号加倍
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// 将商品序列化为 CSV 文本（含表头）
pub fn products_to_csv(products: &[Product]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + products.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for p in products {
        out.push_str(&format!(
            "{},{},{},{}\n",
            p.id,
            quoted(&p.title),
            p.price,
            quoted(&p.category.name)
        ));
    }
    out
}

/// 当前可见页的 CSV
pub fn visible_page_csv(state: &ViewState) -> String {
    products_to_csv(state.visible_page())
}

/// 写入 `<dir>/products.csv`，返回文件路径
pub fn export_visible_page(state: &ViewState, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(EXPORT_FILE_NAME);
    let write = |path: &Path| -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(path, visible_page_csv(state))
    };
    write(&path).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        rows = state.visible_page().len(),
        "exported visible page"
    );
    Ok(path)
}
