//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及相关枚举

use std::path::PathBuf;

use crate::catalog::ViewState;
use crate::config::Settings;
use crate::models::Product;

/// 应用状态
pub struct App {
    pub view: ViewState,
    pub mode: AppMode,
    pub selected_row: usize, // 当前页内的高亮行
    pub search_input: String,
    pub page_sizes: Vec<usize>,
    pub form: ProductForm,
    pub message: Option<String>,
    pub export_dir: PathBuf,
    pub api_url: String,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Searching,
    Editing(i64), // 正在编辑的商品 ID
    Creating,
}

/// 表单字段
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Price,
    Description,
    CategoryId,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Price => "Price",
            FormField::Description => "Description",
            FormField::CategoryId => "Category ID",
        }
    }
}

/// 编辑 / 新建弹窗共用的表单缓冲区
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    pub category_id: String,
    pub focus: usize, // 在 fields 中的下标
    pub fields: Vec<FormField>,
}

impl ProductForm {
    pub const EDIT_FIELDS: [FormField; 2] = [FormField::Title, FormField::Price];
    pub const CREATE_FIELDS: [FormField; 4] = [
        FormField::Title,
        FormField::Price,
        FormField::Description,
        FormField::CategoryId,
    ];

    /// 用内存中的记录预填编辑表单
    pub fn for_edit(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.to_string(),
            fields: Self::EDIT_FIELDS.to_vec(),
            ..Default::default()
        }
    }

    pub fn for_create() -> Self {
        Self {
            fields: Self::CREATE_FIELDS.to_vec(),
            ..Default::default()
        }
    }

    pub fn focused_field(&self) -> Option<FormField> {
        self.fields.get(self.focus).copied()
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Price => &self.price,
            FormField::Description => &self.description,
            FormField::CategoryId => &self.category_id,
        }
    }

    pub fn focused_value_mut(&mut self) -> Option<&mut String> {
        let field = self.focused_field()?;
        Some(match field {
            FormField::Title => &mut self.title,
            FormField::Price => &mut self.price,
            FormField::Description => &mut self.description,
            FormField::CategoryId => &mut self.category_id,
        })
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }
}

impl App {
    /// 创建新的应用实例
    pub fn new(settings: &Settings) -> Self {
        Self {
            view: ViewState::new(settings.page_size),
            mode: AppMode::Normal,
            selected_row: 0,
            search_input: String::new(),
            page_sizes: settings.page_sizes.clone(),
            form: ProductForm::default(),
            message: None,
            export_dir: settings.export_dir.clone(),
            api_url: settings.api_url.clone(),
        }
    }

    /// 确保高亮行落在当前页内
    pub fn clamp_selection(&mut self) {
        let visible = self.view.visible_page().len();
        if visible == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= visible {
            self.selected_row = visible - 1;
        }
    }
}
