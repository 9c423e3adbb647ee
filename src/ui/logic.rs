//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑，以及后台事件到状态的转换

use super::actions::Action;
use super::state::{App, AppMode, ProductForm};
use super::view::rows::{page_controls, row_views};
use crate::backend::{BackendCommand, BackendEvent};
use crate::export;
use crate::models::{NewProduct, ProductPatch};

/// dispatch 产生的副作用，由主循环执行
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Quit,
    Request(BackendCommand),
}

impl App {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        tracing::debug!(?action, mode = ?self.mode, "dispatch");

        let effect = match action {
            Action::Quit => return Some(Effect::Quit),
            Action::Reload => Some(Effect::Request(BackendCommand::LoadAll)),
            Action::MoveSelectionUp => {
                self.move_up();
                None
            }
            Action::MoveSelectionDown => {
                self.move_down();
                None
            }

            Action::StartSearch => {
                self.mode = AppMode::Searching;
                None
            }
            Action::CyclePageSize => {
                self.cycle_page_size();
                None
            }
            Action::SortBy(field) => {
                self.view.apply_sort(field);
                None
            }
            Action::PrevPage => self.activate_page(|controls, current| {
                controls.iter().rev().find(|c| c.page < current).map(|c| c.page)
            }),
            Action::NextPage => self.activate_page(|controls, current| {
                controls.iter().find(|c| c.page > current).map(|c| c.page)
            }),
            Action::FirstPage => {
                self.activate_page(|controls, _| controls.first().map(|c| c.page))
            }
            Action::LastPage => self.activate_page(|controls, _| controls.last().map(|c| c.page)),
            Action::OpenSelected => {
                self.open_selected();
                None
            }
            Action::StartCreate => {
                self.form = ProductForm::for_create();
                self.mode = AppMode::Creating;
                None
            }
            Action::Export => {
                self.export();
                None
            }

            Action::NextField => {
                self.form.focus_next();
                None
            }
            Action::PrevField => {
                self.form.focus_prev();
                None
            }
            Action::Cancel => {
                self.mode = AppMode::Normal;
                None
            }
            Action::Submit => self.submit(),

            Action::Input(c) => {
                self.edit_text(|buffer| buffer.push(c));
                None
            }
            Action::DeleteChar => {
                self.edit_text(|buffer| {
                    buffer.pop();
                });
                None
            }
        };

        self.clamp_selection();
        self.view.mark_changed();
        effect
    }

    /// 处理后台返回的事件，成功的写操作会触发一次完整重载
    pub fn apply(&mut self, event: BackendEvent) -> Option<BackendCommand> {
        let follow_up = match event {
            BackendEvent::Loaded(products) => {
                self.view.replace_products(products);
                None
            }
            // 加载失败只记录日志，保留旧数据
            BackendEvent::LoadFailed(reason) => {
                tracing::debug!(%reason, "keeping previous products after failed load");
                None
            }
            BackendEvent::Updated { .. } => {
                self.message = Some("Product updated".to_string());
                Some(BackendCommand::LoadAll)
            }
            BackendEvent::Created => {
                self.message = Some("Product created".to_string());
                if self.mode == AppMode::Creating {
                    self.mode = AppMode::Normal;
                }
                Some(BackendCommand::LoadAll)
            }
            BackendEvent::UpdateFailed { id, reason } => {
                tracing::debug!(id, %reason, "update not applied");
                None
            }
            BackendEvent::CreateFailed(reason) => {
                tracing::debug!(%reason, "create not applied");
                None
            }
        };

        self.clamp_selection();
        self.view.mark_changed();
        follow_up
    }

    // ============ 导航相关 ============

    /// 向上移动选择
    pub fn move_up(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        if self.selected_row + 1 < self.view.visible_page().len() {
            self.selected_row += 1;
        }
    }

    /// 从渲染出的分页控件中选出目标页并激活
    fn activate_page<F>(&mut self, pick: F) -> Option<Effect>
    where
        F: Fn(&[super::view::rows::PageControl], usize) -> Option<usize>,
    {
        let controls = page_controls(&self.view);
        if let Some(page) = pick(&controls, self.view.current_page()) {
            self.view.set_page(page);
            self.selected_row = 0;
        }
        None
    }

    fn cycle_page_size(&mut self) {
        if self.page_sizes.is_empty() {
            return;
        }
        let current = self.view.rows_per_page();
        let next = self
            .page_sizes
            .iter()
            .copied()
            .find(|size| *size > current)
            .unwrap_or(self.page_sizes[0]);
        self.view.set_page_size(next);
        self.selected_row = 0;
    }

    // ============ 搜索 / 表单输入 ============

    fn edit_text<F: FnOnce(&mut String)>(&mut self, edit: F) {
        match self.mode {
            AppMode::Searching => {
                edit(&mut self.search_input);
                let term = self.search_input.clone();
                self.view.apply_search(&term);
                self.selected_row = 0;
            }
            AppMode::Editing(_) | AppMode::Creating => {
                if let Some(buffer) = self.form.focused_value_mut() {
                    edit(buffer);
                }
            }
            AppMode::Normal => {}
        }
    }

    // ============ 详情 / 编辑 / 新建 ============

    /// 打开高亮行的编辑弹窗，数据取自 allProducts
    pub fn open_selected(&mut self) {
        let Some(id) = row_views(&self.view).get(self.selected_row).map(|row| row.id) else {
            return;
        };
        if let Some(product) = self.view.find(id) {
            self.form = ProductForm::for_edit(product);
            self.mode = AppMode::Editing(id);
        }
    }

    fn submit(&mut self) -> Option<Effect> {
        match self.mode {
            AppMode::Editing(id) => {
                let patch = ProductPatch::from_form(&self.form.title, &self.form.price);
                Some(Effect::Request(BackendCommand::Update { id, patch }))
            }
            AppMode::Creating => {
                if !self.form.is_last_field() {
                    self.form.focus_next();
                    return None;
                }
                let product = NewProduct::from_form(
                    &self.form.title,
                    &self.form.price,
                    &self.form.description,
                    &self.form.category_id,
                );
                Some(Effect::Request(BackendCommand::Create { product }))
            }
            AppMode::Normal | AppMode::Searching => None,
        }
    }

    // ============ 导出 ============

    fn export(&mut self) {
        self.message = Some(match export::export_visible_page(&self.view, &self.export_dir) {
            Ok(path) => format!(
                "Exported {} rows to {}",
                self.view.visible_page().len(),
                path.display()
            ),
            Err(err) => {
                tracing::error!("export failed: {err}");
                format!("Export failed: {err}")
            }
        });
    }
}
