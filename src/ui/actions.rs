//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

use crate::catalog::SortField;

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Reload,
    MoveSelectionUp,
    MoveSelectionDown,

    // 表格交互
    StartSearch,
    CyclePageSize,
    SortBy(SortField),
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    OpenSelected, // 行点击
    StartCreate,
    Export,

    // 表单/通用交互
    NextField,
    PrevField,
    Cancel,      // Esc
    Submit,      // Enter
    Input(char), // 输入字符
    DeleteChar,  // Backspace
}
