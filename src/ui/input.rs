//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::actions::Action;
use super::logic::Effect;
use super::state::{App, AppMode};
use crate::catalog::SortField;

/// 根据当前模式和按键获取对应的 Action
pub fn get_action(mode: &AppMode, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match mode {
        AppMode::Normal => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
            KeyCode::Char('/') => Some(Action::StartSearch),
            KeyCode::Char('s') => Some(Action::CyclePageSize),
            KeyCode::Char('1') => Some(Action::SortBy(SortField::Id)),
            KeyCode::Char('2') => Some(Action::SortBy(SortField::Title)),
            KeyCode::Char('3') => Some(Action::SortBy(SortField::Price)),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevPage),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextPage),
            KeyCode::Home => Some(Action::FirstPage),
            KeyCode::End => Some(Action::LastPage),
            KeyCode::Enter => Some(Action::OpenSelected),
            KeyCode::Char('a') => Some(Action::StartCreate),
            KeyCode::Char('x') => Some(Action::Export),
            _ => None,
        },
        AppMode::Searching => match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::Editing(_) | AppMode::Creating => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
    }
}

/// 处理按键事件
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Effect> {
    let action = get_action(&app.mode, key)?;
    app.dispatch(action)
}
