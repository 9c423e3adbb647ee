//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件。渲染只读取 App，不修改状态。

pub mod components;
pub mod layouts;
pub mod rows;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::state::{App, AppMode};
use crate::catalog::SortField;
use components::{render_dialog_framework, render_input_widget, render_pagination};
use layouts::centered_rect;
use rows::{page_controls, row_views};

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Length(3), // 搜索
            Constraint::Min(8),    // 表格
            Constraint::Length(4), // 描述
            Constraint::Length(3), // 分页
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_table(frame, app, chunks[2]);
    render_tooltip(frame, app, chunks[3]);
    render_pagination(frame, chunks[4], &page_controls(&app.view));
    render_help(frame, app, chunks[5]);

    // 渲染弹窗
    match &app.mode {
        AppMode::Editing(id) => render_form_dialog(frame, app, &format!("Edit product #{}", id)),
        AppMode::Creating => render_form_dialog(frame, app, "New product"),
        AppMode::Normal | AppMode::Searching => {}
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view;
    let synced = view
        .last_loaded()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "loading...".to_string());
    // 没有任何页时显示 0/0
    let page = if view.page_count() == 0 { 0 } else { view.current_page() };

    let text = format!(
        "Product Catalog | {} of {} products | Page {}/{} | {} per page | synced {}",
        view.filtered_products().len(),
        view.all_products().len(),
        page,
        view.page_count(),
        view.rows_per_page(),
        synced
    );
    let title = Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().title(app.api_url.as_str()).borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    render_input_widget(
        frame,
        area,
        "Search title",
        &app.search_input,
        app.mode == AppMode::Searching,
        Color::Yellow,
    );
}

fn header_label(app: &App, field: SortField) -> String {
    if app.view.last_sorted() == Some(field) {
        format!("{} {}", field.label(), app.view.sort_direction(field).arrow())
    } else {
        field.label().to_string()
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = row_views(&app.view)
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.id.to_string()),
                Cell::from(row.title),
                Cell::from(row.price),
                Cell::from(row.category),
                Cell::from(row.thumbnail),
            ])
        })
        .collect();
    let has_rows = !rows.is_empty();

    let header = Row::new(vec![
        header_label(app, SortField::Id),
        header_label(app, SortField::Title),
        header_label(app, SortField::Price),
        "Category".to_string(),
        "Image".to_string(),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD))
    .bottom_margin(1);

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(24),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(Block::default().title(" Products ").borders(Borders::ALL))
    .row_highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
    );

    let mut state = TableState::default();
    if has_rows {
        state.select(Some(app.selected_row));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// 高亮行的描述，相当于悬停提示
fn render_tooltip(frame: &mut Frame, app: &App, area: Rect) {
    let content = match row_views(&app.view).into_iter().nth(app.selected_row) {
        Some(row) if row.tooltip.is_empty() => "(no description)".to_string(),
        Some(row) => row.tooltip,
        None => String::new(),
    };

    let tooltip = Paragraph::new(content)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title("Description").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(tooltip, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[/] search  [1/2/3] sort id/title/price  [←/→] page  [s] page size  [Enter] edit  [a] add  [x] export  [r] reload  [q] quit"
        }
        AppMode::Searching => "type to filter  [Enter/Esc] done",
        AppMode::Editing(_) => "[Tab] next field  [Enter] save  [Esc] close",
        AppMode::Creating => "[Tab] next field  [Enter] next / create  [Esc] cancel",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(Line::from(text))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_form_dialog(frame: &mut Frame, app: &App, title: &str) {
    let area = centered_rect(60, 60, frame.area());
    let inner = render_dialog_framework(frame, area, title);

    let mut constraints: Vec<Constraint> = app
        .form
        .fields
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in app.form.fields.iter().enumerate() {
        render_input_widget(
            frame,
            chunks[i],
            field.label(),
            app.form.value(*field),
            i == app.form.focus,
            Color::Yellow,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendEvent;
    use crate::config::Settings;
    use crate::models::fixtures::products;
    use crate::ui::actions::Action;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_first_page() {
        let mut app = App::new(&Settings::default());
        app.apply(BackendEvent::Loaded(products(25)));

        let text = screen(&app);
        assert!(text.contains("Page 1/3"));
        assert!(text.contains("Product 10"));
        assert!(!text.contains("Product 11"));
        assert!(text.contains("$100"));
        assert!(text.contains("Description 1"));
    }

    #[test]
    fn test_render_empty_search() {
        let mut app = App::new(&Settings::default());
        app.apply(BackendEvent::Loaded(products(5)));
        app.dispatch(Action::StartSearch);
        for c in "nothing".chars() {
            app.dispatch(Action::Input(c));
        }

        let text = screen(&app);
        assert!(text.contains("0 of 5 products"));
        assert!(text.contains("Page 0/0"));
        assert!(!text.contains("Page 1/0"));
        assert!(!text.contains("Product 1"));
    }

    #[test]
    fn test_render_edit_dialog() {
        let mut app = App::new(&Settings::default());
        app.apply(BackendEvent::Loaded(products(3)));
        app.dispatch(Action::OpenSelected);

        let text = screen(&app);
        assert!(text.contains("Edit product #1"));
    }
}
