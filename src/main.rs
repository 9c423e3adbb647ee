mod api;
mod backend;
mod catalog;
mod config;
mod error;
mod export;
mod models;
mod ui;

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use crate::api::HttpCatalogApi;
use crate::backend::{Backend, BackendCommand};
use crate::config::{Overrides, Settings};
use crate::ui::{App, Effect, handle_key_event, render};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 终端商品目录管理
#[derive(Parser, Debug)]
#[command(name = "catalog-view", version, about)]
struct Args {
    /// 商品集合地址，例如 https://api.escuelajs.co/api/v1/products
    #[arg(long)]
    api_url: Option<String>,
    /// 配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    page_size: Option<usize>,
    /// CSV 导出目录
    #[arg(long)]
    export_dir: Option<PathBuf>,
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// 日志文件默认位置 (~/.local/share/catalog-view/catalog-view.log)
fn default_log_path() -> io::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot resolve data directory"))?
        .join("catalog-view");

    fs::create_dir_all(&data_dir)?;

    Ok(data_dir.join("catalog-view.log"))
}

/// 终端被 TUI 占用，日志写到文件
fn init_logging(settings: &Settings) -> anyhow::Result<PathBuf> {
    let path = match &settings.log_file {
        Some(path) => path.clone(),
        None => default_log_path().context("failed to prepare log directory")?,
    };
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(
        args.config.as_deref(),
        Overrides {
            api_url: args.api_url,
            page_size: args.page_size,
            export_dir: args.export_dir,
            log_file: args.log_file,
        },
    )?;

    let log_path = init_logging(&settings)?;
    let api = HttpCatalogApi::new(&settings.api_url, settings.request_timeout)?;
    tracing::info!(api_url = %api.base_url(), log = %log_path.display(), "starting");

    // 启动后台并发起首次加载
    let backend = Backend::start(Arc::new(api));
    backend.submit(BackendCommand::LoadAll);

    let mut app = App::new(&settings);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app, &backend);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("exiting");
    result.context("terminal event loop failed")
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: &Backend,
) -> io::Result<()> {
    loop {
        for event in backend.drain_events() {
            if let Some(cmd) = app.apply(event) {
                backend.submit(cmd);
            }
        }

        // 只有状态变化时才重绘
        if app.view.take_changed() {
            terminal.draw(|f| render(f, app))?;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match handle_key_event(app, key) {
                    Some(Effect::Quit) => break,
                    Some(Effect::Request(cmd)) => backend.submit(cmd),
                    None => {}
                }
            }
            Event::Resize(_, _) => app.view.mark_changed(),
            _ => {}
        }
    }
    Ok(())
}
