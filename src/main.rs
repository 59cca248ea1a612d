mod api;
mod app_service;
mod app_state;
mod browser;
mod commands;
mod config;
mod models;
mod picker;
mod series;
mod theme;
mod tiles;
mod ui;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::api::{ApiClient, DashboardApi};
use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::Config;
use crate::theme::ThemeStore;
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir).context("创建日志目录失败")?;
    let log_path = log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("创建日志文件失败: {}", log_path.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file))) // 输出重定向到文件
        .filter_level(log::LevelFilter::Warn)
        .filter_module("streamdash", log::LevelFilter::Info)
        .filter_module("reqwest", log::LevelFilter::Error)
        .init();

    // 加载配置
    let (config, mut startup_info) = Config::load();
    let theme_store = ThemeStore::new(config.state_file.clone());
    let theme = theme_store.resolve_initial(config.default_theme, &mut startup_info);

    let api: Arc<dyn DashboardApi> = Arc::new(
        ApiClient::new(
            config.api_base_url.clone(),
            config.request_timeout,
            config.probe_timeout,
        )
        .context("创建 HTTP 客户端失败")?,
    );
    startup_info.push(format!(
        "✓ 请求超时 {}s，连接测试超时 {}s",
        config.request_timeout.as_secs(),
        config.probe_timeout.as_secs()
    ));

    // 创建核心 Channel
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    // 后台 Actor：每个请求一个任务，互不阻塞
    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            let api = Arc::clone(&api);
            let tx = evt_tx.clone();
            tokio::spawn(app_service::handle(api, cmd, tx));
        }
    });

    // TUI 初始化
    enable_raw_mode().context("无法进入终端 raw 模式")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(startup_info, theme, theme_store, cmd_tx, evt_rx);

    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        log::error!("ui loop failed: {}", e);
    }
    res.context("界面运行出错")
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.handle_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
