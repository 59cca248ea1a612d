use super::view_block;
use crate::app_state::App;
use crate::theme::Palette;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

pub fn render_home(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let heading = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(palette.muted);
    let lines = vec![
        Line::from(Span::styled("Welcome to the Stream Dashboard", heading)),
        Line::from(""),
        Line::from("Browse time-series streams, inspect configuration objects and manage forecasting models."),
        Line::from(""),
        Line::from(Span::styled("Configuration     generic data tables for types, streams, asset types and assets", muted)),
        Line::from(Span::styled("Timeseries        sampled values of the selected streams", muted)),
        Line::from(Span::styled("Tiles             demo charts", muted)),
        Line::from(Span::styled("Models            create, edit and delete forecasting models", muted)),
        Line::from(Span::styled("Model TimeSeries  asset values of a selected model", muted)),
        Line::from(""),
        Line::from(Span::styled("↑↓ 选择菜单, Enter 进入视图, / 输入命令, T 切换主题, q 退出", muted)),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .block(view_block("Home".to_string(), app, palette))
            .wrap(Wrap { trim: false }),
        area,
    );
}

pub fn render_about(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let muted = Style::default().fg(palette.muted);
    let lines = vec![
        Line::from(Span::styled(
            format!("streamdash {}", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("A terminal dashboard over the stream and model REST API."),
        Line::from(""),
        Line::from(Span::styled(
            format!("Theme: {}  State file: {}", app.theme.name(), app.theme_store.path().display()),
            muted,
        )),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .block(view_block("About".to_string(), app, palette))
            .wrap(Wrap { trim: false }),
        area,
    );
}
