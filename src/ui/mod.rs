mod browser;
mod models;
mod pages;
mod picker;
mod series;
mod tiles;

use crate::app_state::{App, FocusArea, InputMode, ViewMode};
use crate::theme::Palette;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let palette = app.theme.palette();
    f.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        f.size(),
    );

    // 创建布局
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Length(10), // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app, &palette);

    // 中间内容区域（左侧菜单 + 主视图）
    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app, &palette);
    render_main_view(f, middle_chunks[1], app, &palette);
    render_bottom_bar(f, chunks[2], app, &palette);
}

/// 主视图外框，聚焦时高亮
pub(crate) fn view_block<'a>(title: String, app: &App, palette: &Palette) -> Block<'a> {
    let focused = app.focus_area == FocusArea::MainView;
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(if focused {
            palette.accent
        } else {
            palette.border
        }))
        .style(Style::default().fg(palette.fg).bg(palette.bg))
}

/// 弹出层所在的居中区域
pub(crate) fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x.min(100) / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub(crate) fn selected_style(palette: &Palette) -> Style {
    Style::default()
        .fg(palette.highlight_fg)
        .bg(palette.highlight_bg)
        .add_modifier(Modifier::BOLD)
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let title = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let title_text = Line::from(vec![
        Span::styled(
            " Stream Dashboard ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Terminal TUI", Style::default().fg(palette.muted)),
        Span::raw("   "),
        Span::styled(
            format!("[T] {}", app.theme.toggle_label()),
            Style::default().fg(palette.muted),
        ),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let menu_items: Vec<ListItem> = ViewMode::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = *view == app.view_mode;

            let style = if is_selected {
                if app.focus_area == FocusArea::Menu {
                    selected_style(palette)
                } else {
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD)
                }
            } else if is_active {
                Style::default().fg(palette.warning)
            } else {
                Style::default().fg(palette.fg)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, view.label())).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter 确认)"
    } else {
        "菜单 (← 切换)"
    };

    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(if app.focus_area == FocusArea::Menu {
                palette.accent
            } else {
                palette.border
            })),
    );

    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    match app.view_mode {
        ViewMode::Home => pages::render_home(f, area, app, palette),
        ViewMode::Configuration => browser::render(f, area, app, palette),
        ViewMode::Timeseries => series::render_stream_panel(f, area, app, palette),
        ViewMode::Tiles => tiles::render(f, area, app, palette),
        ViewMode::Models => models::render(f, area, app, palette),
        ViewMode::ModelTimeseries => series::render_model_panel(f, area, app, palette),
        ViewMode::About => pages::render_about(f, area, app, palette),
    }
}

/// 各视图的按键提示
fn key_help(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Configuration => "[ ] 切换集合 n/p 翻页 ↑↓ 选择 Enter 展开 t 测试连接 r 刷新",
        ViewMode::Timeseries => "s 选择流 [ ] 时间范围 +/- 点数 a 坐标轴 g 图表类型 r 刷新",
        ViewMode::ModelTimeseries => "m 选择模型 [ ] 时间范围 +/- 点数 a 坐标轴 g 图表类型 r 刷新",
        ViewMode::Models => "n 新建 Enter 编辑 d 删除 e 展开列表 r 刷新",
        _ => "/命令 ←→切换 ↑↓导航 Enter确认 T主题 q退出",
    }
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let bottom_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    // 命令输入区域
    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app.command_cursor.min(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(palette.warning)));
        spans.push(Span::raw(right));

        // 补全建议用灰色显示
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(palette.muted)));
        }

        vec![
            Line::from(spans),
            Line::from("Enter执行 Esc取消 Tab补全 ←→光标 Home/End ↑历史 ↓下一条"),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("命令: ", Style::default().fg(palette.warning)),
                Span::raw("(按 / 进入命令模式)"),
            ]),
            Line::from(key_help(app.view_mode)),
        ]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式"
            } else {
                "命令输入"
            })
            .border_style(Style::default().fg(if app.input_mode == InputMode::Command {
                palette.success
            } else {
                palette.border
            })),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 日志区域：最新的在顶部
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(palette.success)
            } else if msg.starts_with('✗') {
                Style::default().fg(palette.error)
            } else if msg.starts_with('⚠') {
                Style::default().fg(palette.warning)
            } else {
                Style::default().fg(palette.fg)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .border_style(Style::default().fg(palette.border)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
