use super::{selected_style, view_block};
use crate::app_state::App;
use crate::browser::probe::ProbeStatus;
use crate::browser::{cell_text, has_nested, nested_sections};
use crate::theme::Palette;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// 按字符数截断并补齐到固定宽度
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut s: String = text.chars().take(width.saturating_sub(1)).collect();
        s.push('…');
        s
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let browser = &app.browser;
    let block = view_block(
        format!("Configuration - {}", browser.endpoint.label()),
        app,
        palette,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let banner_height = if browser.error.is_some() { 2 } else { 0 };
    let pager_height = if browser.pager.is_visible() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(pager_height),
        ])
        .split(inner);

    // 标题行：副标题 + 连接测试按钮
    let probe_style = match browser.probe.status() {
        ProbeStatus::Idle => Style::default().fg(palette.accent),
        ProbeStatus::Testing => Style::default().fg(palette.warning),
        ProbeStatus::Connected(_) => Style::default().fg(palette.success),
        ProbeStatus::Failed(_) => Style::default().fg(palette.error),
    };
    let header = Line::from(vec![
        Span::styled(browser.subtitle(), Style::default().fg(palette.muted)),
        Span::raw("   "),
        Span::styled(format!("[t] {}", browser.probe.label()), probe_style),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    if let Some(err) = &browser.error {
        let banner = Paragraph::new(Line::from(Span::styled(
            format!("✗ {}", err),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )))
        .wrap(Wrap { trim: true });
        f.render_widget(banner, chunks[1]);
    }

    render_table(f, chunks[2], app, palette);

    if browser.pager.is_visible() {
        let pager = &browser.pager;
        let nav = |enabled: bool, text: &'static str| {
            Span::styled(
                text,
                Style::default().fg(if enabled { palette.accent } else { palette.muted }),
            )
        };
        let line = Line::from(vec![
            Span::styled(pager.summary(), Style::default().fg(palette.muted)),
            Span::raw("  "),
            nav(pager.has_previous(), "[p] Previous"),
            Span::raw(format!("  Page {} of {}  ", pager.page(), pager.total_pages())),
            nav(pager.has_next(), "[n] Next"),
        ]);
        f.render_widget(Paragraph::new(line), chunks[3]);
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &App, palette: &Palette) {
    let browser = &app.browser;
    if browser.loading && browser.data.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("Loading...", Style::default().fg(palette.muted))),
            area,
        );
        return;
    }
    if browser.data.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No data available",
                Style::default().fg(palette.muted),
            )),
            area,
        );
        return;
    }

    let columns = browser.columns();
    let expandable = browser.page_has_nested();
    let marker_width = if expandable { 2 } else { 0 };
    let width = (area.width as usize).saturating_sub(marker_width);
    let col_width = (width / columns.len().max(1)).max(4);

    let mut lines = Vec::new();
    let mut header = String::from(if expandable { "  " } else { "" });
    for c in &columns {
        header.push_str(&fit(c, col_width));
    }
    lines.push(Line::from(Span::styled(
        header,
        Style::default()
            .fg(palette.fg)
            .add_modifier(Modifier::BOLD),
    )));

    let mut cursor_line = 0;
    for (i, row) in browser.page_rows().iter().enumerate() {
        let expanded = browser.is_expanded(i);
        let marker = if !expandable {
            ""
        } else if !has_nested(row, &columns) {
            "  "
        } else if expanded {
            "▼ "
        } else {
            "▶ "
        };
        let mut text = String::from(marker);
        for c in &columns {
            text.push_str(&fit(&cell_text(row.get(c)), col_width));
        }
        let style = if i == browser.cursor {
            cursor_line = lines.len();
            selected_style(palette)
        } else {
            Style::default().fg(palette.fg)
        };
        lines.push(Line::from(Span::styled(text, style)));

        if expanded {
            for (key, entries) in nested_sections(row, &columns) {
                lines.push(Line::from(Span::styled(
                    format!("    {}:", key),
                    Style::default().fg(palette.accent),
                )));
                for entry in entries {
                    lines.push(Line::from(Span::styled(
                        format!("      {}", entry),
                        Style::default().fg(palette.muted),
                    )));
                }
            }
        }
    }

    let height = area.height as usize;
    let offset = if height == 0 {
        0
    } else {
        cursor_line.saturating_sub(height - 1)
    };
    f.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), area);
}
